mod ai;
mod auth;
mod challenges;
mod colabs;
mod people;
