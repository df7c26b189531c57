//! Monthly AI prompt allowance.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

/// Assistant prompts each user may send per calendar month.
pub const MONTHLY_PROMPT_LIMIT: u32 = 5;

/// Prompt usage for the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromptQuota {
    pub used: u32,
    pub limit: u32,
}

impl PromptQuota {
    /// Quota with the standard monthly limit.
    pub fn monthly(used: u32) -> Self {
        Self {
            used,
            limit: MONTHLY_PROMPT_LIMIT,
        }
    }

    /// Prompts left this month.
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }

    /// Message shown once the allowance is spent.
    pub fn exhausted_message(&self) -> String {
        format!(
            "You have reached your monthly limit of {} AI prompts. Upgrade to continue.",
            self.limit
        )
    }
}

/// Midnight UTC on the first day of `now`'s month.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}
