//! Tag list parsing.

/// Split a comma-separated tag string into trimmed, non-empty tags.
///
/// ```
/// use biohub_core::util::tags::parse_tags;
///
/// assert_eq!(parse_tags("oncology, CRISPR ,,  "), vec!["oncology", "CRISPR"]);
/// assert!(parse_tags("").is_empty());
/// ```
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
