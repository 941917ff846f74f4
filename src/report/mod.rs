//! Report renderers for risk profiles.
//!
//! - [`terminal`]: colored summary box, typology and evidence tables; respects `--verbose` / `--quiet`.
//! - [`pdf`]: cover page with score cards and typology bars, then the paginated audit trail.

pub mod pdf;
pub mod terminal;

/// Longest body excerpt shown under a headline in the audit trail.
pub const EXCERPT_CHARS: usize = 160;

/// `text` on one line with runs of whitespace collapsed, cut to `max` chars.
pub fn excerpt(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&flat, max)
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Reuters", 16), "Reuters");
        assert_eq!(truncate("The Wall Street Journal", 10), "The Wall …");
    }

    #[test]
    fn test_excerpt_flattens_and_cuts() {
        assert_eq!(excerpt("  Regulators\n  fined   the firm ", 80), "Regulators fined the firm");
        assert_eq!(excerpt("", 80), "");
        let long = "word ".repeat(100);
        let cut = excerpt(&long, EXCERPT_CHARS);
        assert_eq!(cut.chars().count(), EXCERPT_CHARS);
        assert!(cut.ends_with('…'));
    }
}
