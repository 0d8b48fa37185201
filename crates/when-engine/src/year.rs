//! Era-aware year resolution.

use regex::Regex;

use crate::calendar::most_likely_year;
use crate::error::WhenError;
use crate::pattern::compile;

/// Locale fragments marking a year as before or after the epoch.
#[derive(Debug, Clone)]
pub struct EraMarkers {
    before: Regex,
    after: Regex,
    pattern: String,
}

impl EraMarkers {
    pub fn new(before: &str, after: &str) -> Result<Self, WhenError> {
        Ok(Self {
            before: compile("era before", &format!("(?:{before})\\.?$"))?,
            after: compile("era after", &format!("(?:{after})\\.?$"))?,
            pattern: format!(r"[0-9]{{1,4}}(?:\s*(?:{before}|{after})\.?)?"),
        })
    }

    /// Pattern matching a year numeral with its optional era marker.
    pub fn year_pattern(&self) -> &str {
        &self.pattern
    }

    /// Resolve matched year text (`"113 f.Kr"`, `"85 e. kr."`, `"12"`) to a
    /// signed year.
    ///
    /// Returns `None` when the text holds no digits.
    pub fn resolve(&self, text: &str) -> Option<i32> {
        let text = text.trim();
        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        let numeral: i32 = digits.parse().ok()?;

        if self.before.is_match(text) {
            Some(-numeral)
        } else if self.after.is_match(text) {
            Some(numeral)
        } else {
            Some(most_likely_year(numeral))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> EraMarkers {
        EraMarkers::new(r"f\.?\s*kr", r"e\.?\s*kr").unwrap()
    }

    #[test]
    fn test_before_epoch_is_negative() {
        assert_eq!(markers().resolve("113 f.Kr"), Some(-113));
        assert_eq!(markers().resolve("113 fkr"), Some(-113));
    }

    #[test]
    fn test_after_epoch_keeps_small_year() {
        assert_eq!(markers().resolve("85 e. kr."), Some(85));
        assert_eq!(markers().resolve("0 e.Kr"), Some(0));
    }

    #[test]
    fn test_no_marker_uses_most_likely_year() {
        assert_eq!(markers().resolve("12"), Some(2012));
        assert_eq!(markers().resolve("85"), Some(1985));
        assert_eq!(markers().resolve("2016"), Some(2016));
        assert_eq!(markers().resolve("113"), Some(113));
    }

    #[test]
    fn test_year_pattern_takes_marker() {
        let m = markers();
        let re = compile("year", &format!("^{}$", m.year_pattern())).unwrap();
        assert!(re.is_match("85 e. kr."));
        assert!(re.is_match("113 F.Kr"));
        assert!(re.is_match("2012"));
        assert!(!re.is_match("20123"));
    }

    #[test]
    fn test_resolve_without_digits() {
        assert_eq!(markers().resolve("f.Kr"), None);
    }
}
