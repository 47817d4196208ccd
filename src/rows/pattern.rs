//! Full-match name patterns

use regex::Regex;

use crate::errors::{TableError, TableResult};

const METACHARACTERS: &[char] = &[
    '.', '^', '$', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '\\',
];

/// True if `base` should be treated as a regular expression
pub(crate) fn is_pattern(base: &str) -> bool {
    base.contains(METACHARACTERS)
}

/// A regular expression anchored to match whole names
#[derive(Debug, Clone)]
pub(crate) struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    pub(crate) fn compile(pattern: &str) -> TableResult<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| TableError::parse(pattern, format!("invalid name pattern: {}", e)))?;
        Ok(Self { regex })
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pattern() {
        assert!(is_pattern("ip.*"));
        assert!(is_pattern("ip[23]"));
        assert!(is_pattern("tab$end"));
        assert!(!is_pattern("ip2"));
        assert!(!is_pattern("mq_1"));
    }

    #[test]
    fn test_full_match() {
        let p = NamePattern::compile("ip[23]").unwrap();
        assert!(p.matches("ip2"));
        assert!(!p.matches("ip23"));
        assert!(!p.matches("xip2"));
    }

    #[test]
    fn test_alternation_is_anchored() {
        let p = NamePattern::compile("ip1|ip3").unwrap();
        assert!(p.matches("ip3"));
        assert!(!p.matches("ip13"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = NamePattern::compile("ip[").unwrap_err();
        assert_eq!(err.code(), "TABLE_PARSE");
    }
}
