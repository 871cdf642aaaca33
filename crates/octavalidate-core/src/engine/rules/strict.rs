//! Strict-mode prohibited-word filter

use regex::{Regex, RegexBuilder};

use crate::error::{EngineError, Result};

/// Case-insensitive substring filter over a fixed word list
#[derive(Debug, Clone)]
pub struct ProhibitedWords {
    words: Vec<String>,
    matchers: Vec<Regex>,
}

impl ProhibitedWords {
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for word in words {
            let word = word.as_ref().trim();
            if !word.is_empty() && !list.iter().any(|w| w.eq_ignore_ascii_case(word)) {
                list.push(word.to_string());
            }
        }

        let matchers = list
            .iter()
            .map(|word| {
                RegexBuilder::new(&regex::escape(word))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        EngineError::config_error(format!("prohibited word '{}': {}", word, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            words: list,
            matchers,
        })
    }

    /// Words found in `text`, in list order
    pub fn scan(&self, text: &str) -> Vec<&str> {
        self.words
            .iter()
            .zip(&self.matchers)
            .filter(|(_, matcher)| matcher.is_match(text))
            .map(|(word, _)| word.as_str())
            .collect()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Failure message for a set of hits
    pub fn message(hits: &[&str]) -> String {
        format!("Please remove or replace '{}'", hits.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_is_case_insensitive_substring() {
        let filter = ProhibitedWords::new(["null", "undefined", "empty"]).unwrap();
        assert_eq!(filter.scan("NULL pointer"), vec!["null"]);
        assert_eq!(filter.scan("nullish and emptyset"), vec!["null", "empty"]);
        assert!(filter.scan("hello world").is_empty());
    }

    #[test]
    fn test_words_are_literal() {
        let filter = ProhibitedWords::new(["a.b", "(x"]).unwrap();
        assert!(filter.scan("axb").is_empty());
        assert_eq!(filter.scan("a.b and (x"), vec!["a.b", "(x"]);
    }

    #[test]
    fn test_duplicates_and_blanks_are_dropped() {
        let filter = ProhibitedWords::new(["null", "NULL", " ", "drop"]).unwrap();
        assert_eq!(filter.words(), &["null".to_string(), "drop".to_string()]);
    }

    #[test]
    fn test_message() {
        assert_eq!(
            ProhibitedWords::message(&["null", "empty"]),
            "Please remove or replace 'null,empty'"
        );
    }
}
