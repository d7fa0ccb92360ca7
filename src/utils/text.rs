//! Text utilities for question matching
//!
//! Splits questions into normalized tokens and pulls integers out of
//! questions and request paths.

use crate::error::{Result, SubmissionError};
use regex::Regex;

/// Tokenizer with precompiled patterns
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Runs of Unicode letters and digits
    re_word: Regex,
    /// Standalone runs of ASCII digits; digits glued to letters (`v1`) are not numbers
    re_number: Regex,
}

impl Tokenizer {
    /// Create a new tokenizer
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_word: Regex::new(r"[\p{L}\p{N}]+")
                .map_err(|e| SubmissionError::config(format!("Failed to compile regex: {}", e)))?,
            re_number: Regex::new(r"\b[0-9]+\b")
                .map_err(|e| SubmissionError::config(format!("Failed to compile regex: {}", e)))?,
        })
    }

    /// Lower-cased word tokens in order of appearance
    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.re_word
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }

    /// Integers in order of appearance, as written
    pub fn numbers<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.re_number.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Rewrite integers in `request` that came from `source_question` with the
    /// integer at the same position in `target_question`.
    ///
    /// An integer is only rewritten when it equals the i-th integer of the
    /// source question and the target question has an i-th integer too.
    pub fn transfer_numbers(
        &self,
        request: &str,
        source_question: &str,
        target_question: &str,
    ) -> String {
        let source = self.numbers(source_question);
        let target = self.numbers(target_question);
        if source.is_empty() || target.is_empty() {
            return request.to_string();
        }

        self.re_number
            .replace_all(request, |caps: &regex::Captures<'_>| {
                let found = &caps[0];
                source
                    .iter()
                    .position(|n| *n == found)
                    .and_then(|i| target.get(i))
                    .map_or_else(|| found.to_string(), |n| (*n).to_string())
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_lowercase_unicode() {
        let tokenizer = Tokenizer::new().unwrap();
        assert_eq!(
            tokenizer.tokens("Покажи заказ №42, please!"),
            vec!["покажи", "заказ", "42", "please"]
        );
        assert!(tokenizer.tokens("  ?! ").is_empty());
    }

    #[test]
    fn test_numbers_in_order() {
        let tokenizer = Tokenizer::new().unwrap();
        assert_eq!(tokenizer.numbers("user 7 order 1203"), vec!["7", "1203"]);
    }

    #[test]
    fn test_transfer_numbers_positional() {
        let tokenizer = Tokenizer::new().unwrap();
        let rewritten = tokenizer.transfer_numbers(
            "/api/v1/users/7/orders/12",
            "show order 12 of user 7",
            "show order 99 of user 3",
        );
        assert_eq!(rewritten, "/api/v1/users/3/orders/99");
    }

    #[test]
    fn test_transfer_numbers_keeps_unrelated_digits() {
        let tokenizer = Tokenizer::new().unwrap();
        // "1" in /v1 is not in the source question and must survive
        let rewritten =
            tokenizer.transfer_numbers("/api/v1/items/5", "get item 5", "get item 8");
        assert_eq!(rewritten, "/api/v1/items/8");

        let untouched = tokenizer.transfer_numbers("/api/v1/items/5", "get item 5", "get items");
        assert_eq!(untouched, "/api/v1/items/5");
    }

    #[test]
    fn test_transfer_numbers_skips_version_segment() {
        let tokenizer = Tokenizer::new().unwrap();
        let rewritten =
            tokenizer.transfer_numbers("/api/v1/users/1", "show user 1", "show user 5");
        assert_eq!(rewritten, "/api/v1/users/5");
        assert_eq!(tokenizer.numbers("release v2 build 7"), vec!["7"]);
    }
}
