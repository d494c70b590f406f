//! Field extraction from free-text utterances
//!
//! Turns a user utterance into named field values. When a parser model is
//! configured the model is asked to emit `key: value` pairs which are then
//! scanned with per-field patterns; fields the model missed (or all fields,
//! when no parser is configured) go through per-field fallback strategies.
//!
//! The extractor gives no correctness guarantee: the model may omit or
//! invent fields, and callers must treat an absent field as "unspecified".

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use support_sdk::llm::LlmClient;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Mapping from field name to extracted value
pub type ExtractedFields = HashMap<String, String>;

/// Fallback strategy applied when a field is not extracted by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// First run of ASCII digits anywhere in the text (identifiers)
    DigitRun,

    /// Everything after the first case-insensitive occurrence of the given
    /// word, trimmed; the whole trimmed text when the word is absent
    /// (descriptions)
    KeywordSplit(&'static str),

    /// No fallback; the field is simply absent
    None,
}

/// A field to extract, with its fallback strategy
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name, used both in the parser instruction and the result map
    pub name: &'static str,

    /// Strategy applied when the parser yields nothing for this field
    pub fallback: Fallback,
}

impl FieldSpec {
    /// Create a new field spec
    pub fn new(name: &'static str, fallback: Fallback) -> Self {
        Self { name, fallback }
    }
}

/// Extracts structured fields from natural text, optionally model-assisted
pub struct FieldExtractor {
    /// Parser LLM; None leaves extraction entirely to the fallbacks
    parser: Option<Arc<LlmClient>>,
}

impl FieldExtractor {
    /// Create an extractor with an optional parser LLM
    pub fn new(parser: Option<Arc<LlmClient>>) -> Self {
        Self { parser }
    }

    /// Extract the given fields from `text`.
    ///
    /// Absent fields are missing from the result, never an error. A parser
    /// transport failure degrades to the fallbacks with a logged warning.
    pub async fn extract(&self, text: &str, specs: &[FieldSpec]) -> ExtractedFields {
        let mut fields = ExtractedFields::new();

        if let Some(client) = &self.parser {
            let names: Vec<&str> = specs.iter().map(|s| s.name).collect();
            let prompt = format!(
                "Extract the following details from the text: {}.\nText: {}\nReturn them as key:value pairs.",
                names.join(", "),
                text
            );

            match client.simple_completion(&prompt, client.parser_model()).await {
                Ok(output) => {
                    fields = parse_model_output(&output, specs);
                    debug!("Parser extracted {} of {} fields", fields.len(), specs.len());
                }
                Err(e) => {
                    warn!("Field parser call failed, falling back to heuristics: {}", e);
                }
            }
        }

        for spec in specs {
            if fields.contains_key(spec.name) {
                continue;
            }
            if let Some(value) = apply_fallback(text, spec.fallback) {
                fields.insert(spec.name.to_string(), value);
            }
        }

        fields
    }
}

/// Scan a parser completion for `field: value` pairs, one pattern per
/// expected field. Only fields that matched are returned.
fn parse_model_output(output: &str, specs: &[FieldSpec]) -> ExtractedFields {
    let mut fields = ExtractedFields::new();

    for spec in specs {
        let pattern = format!(r"(?i){}\s*[:=]\s*([^\n,]+)", regex::escape(spec.name));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(_) => continue,
        };

        if let Some(captures) = re.captures(output) {
            if let Some(value) = captures.get(1) {
                let value = value.as_str().trim();
                if !value.is_empty() {
                    fields.insert(spec.name.to_string(), value.to_string());
                }
            }
        }
    }

    fields
}

/// Apply a fallback strategy to the raw utterance
fn apply_fallback(text: &str, fallback: Fallback) -> Option<String> {
    match fallback {
        Fallback::DigitRun => DIGIT_RUN.find(text).map(|m| m.as_str().to_string()),
        Fallback::KeywordSplit(word) => {
            let pattern = format!(r"(?i){}", regex::escape(word));
            let re = Regex::new(&pattern).ok()?;

            let rest = match re.find(text) {
                Some(m) => &text[m.end()..],
                None => text,
            };

            let rest = rest.trim();
            if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            }
        }
        Fallback::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_id_spec() -> FieldSpec {
        FieldSpec::new("user_id", Fallback::DigitRun)
    }

    fn issue_spec() -> FieldSpec {
        FieldSpec::new("issue", Fallback::KeywordSplit("about"))
    }

    #[tokio::test]
    async fn test_digit_run_fallback_without_parser() {
        let extractor = FieldExtractor::new(None);

        let fields = extractor
            .extract("check if user 123 exists", &[user_id_spec()])
            .await;

        assert_eq!(fields.get("user_id").map(String::as_str), Some("123"));
    }

    #[tokio::test]
    async fn test_no_digits_means_absent() {
        let extractor = FieldExtractor::new(None);

        let fields = extractor
            .extract("please check my account", &[user_id_spec()])
            .await;

        assert!(fields.get("user_id").is_none());
    }

    #[tokio::test]
    async fn test_keyword_split_fallback() {
        let extractor = FieldExtractor::new(None);

        let fields = extractor
            .extract(
                "create a ticket for user 12 about a login issue",
                &[user_id_spec(), issue_spec()],
            )
            .await;

        assert_eq!(fields.get("user_id").map(String::as_str), Some("12"));
        assert_eq!(fields.get("issue").map(String::as_str), Some("a login issue"));
    }

    #[tokio::test]
    async fn test_keyword_split_without_keyword_takes_whole_text() {
        let extractor = FieldExtractor::new(None);

        let fields = extractor
            .extract("my app keeps crashing", &[issue_spec()])
            .await;

        assert_eq!(
            fields.get("issue").map(String::as_str),
            Some("my app keeps crashing")
        );
    }

    #[test]
    fn test_parse_model_output_pairs() {
        let output = "user_id: 42\nissue: cannot reset password";
        let fields = parse_model_output(output, &[user_id_spec(), issue_spec()]);

        assert_eq!(fields.get("user_id").map(String::as_str), Some("42"));
        assert_eq!(
            fields.get("issue").map(String::as_str),
            Some("cannot reset password")
        );
    }

    #[test]
    fn test_parse_model_output_is_case_insensitive_and_partial() {
        let output = "User_ID = 7";
        let fields = parse_model_output(output, &[user_id_spec(), issue_spec()]);

        assert_eq!(fields.get("user_id").map(String::as_str), Some("7"));
        assert!(fields.get("issue").is_none());
    }

    #[test]
    fn test_parse_model_output_stops_at_comma() {
        let output = "user_id: 42, issue: slow app";
        let fields = parse_model_output(output, &[user_id_spec(), issue_spec()]);

        assert_eq!(fields.get("user_id").map(String::as_str), Some("42"));
        assert_eq!(fields.get("issue").map(String::as_str), Some("slow app"));
    }
}
