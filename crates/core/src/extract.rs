//! Recovering a JSON object from free-form model output.
//!
//! Every LLM-mediated step in the workflow expects a JSON object back but
//! gets prose, markdown fences, or nothing at all. This module is the single
//! place that digs the object out: strip code fences, take the first `{`
//! through the last `}`, parse. Callers pick their own fallback, but the
//! error keeps "the model returned nothing" distinct from "the model said
//! something unparsable".

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("model returned no output")]
    Empty,
    #[error("no JSON object found in model output")]
    NoJsonObject,
    #[error("model output contained malformed JSON: {0}")]
    Malformed(String),
}

/// Extract the outermost JSON object from raw model output.
pub fn extract_json(raw: &str) -> Result<Value, ExtractError> {
    if raw.trim().is_empty() {
        return Err(ExtractError::Empty);
    }

    let cleaned = strip_code_fences(raw);
    let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) else {
        return Err(ExtractError::NoJsonObject);
    };
    if end < start {
        return Err(ExtractError::NoJsonObject);
    }

    serde_json::from_str(&cleaned[start..=end])
        .map_err(|err| ExtractError::Malformed(err.to_string()))
}

/// Extract and deserialize into a fixed shape in one step.
pub fn extract<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractError> {
    let value = extract_json(raw)?;
    serde_json::from_value(value).map_err(|err| ExtractError::Malformed(err.to_string()))
}

/// Drop ``` fences (with an optional language marker) and trim stray
/// backticks and whitespace around the remainder.
fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        let marker_len: usize =
            rest.chars().take_while(|c| c.is_ascii_alphabetic()).map(char::len_utf8).sum();
        rest = &rest[marker_len..];
    }
    out.push_str(rest);
    out.trim_matches(|c: char| c == '`' || c.is_whitespace()).to_string()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::{extract, extract_json, ExtractError};

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"intent\": \"order_status\"}\n```";
        assert_eq!(extract_json(raw).expect("parses"), json!({"intent": "order_status"}));
    }

    #[test]
    fn parses_object_embedded_in_prose() {
        let raw = "Sure! Here is the result:\n{\"found\": true, \"order_id\": \"42\"}\nAnything else?";
        assert_eq!(
            extract_json(raw).expect("parses"),
            json!({"found": true, "order_id": "42"})
        );
    }

    #[test]
    fn empty_output_is_a_distinct_error() {
        assert_eq!(extract_json("   \n"), Err(ExtractError::Empty));
    }

    #[test]
    fn prose_without_object_is_not_treated_as_empty() {
        assert_eq!(
            extract_json("I could not classify that message."),
            Err(ExtractError::NoJsonObject)
        );
    }

    #[test]
    fn broken_json_reports_malformed() {
        assert!(matches!(
            extract_json("{\"intent\": \"order_status\""),
            Err(ExtractError::NoJsonObject) | Err(ExtractError::Malformed(_))
        ));
        assert!(matches!(
            extract_json("{\"intent\": order_status}"),
            Err(ExtractError::Malformed(_))
        ));
    }

    #[test]
    fn typed_extraction_deserializes_fixed_shapes() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Probe {
            found: bool,
            order_id: String,
        }

        let raw = "```\n{\"found\": true, \"order_id\": \"5904\"}\n```";
        let probe: Probe = extract(raw).expect("deserializes");
        assert_eq!(probe, Probe { found: true, order_id: "5904".to_string() });
    }

    #[test]
    fn typed_extraction_flags_shape_mismatch_as_malformed() {
        #[derive(Debug, Deserialize)]
        struct Probe {
            #[allow(dead_code)]
            found: bool,
        }

        let result = extract::<Probe>("{\"found\": \"yes\"}");
        assert!(matches!(result, Err(ExtractError::Malformed(_))));
    }

    #[test]
    fn greedy_span_keeps_nested_objects_intact() {
        let raw = "{\"details\": {\"extracted_info\": \"floral shirts\"}} trailing";
        let value = extract_json(raw).expect("parses");
        assert_eq!(value["details"]["extracted_info"], json!("floral shirts"));
    }
}
