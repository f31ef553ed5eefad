//! Parsing of search/sync response bodies.
//!
//! The matching engine returns either a bare JSON array of records or an
//! object wrapping the array under a named field. Fetching and retry live
//! in the networking layer; this module only interprets the body it was
//! handed.

use crate::types::RawMatchRecord;
use serde::Deserialize;
use thiserror::Error;

/// Field names under which wrapped responses carry the record array.
const WRAPPER_FIELDS: [&str; 3] = ["matches", "results", "candidates"];

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("response object carries no match array (expected one of {WRAPPER_FIELDS:?})")]
    MissingMatchArray,
}

/// Extract the raw match records from a response body.
pub fn parse_batch(body: &str) -> Result<Vec<RawMatchRecord>, BatchError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    // Move the array out rather than cloning a potentially large body.
    let array = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => WRAPPER_FIELDS
            .iter()
            .find_map(|f| map.remove(*f))
            .filter(|v| v.is_array())
            .ok_or(BatchError::MissingMatchArray)?,
        _ => return Err(BatchError::MissingMatchArray),
    };
    let records = Vec::<RawMatchRecord>::deserialize(array)?;
    tracing::debug!(count = records.len(), "parsed match batch");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let records = parse_batch(r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("a"));
    }

    #[test]
    fn test_wrapped_under_matches() {
        let records = parse_batch(r#"{"query_ms": 41, "matches": [{"id": "a"}]}"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_wrapped_under_results() {
        let records = parse_batch(r#"{"results": []}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_wrapper_field_with_non_array_value_is_error() {
        assert!(matches!(
            parse_batch(r#"{"matches": "none"}"#),
            Err(BatchError::MissingMatchArray)
        ));
    }

    #[test]
    fn test_object_without_array_is_error() {
        assert!(matches!(
            parse_batch(r#"{"status": "ok"}"#),
            Err(BatchError::MissingMatchArray)
        ));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            parse_batch("not json"),
            Err(BatchError::InvalidJson(_))
        ));
    }
}
