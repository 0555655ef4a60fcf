//! Text-blob handling for opaque structured fields.
//!
//! Input schemas, gateway capabilities and prompt argument lists are declared
//! as JSON text so callers can supply arbitrary nesting. They are decoded only
//! to be forwarded as structured JSON, and the API's structure is re-encoded
//! to text on the way back.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ProviderError;

/// Decode a declared blob. Unset or empty text means "not declared".
///
/// A malformed blob, or one whose shape does not match `T`, is a local
/// validation error naming `field`.
pub fn decode_blob<T: DeserializeOwned>(field: &str, blob: Option<&str>) -> crate::Result<Option<T>> {
    match blob.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|source| ProviderError::InvalidJson {
                field: field.to_string(),
                source,
            }),
    }
}

/// Encode an API structure back to declared text.
pub fn encode_blob<T: Serialize>(field: &str, value: &T) -> crate::Result<String> {
    serde_json::to_string(value).map_err(|source| ProviderError::Serialize {
        field: field.to_string(),
        source,
    })
}

/// Map an API structure onto the declared text, keeping `prior` verbatim when
/// it already describes the same structure.
///
/// Key order and whitespace are not significant, so re-encoding a value the
/// operator wrote by hand would otherwise read back as drift.
pub fn reconcile_blob<T: Serialize>(
    field: &str,
    prior: Option<&str>,
    api: Option<&T>,
) -> crate::Result<Option<String>> {
    let Some(api) = api else {
        return Ok(None);
    };
    let api_value = serde_json::to_value(api).map_err(|source| ProviderError::Serialize {
        field: field.to_string(),
        source,
    })?;
    if let Some(text) = prior {
        if let Ok(prior_value) = serde_json::from_str::<Value>(text) {
            if prior_value == api_value {
                return Ok(Some(text.to_string()));
            }
        }
    }
    encode_blob(field, &api_value).map(Some)
}

/// Structural equality of two declared blobs; unset and empty are equal.
pub fn blobs_equivalent(a: Option<&str>, b: Option<&str>) -> bool {
    let parse = |text: Option<&str>| -> Option<std::result::Result<Value, String>> {
        match text.map(str::trim) {
            None | Some("") => None,
            Some(t) => Some(serde_json::from_str::<Value>(t).map_err(|_| t.to_string())),
        }
    };
    parse(a) == parse(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    #[test]
    fn test_unset_and_empty_decode_to_none() {
        let none: Option<Map<String, Value>> = decode_blob("input_schema", None).unwrap();
        assert!(none.is_none());
        let empty: Option<Map<String, Value>> = decode_blob("input_schema", Some("  ")).unwrap();
        assert!(empty.is_none());
    }

    #[test]
    fn test_malformed_blob_is_validation_error() {
        let result: crate::Result<Option<Map<String, Value>>> =
            decode_blob("capabilities", Some("{\"tools\": "));
        let err = result.unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("unable to parse capabilities JSON"));
    }

    #[test]
    fn test_wrong_shape_is_validation_error() {
        let result: crate::Result<Option<Map<String, Value>>> =
            decode_blob("input_schema", Some("[1, 2]"));
        assert!(matches!(result, Err(ProviderError::InvalidJson { field, .. }) if field == "input_schema"));
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let original = r#"{
            "type": "object",
            "properties": {"city": {"type": "string"}, "days": {"type": "integer", "minimum": 1}},
            "required": ["city"],
            "x-extra": [null, true, 1.5, {"nested": []}]
        }"#;
        let decoded: Map<String, Value> = decode_blob("input_schema", Some(original))
            .unwrap()
            .unwrap();
        let encoded = encode_blob("input_schema", &decoded).unwrap();
        let before: Value = serde_json::from_str(original).unwrap();
        let after: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_reconcile_keeps_prior_text_when_equivalent() {
        let prior = "{ \"b\": 2,  \"a\": 1 }";
        let api = json!({"a": 1, "b": 2});
        let out = reconcile_blob("capabilities", Some(prior), Some(&api)).unwrap();
        assert_eq!(out.as_deref(), Some(prior));
    }

    #[test]
    fn test_reconcile_takes_api_when_different() {
        let api = json!({"a": 1, "b": 3});
        let out = reconcile_blob("capabilities", Some("{\"a\":1,\"b\":2}"), Some(&api)).unwrap();
        let value: Value = serde_json::from_str(out.as_deref().unwrap()).unwrap();
        assert_eq!(value, api);
    }

    #[test]
    fn test_reconcile_absent_api_value() {
        let out = reconcile_blob::<Value>("capabilities", Some("{}"), None).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_blobs_equivalent() {
        assert!(blobs_equivalent(Some("{\"a\":1}"), Some("{ \"a\" : 1 }")));
        assert!(blobs_equivalent(None, Some("")));
        assert!(!blobs_equivalent(Some("{\"a\":1}"), Some("{\"a\":2}")));
        assert!(!blobs_equivalent(Some("{\"a\":1}"), None));
    }
}
