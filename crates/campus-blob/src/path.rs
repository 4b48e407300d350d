//! Path navigation inside stored JSON objects.
//!
//! A path is a `/`-separated list of segments. Each segment selects a key of
//! a JSON object, or an index of a JSON array. Empty segments (leading,
//! trailing, or doubled slashes) are ignored, so `"a/b"`, `"/a/b"` and
//! `"a//b/"` are the same path.

use campus_types::Pointer;
use serde_json::Value;

use crate::error::{BlobError, BlobResult};

/// Split a path into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Walk `value` along `segments`. Returns `None` at the first segment that
/// does not resolve.
pub fn navigate<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments.iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Select the sub-object of a stored JSON document at `path` and return it
/// re-encoded as JSON bytes.
pub fn select(pointer: &Pointer, data: &[u8], path: &str) -> BlobResult<Vec<u8>> {
    let root: Value = serde_json::from_slice(data)
        .map_err(|e| BlobError::Encoding(format!("stored object {pointer} is not JSON: {e}")))?;
    let found = navigate(&root, &segments(path)).ok_or_else(|| BlobError::PathNotFound {
        pointer: pointer.clone(),
        path: path.to_string(),
    })?;
    serde_json::to_vec(found).map_err(|e| BlobError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_types::Codec;
    use serde_json::json;

    #[test]
    fn segments_skip_empty() {
        assert_eq!(segments("a/b"), vec!["a", "b"]);
        assert_eq!(segments("/a//b/"), vec!["a", "b"]);
        assert!(segments("").is_empty());
        assert!(segments("/").is_empty());
    }

    #[test]
    fn navigate_objects_and_arrays() {
        let doc = json!({"1001": {"firstName": "A", "subjects": ["CS101", "MA102"]}});
        assert_eq!(navigate(&doc, &["1001", "firstName"]), Some(&json!("A")));
        assert_eq!(navigate(&doc, &["1001", "subjects", "1"]), Some(&json!("MA102")));
        assert_eq!(navigate(&doc, &[]), Some(&doc));
    }

    #[test]
    fn navigate_misses() {
        let doc = json!({"1001": {"subjects": ["CS101"]}});
        assert!(navigate(&doc, &["1002"]).is_none());
        assert!(navigate(&doc, &["1001", "subjects", "5"]).is_none());
        assert!(navigate(&doc, &["1001", "subjects", "x"]).is_none());
        assert!(navigate(&doc, &["1001", "subjects", "0", "deeper"]).is_none());
    }

    #[test]
    fn select_returns_sub_object() {
        let p = Pointer::from_blake3(Codec::DagJson, b"doc");
        let data = br#"{"1001":{"firstName":"A"},"1002":{"firstName":"B"}}"#;
        let out = select(&p, data, "1002").unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value, json!({"firstName": "B"}));
    }

    #[test]
    fn select_missing_path_is_path_not_found() {
        let p = Pointer::from_blake3(Codec::DagJson, b"doc");
        let err = select(&p, br#"{"1001":{}}"#, "9999").unwrap_err();
        assert!(matches!(err, BlobError::PathNotFound { ref path, .. } if path == "9999"));
    }

    #[test]
    fn select_on_non_json_is_encoding_error() {
        let p = Pointer::from_blake3(Codec::DagJson, b"doc");
        let err = select(&p, b"\xff\xfe", "a").unwrap_err();
        assert!(matches!(err, BlobError::Encoding(_)));
    }
}
