//! Record key validation.
//!
//! Record keys are registration numbers. They double as ledger keys and as
//! path segments when navigating into a stored snapshot, so they must be:
//! - non-empty and at most [`MAX_KEY_LEN`] bytes
//! - free of whitespace and control characters
//! - free of `/` (the path separator)
//! - not prefixed with `\u{0}` (reserved for composite ledger keys)

use crate::error::TypeError;

/// Longest accepted record key, in bytes.
pub const MAX_KEY_LEN: usize = 128;

/// Validate a record key, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use campus_types::validate_record_key;
///
/// assert!(validate_record_key("1816123").is_ok());
/// assert!(validate_record_key("").is_err());
/// assert!(validate_record_key("18/16").is_err());
/// ```
pub fn validate_record_key(key: &str) -> Result<(), TypeError> {
    let reject = |reason: String| TypeError::InvalidKey {
        key: key.to_string(),
        reason,
    };

    if key.is_empty() {
        return Err(reject("record key must not be empty".into()));
    }

    if key.len() > MAX_KEY_LEN {
        return Err(reject(format!("longer than {MAX_KEY_LEN} bytes")));
    }

    if key.starts_with('\u{0}') {
        return Err(reject("must not start with a NUL byte".into()));
    }

    if let Some(ch) = key.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(reject(format!("contains forbidden character: {ch:?}")));
    }

    if key.contains('/') {
        return Err(reject("must not contain '/'".into()));
    }

    Ok(())
}
