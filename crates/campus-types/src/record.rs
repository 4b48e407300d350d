use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::key::validate_record_key;

/// A student's academic record.
///
/// `registration_number` is the natural key and never changes once assigned.
/// Every other field may be edited. Absent optional fields deserialize to
/// empty values, so documents written before `subjects` existed still decode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub registration_number: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Organizational unit, e.g. "CSE".
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub address: String,
    /// Enrolled subject identifiers, in enrolment order.
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl StudentRecord {
    /// Create a record with only the required fields set.
    pub fn new(registration_number: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            registration_number: registration_number.into(),
            first_name: first_name.into(),
            ..Default::default()
        }
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = last_name.into();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_blood_group(mut self, blood_group: impl Into<String>) -> Self {
        self.blood_group = blood_group.into();
        self
    }

    pub fn with_mobile_number(mut self, mobile_number: impl Into<String>) -> Self {
        self.mobile_number = mobile_number.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    /// The record's key in the ledger and in snapshots.
    pub fn key(&self) -> &str {
        &self.registration_number
    }

    /// Check required fields. Runs before any I/O.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.registration_number.is_empty() {
            return Err(TypeError::MissingField {
                field: "registrationNumber",
            });
        }
        validate_record_key(&self.registration_number)?;
        if self.first_name.trim().is_empty() {
            return Err(TypeError::MissingField { field: "firstName" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StudentRecord {
        StudentRecord::new("1816123", "Sajan")
            .with_last_name("Jaiswal")
            .with_branch("CSE")
            .with_blood_group("A+")
            .with_mobile_number("+917064274923")
            .with_address("White House, Motihari, Bihar")
            .with_subjects(["CS101", "MA102"])
    }

    #[test]
    fn json_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["registrationNumber"], "1816123");
        assert_eq!(json["firstName"], "Sajan");
        assert_eq!(json["mobileNumber"], "+917064274923");
        assert_eq!(json["subjects"][1], "MA102");
    }

    #[test]
    fn missing_optional_fields_default() {
        let record: StudentRecord = serde_json::from_str(
            r#"{"registrationNumber":"1001","firstName":"A","mobileNumber":"+1"}"#,
        )
        .unwrap();
        assert_eq!(record.key(), "1001");
        assert_eq!(record.mobile_number, "+1");
        assert!(record.last_name.is_empty());
        assert!(record.subjects.is_empty());
    }

    #[test]
    fn missing_required_field_fails_to_decode() {
        let err = serde_json::from_str::<StudentRecord>(r#"{"firstName":"A"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn validate_accepts_complete_record() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_key() {
        let err = StudentRecord::new("", "A").validate().unwrap_err();
        assert_eq!(
            err,
            TypeError::MissingField {
                field: "registrationNumber"
            }
        );
    }

    #[test]
    fn validate_rejects_blank_first_name() {
        let err = StudentRecord::new("1001", "  ").validate().unwrap_err();
        assert_eq!(err, TypeError::MissingField { field: "firstName" });
    }

    #[test]
    fn validate_rejects_bad_key() {
        let err = StudentRecord::new("10/01", "A").validate().unwrap_err();
        assert!(matches!(err, TypeError::InvalidKey { .. }));
    }
}
