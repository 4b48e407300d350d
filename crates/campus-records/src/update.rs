use campus_types::StudentRecord;

use crate::error::{RecordError, RecordResult};

/// A single-field edit to a stored record.
///
/// There is no variant for the registration number, which never changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldUpdate {
    MobileNumber(String),
    Address(String),
    BloodGroup(String),
    Branch(String),
    /// Append one subject unless already enrolled.
    AddSubject(String),
    /// Replace the whole subject list.
    Subjects(Vec<String>),
}

impl FieldUpdate {
    /// Parse a `field` / `value` pair using the record's JSON field names.
    ///
    /// `subjects` takes a comma-separated list.
    pub fn parse(field: &str, value: &str) -> RecordResult<Self> {
        let value = value.trim().to_string();
        Ok(match field {
            "mobileNumber" => Self::MobileNumber(value),
            "address" => Self::Address(value),
            "bloodGroup" => Self::BloodGroup(value),
            "branch" => Self::Branch(value),
            "addSubject" => Self::AddSubject(value),
            "subjects" => Self::Subjects(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            other => return Err(RecordError::UnknownField(other.to_string())),
        })
    }

    /// The JSON name of the field this update touches.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MobileNumber(_) => "mobileNumber",
            Self::Address(_) => "address",
            Self::BloodGroup(_) => "bloodGroup",
            Self::Branch(_) => "branch",
            Self::AddSubject(_) | Self::Subjects(_) => "subjects",
        }
    }

    pub fn apply(self, record: &mut StudentRecord) {
        match self {
            Self::MobileNumber(v) => record.mobile_number = v,
            Self::Address(v) => record.address = v,
            Self::BloodGroup(v) => record.blood_group = v,
            Self::Branch(v) => record.branch = v,
            Self::AddSubject(v) => {
                if !record.subjects.contains(&v) {
                    record.subjects.push(v);
                }
            }
            Self::Subjects(v) => record.subjects = v,
        }
    }
}
