use campus_types::StudentRecord;

/// The two students `init` registers on an empty ledger.
pub fn demo_students() -> Vec<StudentRecord> {
    vec![
        StudentRecord::new("1816123", "Sajan")
            .with_last_name("Jaiswal")
            .with_branch("CSE")
            .with_blood_group("A+")
            .with_mobile_number("+917064274923")
            .with_address("White House, Motihari, Bihar"),
        StudentRecord::new("1816124", "Abhishek")
            .with_last_name("Jaiswal")
            .with_branch("CSE")
            .with_blood_group("B+")
            .with_mobile_number("+918210791275")
            .with_address("MidLand,Dimapur"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_students_are_valid_and_distinct() {
        let students = demo_students();
        assert_eq!(students.len(), 2);
        for s in &students {
            s.validate().unwrap();
            assert!(s.subjects.is_empty());
        }
        assert_ne!(students[0].key(), students[1].key());
    }
}
