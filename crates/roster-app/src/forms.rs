// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    FormField, StudentRecord, SubmitError, is_contact_valid, is_email_valid, is_name_valid,
    is_numeric,
};

/// Raw text held by the four form inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudentForm {
    pub name: String,
    pub student_id: String,
    pub email: String,
    pub contact: String,
}

impl StudentForm {
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            name: record.name.clone(),
            student_id: record.student_id.clone(),
            email: record.email.clone(),
            contact: record.contact.clone(),
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::StudentId => &self.student_id,
            FormField::Email => &self.email,
            FormField::Contact => &self.contact,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::StudentId => &mut self.student_id,
            FormField::Email => &mut self.email,
            FormField::Contact => &mut self.contact,
        }
    }

    pub fn is_blank(&self) -> bool {
        FormField::ALL
            .iter()
            .all(|field| self.field(*field).is_empty())
    }

    /// Trims every input and checks it, stopping at the first failure in
    /// name, id, email, contact order.
    pub fn validate(&self) -> Result<StudentRecord, SubmitError> {
        let name = self.name.trim();
        let student_id = self.student_id.trim();
        let email = self.email.trim();
        let contact = self.contact.trim();

        if [name, student_id, email, contact]
            .iter()
            .any(|value| value.is_empty())
        {
            return Err(SubmitError::MissingField);
        }
        if !is_name_valid(name) {
            return Err(SubmitError::InvalidName);
        }
        if !is_numeric(student_id) {
            return Err(SubmitError::InvalidId);
        }
        if !is_email_valid(email) {
            return Err(SubmitError::InvalidEmail);
        }
        if !is_contact_valid(contact) {
            return Err(SubmitError::InvalidContact);
        }

        Ok(StudentRecord::new(name, student_id, email, contact))
    }
}

#[cfg(test)]
mod tests {
    use super::StudentForm;
    use crate::{FormField, StudentRecord, SubmitError};

    fn filled() -> StudentForm {
        StudentForm {
            name: "John Doe".to_owned(),
            student_id: "101".to_owned(),
            email: "j@x.com".to_owned(),
            contact: "1234567890".to_owned(),
        }
    }

    #[test]
    fn valid_form_yields_trimmed_record() {
        let form = StudentForm {
            name: "  John Doe ".to_owned(),
            student_id: " 101".to_owned(),
            email: "j@x.com  ".to_owned(),
            contact: "\t1234567890".to_owned(),
        };
        assert_eq!(
            form.validate(),
            Ok(StudentRecord::new("John Doe", "101", "j@x.com", "1234567890"))
        );
    }

    #[test]
    fn whitespace_only_field_counts_as_missing() {
        let mut form = filled();
        form.email = "   ".to_owned();
        assert_eq!(form.validate(), Err(SubmitError::MissingField));
    }

    #[test]
    fn missing_field_wins_over_invalid_values() {
        let form = StudentForm {
            name: "Ann3".to_owned(),
            student_id: String::new(),
            email: "nope".to_owned(),
            contact: "1".to_owned(),
        };
        assert_eq!(form.validate(), Err(SubmitError::MissingField));
    }

    #[test]
    fn first_failing_check_is_reported() {
        let mut form = filled();
        form.name = "Ann3".to_owned();
        form.student_id = "abc".to_owned();
        assert_eq!(form.validate(), Err(SubmitError::InvalidName));

        let mut form = filled();
        form.student_id = "abc".to_owned();
        form.email = "nope".to_owned();
        assert_eq!(form.validate(), Err(SubmitError::InvalidId));

        let mut form = filled();
        form.email = "nope".to_owned();
        form.contact = "123".to_owned();
        assert_eq!(form.validate(), Err(SubmitError::InvalidEmail));

        let mut form = filled();
        form.contact = "123456789".to_owned();
        assert_eq!(form.validate(), Err(SubmitError::InvalidContact));
    }

    #[test]
    fn field_mut_edits_the_named_input() {
        let mut form = StudentForm::default();
        assert!(form.is_blank());
        form.field_mut(FormField::Email).push_str("a@b.co");
        assert_eq!(form.field(FormField::Email), "a@b.co");
        assert!(!form.is_blank());
    }
}
