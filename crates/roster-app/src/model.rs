// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// One student's stored data. Field names serialize in camelCase so the
/// persisted snapshot reads `{"name", "studentId", "email", "contact"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub name: String,
    pub student_id: String,
    pub email: String,
    pub contact: String,
}

impl StudentRecord {
    pub fn new(
        name: impl Into<String>,
        student_id: impl Into<String>,
        email: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            student_id: student_id.into(),
            email: email.into(),
            contact: contact.into(),
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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    StudentId,
    Email,
    Contact,
}

impl FormField {
    pub const ALL: [Self; 4] = [Self::Name, Self::StudentId, Self::Email, Self::Contact];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::StudentId => "Student ID",
            Self::Email => "Email",
            Self::Contact => "Contact",
        }
    }

    pub const fn position(self) -> usize {
        match self {
            Self::Name => 0,
            Self::StudentId => 1,
            Self::Email => 2,
            Self::Contact => 3,
        }
    }
}

/// Where keyboard input lands: one of the form inputs, or the record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(FormField),
    Table,
}

impl Focus {
    const CYCLE: [Self; 5] = [
        Self::Field(FormField::Name),
        Self::Field(FormField::StudentId),
        Self::Field(FormField::Email),
        Self::Field(FormField::Contact),
        Self::Table,
    ];

    pub fn rotate(self, delta: isize) -> Self {
        let current = Self::CYCLE
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or(0) as isize;
        let len = Self::CYCLE.len() as isize;
        Self::CYCLE[(current + delta).rem_euclid(len) as usize]
    }

    pub const fn field(self) -> Option<FormField> {
        match self {
            Self::Field(field) => Some(field),
            Self::Table => None,
        }
    }
}

impl Default for Focus {
    fn default() -> Self {
        Self::Field(FormField::Name)
    }
}
