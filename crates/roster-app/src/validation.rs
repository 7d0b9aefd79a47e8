// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::Regex;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("name pattern is valid"));
static NUMERIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("numeric pattern is valid"));
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});
static CONTACT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10,}$").expect("contact pattern is valid"));

/// Reasons a submitted form is refused. None of these touch the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    MissingField,
    InvalidName,
    InvalidId,
    InvalidEmail,
    InvalidContact,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField => f.write_str("Please fill all fields."),
            Self::InvalidName => f.write_str("Name should contain only letters and spaces."),
            Self::InvalidId => f.write_str("Student ID must be numeric."),
            Self::InvalidEmail => f.write_str("Please enter a valid email address."),
            Self::InvalidContact => {
                f.write_str("Contact number must be at least 10 digits and numeric.")
            }
        }
    }
}

impl std::error::Error for SubmitError {}

pub fn is_name_valid(input: &str) -> bool {
    NAME_PATTERN.is_match(input.trim())
}

pub fn is_numeric(input: &str) -> bool {
    NUMERIC_PATTERN.is_match(input)
}

pub fn is_email_valid(input: &str) -> bool {
    EMAIL_PATTERN.is_match(input)
}

pub fn is_contact_valid(input: &str) -> bool {
    CONTACT_PATTERN.is_match(input)
}
