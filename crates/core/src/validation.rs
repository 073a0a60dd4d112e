//! Declarative form validation.
//!
//! A [`FormSchema`] lists the fields a form renders. [`FormSchema::validate`]
//! checks submitted values and reports at most one error per field: a blank
//! required field is reported before a malformed email.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::types::Email;

/// How a field is rendered and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Text,
    Email,
    TextArea,
}

impl FieldKind {
    /// HTML `type` attribute for single-line inputs.
    #[must_use]
    pub const fn input_type(self) -> &'static str {
        match self {
            Self::Text | Self::TextArea => "text",
            Self::Email => "email",
        }
    }
}

/// A field declared on a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    #[must_use]
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
        }
    }

    #[must_use]
    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
        }
    }

    /// First failing rule for `value`, if any.
    ///
    /// Blankness is judged after trimming; the email pattern is matched
    /// against the value exactly as submitted.
    #[must_use]
    pub fn check(&self, value: &str) -> Option<FieldError> {
        if value.trim().is_empty() {
            return self.required.then_some(FieldError::Required);
        }
        if self.kind == FieldKind::Email && Email::parse(value).is_err() {
            return Some(FieldError::InvalidEmail);
        }
        None
    }
}

/// A rule a field value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// The fields of one form, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    #[must_use]
    pub const fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Check every declared field against `submitted`.
    ///
    /// Missing keys count as blank. Undeclared keys are ignored.
    #[must_use]
    pub fn validate(&self, submitted: &HashMap<String, String>) -> Validation {
        let errors = self
            .fields
            .iter()
            .filter_map(|field| {
                let value = submitted.get(field.name).map_or("", String::as_str);
                field.check(value).map(|error| (field.name, error))
            })
            .collect();
        Validation { errors }
    }
}

/// Outcome of validating a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    errors: BTreeMap<&'static str, FieldError>,
}

impl Validation {
    /// Whether the submission may proceed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The error for `field`, if it failed.
    #[must_use]
    pub fn error(&self, field: &str) -> Option<FieldError> {
        self.errors.get(field).copied()
    }

    pub fn errors(&self) -> impl Iterator<Item = (&'static str, FieldError)> + '_ {
        self.errors.iter().map(|(&name, &error)| (name, error))
    }
}
