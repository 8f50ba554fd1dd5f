//! Validation findings

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// Required field absent
    MissingField,
    /// Field present with the wrong JSON type
    InvalidShape,
    /// NaN, infinite or null where a number is required
    NonFiniteValue,
    /// Data point skill not declared on the matrix
    UndeclaredSkill,
    /// Data point month not declared on the matrix
    UndeclaredMonth,
    /// Data point with an unusable month, skill or hours
    MalformedDataPoint,
    /// Preferred staff reference present but blank
    BlankPreferredStaff,
    /// Cell aggregates disagree with their breakdown
    InconsistentAggregate,
    /// More than one cell for a skill and month
    DuplicateCell,
    /// Nothing to forecast
    NoData,
    UnknownRecurrenceType,
    InvalidInterval,
    InvalidHours,
    UnknownClient,
    MissingSkills,
    DuplicateTaskId,
    NegativeCapacity,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    #[inline]
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Outcome of a validation pass
///
/// Valid means no errors; warnings never invalidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Result with no findings
    #[must_use]
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record an error
    pub fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.errors.push(Diagnostic::new(kind, message));
        self.is_valid = false;
    }

    /// Record a warning
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.warnings.push(Diagnostic::new(kind, message));
    }

    /// Fold another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Whether any error or warning has `kind`
    #[must_use]
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|d| d.kind == kind)
    }

    /// Errors of `kind`
    pub fn errors_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().filter(move |d| d.kind == kind)
    }

    /// Warnings of `kind`
    pub fn warnings_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.warnings.iter().filter(move |d| d.kind == kind)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}
