//! Forecast Validation
//!
//! Structural checks for demand matrices, typed or untyped, and for the
//! raw records they are built from. Validation is advisory: it reports
//! errors and warnings and never alters or rejects the data it inspects.

#![warn(unreachable_pub)]

pub mod diagnostic;
pub mod matrix;
pub mod records;

pub use diagnostic::{Diagnostic, DiagnosticKind, ValidationResult};
pub use matrix::StructuralValidator;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
