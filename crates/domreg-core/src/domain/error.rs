// ============================================================================
// domain/error.rs - FORM DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

use crate::domain::value_objects::SectionIndex;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (events and errors are fanned out to several listeners)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Addressing Errors
    // ========================================================================
    #[error("row {row} is out of range for the {section} section ({len} rows)")]
    RowOutOfBounds {
        section: SectionIndex,
        row: usize,
        len: usize,
    },

    #[error("no section at index {0}")]
    SectionOutOfBounds(usize),

    #[error("no {kind} at picker index {index} ({len} loaded)")]
    PickerIndexOutOfBounds {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    // ========================================================================
    // Shape Errors
    // ========================================================================
    #[error("row {row} of the {section} section does not accept {value}")]
    ValueKindMismatch {
        section: SectionIndex,
        row: usize,
        value: &'static str,
    },

    #[error("row {row} of the {section} section is not an editable row")]
    NotEditable { section: SectionIndex, row: usize },

    // ========================================================================
    // Layout Errors
    // ========================================================================
    #[error("address layout: {0}")]
    AddressLayout(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::RowOutOfBounds { section, len, .. } => vec![
                format!("The {section} section currently has {len} rows"),
                "Address rows move when extra address lines are added".into(),
            ],
            Self::PickerIndexOutOfBounds { kind, .. } => vec![
                format!("Reload the {kind} list before selecting"),
                "Try: domreg countries".into(),
            ],
            Self::ValueKindMismatch { .. } => vec![
                "Check-mark rows take a selection, editable rows take text".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RowOutOfBounds { .. }
            | Self::SectionOutOfBounds(_)
            | Self::PickerIndexOutOfBounds { .. } => ErrorCategory::NotFound,
            Self::ValueKindMismatch { .. } | Self::NotEditable { .. } => ErrorCategory::Validation,
            Self::AddressLayout(_) => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
