//! Error infrastructure for duel-core.
//!
//! Almost nothing in the rules layer fails: gating failures are expressed as
//! `None`, and unknown status ids are inert. The errors defined here cover
//! caller misuse at the boundary, where a harness or loader asks for something
//! its own setup cannot provide.
//!
//! # Design Principles
//!
//! - **Absence over failure**: invalid spends return `None`, never an error
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **Rich Context**: variants carry the status id and phase involved

use crate::status::{SpendPhase, StatusId};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input, should not retry without changes.
    ///
    /// Examples: unknown status id, malformed definition
    Validation,

    /// The caller's fixed setup cannot produce the requested outcome.
    ///
    /// Examples: a harness requesting a reaction spend without stacks.
    /// These indicate defects in test or harness setup.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error indicates a setup bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all duel-core errors.
pub trait RulesErrorKind: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str;
}

/// Boundary misuse detected by the rules layer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("status `{0}` is not registered")]
    UnknownStatus(StatusId),

    #[error("status `{status}` cannot be spent during {phase}")]
    SpendUnavailable { status: StatusId, phase: SpendPhase },

    #[error("status `{status}` definition is invalid: {reason}")]
    InvalidDefinition {
        status: StatusId,
        reason: &'static str,
    },
}

impl RulesErrorKind for RulesError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownStatus(_) | Self::InvalidDefinition { .. } => ErrorSeverity::Validation,
            Self::SpendUnavailable { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownStatus(_) => "UNKNOWN_STATUS",
            Self::SpendUnavailable { .. } => "SPEND_UNAVAILABLE",
            Self::InvalidDefinition { .. } => "INVALID_DEFINITION",
        }
    }
}
