//! Outcome records handed back to command callers.
//!
//! A [`Report`] is a plain value. Emitting it to the log is a separate,
//! explicit step ([`Report::log`]).

use serde::{Deserialize, Serialize};

use crate::errors::{Classified, ErrorKind, Stage};

/// Report severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Completed with a caveat
    Warning,
    /// Failed
    Error,
}

/// Severity, class and message of an operation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// How bad it is.
    pub severity: Severity,
    /// Error class, for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    /// Stage, for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Human-readable message naming the entity involved.
    pub message: String,
}

impl Report {
    /// Informational report.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            kind: None,
            stage: None,
            message: message.into(),
        }
    }

    /// Warning report.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind: None,
            stage: None,
            message: message.into(),
        }
    }

    /// Failure report built from a classified error.
    pub fn from_error<E: Classified + ?Sized>(error: &E) -> Self {
        Self {
            severity: Severity::Error,
            kind: Some(error.kind()),
            stage: Some(error.stage()),
            message: error.to_string(),
        }
    }

    /// True for failures.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Emit through `tracing` at the matching level.
    pub fn log(&self) {
        match self.severity {
            Severity::Info => tracing::info!(message = %self.message),
            Severity::Warning => tracing::warn!(message = %self.message),
            Severity::Error => tracing::error!(
                kind = ?self.kind,
                stage = ?self.stage,
                message = %self.message
            ),
        }
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind, self.stage) {
            (Some(kind), Some(stage)) => write!(f, "{kind} during {stage}: {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}
