//! Non-fatal conversion diagnostics.

use serde::Serialize;
use std::fmt;

/// What kind of stage recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SoftDiagnosticKind {
    /// The optimizer failed; the original markup was used.
    OptimizerFailure,
    /// The formatter failed; the built-in indenter was used.
    FormatterFailure,
    /// The parser repaired malformed markup.
    RecoveredMarkup,
}

impl SoftDiagnosticKind {
    /// Short human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            SoftDiagnosticKind::OptimizerFailure => "optimizer failure",
            SoftDiagnosticKind::FormatterFailure => "formatter failure",
            SoftDiagnosticKind::RecoveredMarkup => "recovered markup",
        }
    }
}

/// A recorded failure that did not stop the conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftDiagnostic {
    /// What recovered.
    pub kind: SoftDiagnosticKind,
    /// Why.
    pub message: String,
}

impl SoftDiagnostic {
    pub fn new(kind: SoftDiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SoftDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}
