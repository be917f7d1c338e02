//! Diagnostics produced by the module analyzer

use crate::compat::Compatibility;
use crate::types::render;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    AttributeError,
    TypeError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based line of the module statement, 0 when unknown
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn attribute_error(line: usize, observed: &str, path: &[String]) -> Self {
        Self {
            line,
            kind: DiagnosticKind::AttributeError,
            message: format!(
                "possible attribute error: `{}` has no attribute `{}`",
                observed,
                path.join(".")
            ),
        }
    }

    pub fn type_error(line: usize, observed: &str, required: &str) -> Self {
        Self {
            line,
            kind: DiagnosticKind::TypeError,
            message: format!(
                "possible type error: `{}` is not compatible with `{}`",
                observed, required
            ),
        }
    }

    /// Diagnostics for one classification: one per missing path of a
    /// difference, one for an incompatibility, none when compatible.
    pub fn from_compatibility(line: usize, compatibility: &Compatibility) -> Vec<Diagnostic> {
        match compatibility {
            Compatibility::Ok => Vec::new(),
            Compatibility::Difference { observed, missing } => missing
                .iter()
                .map(|path| Diagnostic::attribute_error(line, observed, path))
                .collect(),
            Compatibility::Incompatible { observed, required } => {
                vec![Diagnostic::type_error(line, &render(observed), &render(required))]
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
