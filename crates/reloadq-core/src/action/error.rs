use std::fmt;

use thiserror::Error;

/// Reload phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Configuration test.
    Validate,
    /// Configuration activation.
    Apply,
}

impl Phase {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Validate => "validate",
            Phase::Apply => "apply",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Validate => "config test",
            Phase::Apply => "reload",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{phase} failed: {reason}{}", render_diagnostics(.diagnostics))]
    Failed {
        phase: Phase,
        reason: String,
        diagnostics: String,
    },

    #[error("{phase} timed out after {timeout_ms}ms")]
    Timeout { phase: Phase, timeout_ms: u64 },

    #[error("{phase} canceled")]
    Canceled { phase: Phase },
}

impl ActionError {
    /// Build a failure without captured output.
    pub fn failed(phase: Phase, reason: impl Into<String>) -> Self {
        ActionError::Failed {
            phase,
            reason: reason.into(),
            diagnostics: String::new(),
        }
    }

    /// Phase the error originated from.
    pub fn phase(&self) -> Phase {
        match self {
            ActionError::Failed { phase, .. }
            | ActionError::Timeout { phase, .. }
            | ActionError::Canceled { phase } => *phase,
        }
    }

    /// Captured tool output, empty if none.
    pub fn diagnostics(&self) -> &str {
        match self {
            ActionError::Failed { diagnostics, .. } => diagnostics,
            _ => "",
        }
    }
}

fn render_diagnostics(diagnostics: &str) -> String {
    if diagnostics.is_empty() {
        String::new()
    } else {
        format!(" ({diagnostics})")
    }
}
