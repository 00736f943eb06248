//! What happens to a test after a failed assertion

use std::fmt;

/// Reaction to a failed assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    /// Mark the test failed and keep running
    #[default]
    Continue,
    /// Mark the test failed and unwind it immediately
    Abort,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Continue => write!(f, "continue"),
            Severity::Abort => write!(f, "abort"),
        }
    }
}
