//! Failure message rendering

use std::fmt;

use probity_core::{Kind, Value};
use serde::Serialize;

use crate::stack::CallStackEntry;

/// Shown in place of the expected value for checks that take none
pub const NOT_APPLICABLE: &str = "N/A";

/// Render a value for a failure message
///
/// Functions and channels are shown by kind since their addresses mean
/// nothing to a reader.
pub fn describe(value: &Value) -> String {
    match value.kind() {
        Some(Kind::Func) => "function".to_string(),
        Some(Kind::Chan) => "chan".to_string(),
        _ => value.to_string(),
    }
}

/// A failed check, ready to be reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureMessage {
    pub description: String,
    /// Rendered expected value, `None` for checks without one
    pub want: Option<String>,
    pub got: String,
    /// Innermost frame first
    pub stack: Vec<CallStackEntry>,
}

impl FailureMessage {
    pub fn new(
        description: impl Into<String>,
        want: Option<&Value>,
        got: &Value,
        stack: Vec<CallStackEntry>,
    ) -> Self {
        Self {
            description: description.into(),
            want: want.map(describe),
            got: describe(got),
            stack,
        }
    }

    /// The full multi-line message
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Assertion failed!")?;
        writeln!(f, "\tDescription: {}", self.description)?;
        writeln!(
            f,
            "\tExpected: {}",
            self.want.as_deref().unwrap_or(NOT_APPLICABLE)
        )?;
        writeln!(f, "\tObserved: {}", self.got)?;
        writeln!(f)?;
        writeln!(f, "Call stack:")?;
        for entry in &self.stack {
            writeln!(f, "\t{}", entry)?;
        }
        Ok(())
    }
}
