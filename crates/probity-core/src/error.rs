//! Error types for comparison primitives

use std::fmt;
use thiserror::Error;

/// Result type for comparison primitives; `Ok(())` means the check passed
pub type AssertResult<T> = Result<T, AssertError>;

/// Which operand of a comparison an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Observed,
    Expected,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Observed => write!(f, "observed"),
            Side::Expected => write!(f, "expected"),
        }
    }
}

/// Ways a comparison can fail
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssertError {
    /// An operand violates the primitive's type contract
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Malformed JSON input
    #[error("Could not JSON-unmarshal {side} value: {message}")]
    ParseFailure { side: Side, message: String },

    /// Operands are valid but the check did not hold
    #[error("{reason}")]
    Mismatch { reason: String },
}

impl AssertError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        AssertError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn mismatch(reason: impl Into<String>) -> Self {
        AssertError::Mismatch {
            reason: reason.into(),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, AssertError::InvalidArgument { .. })
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self, AssertError::ParseFailure { .. })
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, AssertError::Mismatch { .. })
    }
}

/// Turn a boolean check into an [`AssertResult`]
pub fn ensure(condition: bool, reason: &str) -> AssertResult<()> {
    if condition {
        Ok(())
    } else {
        Err(AssertError::mismatch(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AssertError::invalid("cannot compare equality for function type").to_string(),
            "Invalid argument: cannot compare equality for function type"
        );
        let err = AssertError::ParseFailure {
            side: Side::Expected,
            message: "EOF while parsing an object".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Could not JSON-unmarshal expected value: EOF while parsing an object"
        );
        assert_eq!(
            AssertError::mismatch("Values are not equal").to_string(),
            "Values are not equal"
        );
    }

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "unused").is_ok());
        let err = ensure(false, "Observed value must be true").unwrap_err();
        assert!(err.is_mismatch());
        assert!(!err.is_invalid_argument());
        assert!(!err.is_parse_failure());
    }
}
