//! Configuration for failure reporting

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::warn;

use crate::stack::{BacktraceCapture, CallerCapture, FixedCapture, StackCapture};

/// Default number of frames kept from a captured backtrace
pub const DEFAULT_MAX_FRAMES: usize = 32;

/// How much of the call stack a failure message shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackMode {
    /// Parse a full backtrace
    #[default]
    Backtrace,
    /// Only the location of the assertion call
    Caller,
    /// No frames
    Off,
}

impl FromStr for StackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backtrace" | "full" => Ok(StackMode::Backtrace),
            "caller" => Ok(StackMode::Caller),
            "off" | "none" => Ok(StackMode::Off),
            other => Err(format!("unknown stack mode: {}", other)),
        }
    }
}

impl fmt::Display for StackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackMode::Backtrace => write!(f, "backtrace"),
            StackMode::Caller => write!(f, "caller"),
            StackMode::Off => write!(f, "off"),
        }
    }
}

/// Configuration for failure reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Stack capture strategy (`PROBITY_STACK`)
    pub stack_mode: StackMode,
    /// Frame limit for backtrace capture (`PROBITY_MAX_FRAMES`)
    pub max_frames: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ReportConfig {
    pub fn new(stack_mode: StackMode, max_frames: usize) -> Self {
        Self {
            stack_mode,
            max_frames,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable source
    ///
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let stack_mode = match lookup("PROBITY_STACK") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Ignoring PROBITY_STACK");
                StackMode::default()
            }),
            None => StackMode::default(),
        };

        let max_frames = match lookup("PROBITY_MAX_FRAMES") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!(value = %raw, "Ignoring PROBITY_MAX_FRAMES, expected a positive integer");
                    DEFAULT_MAX_FRAMES
                }
            },
            None => DEFAULT_MAX_FRAMES,
        };

        Self {
            stack_mode,
            max_frames,
        }
    }

    /// Build the stack capture this configuration describes
    pub fn stack_capture(&self) -> Arc<dyn StackCapture> {
        match self.stack_mode {
            StackMode::Backtrace => Arc::new(BacktraceCapture::new(self.max_frames)),
            StackMode::Caller => Arc::new(CallerCapture),
            StackMode::Off => Arc::new(FixedCapture::empty()),
        }
    }
}
