//! Failure reporting for probity assertions
//!
//! Renders a failed check into the fixed `Assertion failed!` message and
//! captures the call stack that led to it. Stack capture is pluggable through
//! [`StackCapture`]; [`ReportConfig`] picks a provider from the environment.

mod config;
mod message;
mod stack;

pub use config::{ReportConfig, StackMode, DEFAULT_MAX_FRAMES};
pub use message::{describe, FailureMessage, NOT_APPLICABLE};
pub use stack::{
    capture_boundary, parse_backtrace, select_frames, short_function_name, strip_generic_args,
    BacktraceCapture, CallStackEntry, CallerCapture, FixedCapture, RawFrame, StackCapture,
    BOUNDARY_SYMBOL, HARNESS_SENTINEL,
};
