//! Fluent assertions for Rust tests
//!
//! `probity::new(&sink)` returns an assert function; calling it with an
//! observed value yields an [`Asserter`] whose checks report failures to the
//! sink. Failures are rendered with the expected value, the observed value
//! and the call stack of the assertion.
//!
//! ```
//! use probity::{TestContext, Type, Value};
//!
//! let t = TestContext::new("brightness");
//! let assert = probity::new(&t);
//!
//! assert(Value::from(vec!["b", "a"])).equals_ignoring_order(vec!["a", "b"]);
//! assert(Value::nil_slice(Type::int())).is_nil();
//! assert(Value::from(r#"{"on": true}"#)).is_json_equal_to(r#"{ "on": true }"#);
//! ```

mod asserter;
pub mod logging;
mod severity;
mod sink;

pub use asserter::{new, new_fatal, with_severity, Asserter};
pub use severity::Severity;
pub use sink::{FailureSink, TestContext};

pub use probity_core::{
    AssertError, AssertResult, Channel, ComplexType, FloatType, Function, IntType, InterfaceType,
    Kind, Reflect, Signature, StructType, Type, UintType, Value,
};
pub use probity_report::{
    BacktraceCapture, CallStackEntry, CallerCapture, FailureMessage, FixedCapture, ReportConfig,
    StackCapture, StackMode,
};
