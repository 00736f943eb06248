//! Fluent assertions bound to an observed value

use std::panic::Location;
use std::sync::Arc;

use probity_core::{self as primitives, ensure, AssertResult, Value};
use probity_report::{FailureMessage, ReportConfig, StackCapture};
use tracing::debug;

use crate::severity::Severity;
use crate::sink::FailureSink;

/// Build an assert function whose failures let the test continue
///
/// ```
/// use probity::{TestContext, Value};
///
/// let t = TestContext::new("doc");
/// let assert = probity::new(&t);
/// assert(Value::from(vec![1i64, 2])).is_not_empty();
/// assert(Value::from("on")).equals("on");
/// ```
pub fn new<'a, S: FailureSink + ?Sized>(
    sink: &'a S,
) -> impl Fn(Value) -> Asserter<'a, S> + 'a {
    with_severity(sink, Severity::Continue)
}

/// Build an assert function whose failures stop the test
pub fn new_fatal<'a, S: FailureSink + ?Sized>(
    sink: &'a S,
) -> impl Fn(Value) -> Asserter<'a, S> + 'a {
    with_severity(sink, Severity::Abort)
}

/// Build an assert function with an explicit [`Severity`]
pub fn with_severity<'a, S: FailureSink + ?Sized>(
    sink: &'a S,
    severity: Severity,
) -> impl Fn(Value) -> Asserter<'a, S> + 'a {
    let capture = sink
        .stack_capture()
        .unwrap_or_else(|| ReportConfig::from_env().stack_capture());
    move |got| Asserter {
        sink,
        capture: Arc::clone(&capture),
        severity,
        got,
    }
}

/// Checks against one observed value
///
/// Every check returns `true` when it holds. A failed check is reported to
/// the sink according to the asserter's [`Severity`].
pub struct Asserter<'s, S: FailureSink + ?Sized> {
    sink: &'s S,
    capture: Arc<dyn StackCapture>,
    severity: Severity,
    got: Value,
}

impl<'s, S: FailureSink + ?Sized> Asserter<'s, S> {
    /// The observed value
    pub fn got(&self) -> &Value {
        &self.got
    }

    /// Deep equality; function values cannot be compared
    #[track_caller]
    pub fn equals(&self, want: impl Into<Value>) -> bool {
        let want = want.into();
        self.conclude("equals", primitives::equals(&self.got, &want), Some(&want))
    }

    #[track_caller]
    pub fn not_equals(&self, want: impl Into<Value>) -> bool {
        let want = want.into();
        self.conclude("not_equals", primitives::not_equals(&self.got, &want), Some(&want))
    }

    /// Same distinct elements as `want`, in any order
    ///
    /// Arrays and slices may be mixed. Duplicates are not counted, see
    /// [`probity_core::equals_ignoring_order`].
    #[track_caller]
    pub fn equals_ignoring_order(&self, want: impl Into<Value>) -> bool {
        let want = want.into();
        self.conclude(
            "equals_ignoring_order",
            primitives::equals_ignoring_order(&self.got, &want),
            Some(&want),
        )
    }

    #[track_caller]
    pub fn is_empty(&self) -> bool {
        self.conclude(
            "is_empty",
            ensure(primitives::is_empty(&self.got), "Observed value must be empty"),
            None,
        )
    }

    #[track_caller]
    pub fn is_not_empty(&self) -> bool {
        self.conclude(
            "is_not_empty",
            ensure(!primitives::is_empty(&self.got), "Observed value must non-empty"),
            None,
        )
    }

    /// Untyped nil, or a nilable value in its nil state
    #[track_caller]
    pub fn is_nil(&self) -> bool {
        self.conclude(
            "is_nil",
            ensure(primitives::is_nil(&self.got), "Observed value must be nil"),
            None,
        )
    }

    #[track_caller]
    pub fn is_not_nil(&self) -> bool {
        self.conclude(
            "is_not_nil",
            ensure(!primitives::is_nil(&self.got), "Observed value must not be nil"),
            None,
        )
    }

    /// Only the boolean `true` passes
    #[track_caller]
    pub fn is_true(&self) -> bool {
        self.conclude(
            "is_true",
            ensure(primitives::is_true(&self.got), "Observed value must be true"),
            None,
        )
    }

    /// Only the boolean `false` passes
    #[track_caller]
    pub fn is_false(&self) -> bool {
        self.conclude(
            "is_false",
            ensure(primitives::is_false(&self.got), "Observed value must be false"),
            None,
        )
    }

    #[track_caller]
    pub fn is_function(&self) -> bool {
        self.conclude(
            "is_function",
            ensure(primitives::is_func(&self.got), "Observed value must be a function"),
            None,
        )
    }

    /// Same runtime type as `want`; pointers compare their pointee types
    #[track_caller]
    pub fn is_type(&self, want: impl Into<Value>) -> bool {
        let want = want.into();
        self.conclude("is_type", primitives::is_type(&self.got, &want), Some(&want))
    }

    /// Implements the interface `want` points to
    ///
    /// `want` is built with [`Value::interface_marker`].
    #[track_caller]
    pub fn implements(&self, want: impl Into<Value>) -> bool {
        let want = want.into();
        self.conclude("implements", primitives::implements(&self.got, &want), Some(&want))
    }

    /// Both sides are JSON text (strings or byte slices) encoding the same document
    #[track_caller]
    pub fn is_json_equal_to(&self, want: impl Into<Value>) -> bool {
        let want = want.into();
        self.conclude(
            "is_json_equal_to",
            primitives::json_equals(&self.got, &want),
            Some(&want),
        )
    }

    /// Both sides are pointers to the same allocation
    #[track_caller]
    pub fn is_pointer_with_same_address_as(&self, want: impl Into<Value>) -> bool {
        let want = want.into();
        self.conclude(
            "is_pointer_with_same_address_as",
            primitives::is_same_pointer(&self.got, &want),
            Some(&want),
        )
    }

    /// An error is present exactly when `want_err` is set
    ///
    /// ```
    /// use probity::{StructType, TestContext, Value};
    ///
    /// let t = TestContext::new("doc");
    /// let assert = probity::new(&t);
    /// let not_found = StructType::named("NotFound").method("Error").build();
    /// let err = Value::pointer(Value::structure(not_found, vec![]));
    /// assert(err).is_wanted_error(true);
    /// assert(Value::Nil).is_wanted_error(false);
    /// ```
    #[track_caller]
    pub fn is_wanted_error(&self, want_err: bool) -> bool {
        let want = Value::from(want_err);
        self.conclude(
            "is_wanted_error",
            primitives::is_wanted_error(&self.got, want_err),
            Some(&want),
        )
    }

    #[track_caller]
    fn conclude(
        &self,
        check: &'static str,
        outcome: AssertResult<()>,
        want: Option<&Value>,
    ) -> bool {
        match outcome {
            Ok(()) => {
                debug!(check, got = %self.got.kind_name(), "Assertion passed");
                true
            }
            Err(err) => {
                debug!(check, severity = %self.severity, error = %err, "Assertion failed");
                let stack = self.capture.capture(Location::caller());
                let message = FailureMessage::new(err.to_string(), want, &self.got, stack);
                match self.severity {
                    Severity::Continue => self.sink.fail(&message),
                    Severity::Abort => self.sink.fail_now(&message),
                }
                false
            }
        }
    }
}
