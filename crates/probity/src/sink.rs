//! Where failed assertions are reported

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use probity_report::{FailureMessage, StackCapture};
use tracing::warn;

/// Receiver of failed assertions
///
/// Implementations decide how a failure marks the running test. `fail`
/// returns so the test can continue, `fail_now` must not return.
pub trait FailureSink {
    /// Mark the test failed and continue
    fn fail(&self, message: &FailureMessage);

    /// Mark the test failed and stop it
    fn fail_now(&self, message: &FailureMessage) -> !;

    /// Stack capture to use instead of the configured default
    fn stack_capture(&self) -> Option<Arc<dyn StackCapture>> {
        None
    }
}

/// Failure record for a single test
///
/// Shareable between scoped threads of the same test. Unless detached, a
/// context that recorded failures panics with all of them when dropped, so
/// the owning test fails even when every assertion continued.
pub struct TestContext {
    name: String,
    failures: Mutex<Vec<FailureMessage>>,
    capture: Option<Arc<dyn StackCapture>>,
    panic_on_drop: bool,
}

impl TestContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failures: Mutex::new(Vec::new()),
            capture: None,
            panic_on_drop: true,
        }
    }

    /// A context that only records; dropping it never panics
    pub fn detached(name: impl Into<String>) -> Self {
        let mut context = Self::new(name);
        context.panic_on_drop = false;
        context
    }

    /// Use `capture` for call stacks instead of the configured default
    pub fn with_capture(mut self, capture: impl StackCapture + 'static) -> Self {
        self.capture = Some(Arc::new(capture));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether any assertion has failed
    pub fn failed(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Failures recorded so far, oldest first
    pub fn failures(&self) -> Vec<FailureMessage> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<FailureMessage>> {
        // a panicking assertion thread must not hide earlier failures
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, message: &FailureMessage) {
        warn!(
            test = %self.name,
            description = %message.description,
            "Assertion failed"
        );
        self.lock().push(message.clone());
    }
}

impl FailureSink for TestContext {
    fn fail(&self, message: &FailureMessage) {
        self.record(message);
    }

    fn fail_now(&self, message: &FailureMessage) -> ! {
        self.record(message);
        panic!("{}", message);
    }

    fn stack_capture(&self) -> Option<Arc<dyn StackCapture>> {
        self.capture.clone()
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("name", &self.name)
            .field("failures", &self.lock().len())
            .field("panic_on_drop", &self.panic_on_drop)
            .finish()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if !self.panic_on_drop || thread::panicking() {
            return;
        }
        let failures = std::mem::take(
            self.failures
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if failures.is_empty() {
            return;
        }
        let rendered: Vec<String> = failures.iter().map(FailureMessage::render).collect();
        panic!(
            "{} assertion(s) failed in {}\n\n{}",
            failures.len(),
            self.name,
            rendered.join("\n")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probity_core::Value;
    use probity_report::{CallStackEntry, FixedCapture};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn message(description: &str) -> FailureMessage {
        FailureMessage::new(description, None, &Value::int(1), vec![])
    }

    #[test]
    fn test_fail_records_and_continues() {
        let t = TestContext::detached("records");
        assert!(!t.failed());
        t.fail(&message("first"));
        t.fail(&message("second"));
        assert!(t.failed());
        let descriptions: Vec<String> = t.failures().into_iter().map(|m| m.description).collect();
        assert_eq!(descriptions, vec!["first", "second"]);
    }

    #[test]
    fn test_fail_now_panics_with_message() {
        let t = TestContext::detached("aborts");
        let result = catch_unwind(AssertUnwindSafe(|| t.fail_now(&message("stop here"))));
        let payload = result.unwrap_err();
        let text = payload.downcast_ref::<String>().unwrap();
        assert!(text.starts_with("Assertion failed!\n\tDescription: stop here\n"));
        assert!(t.failed());
    }

    #[test]
    fn test_drop_panics_on_recorded_failures() {
        let result = catch_unwind(|| {
            let t = TestContext::new("drops");
            t.fail(&message("late failure"));
        });
        let payload = result.unwrap_err();
        let text = payload.downcast_ref::<String>().unwrap();
        assert!(text.starts_with("1 assertion(s) failed in drops"));
        assert!(text.contains("Description: late failure"));
    }

    #[test]
    fn test_drop_without_failures_is_quiet() {
        let result = catch_unwind(|| {
            let _t = TestContext::new("quiet");
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_detached_drop_keeps_failures_quiet() {
        let result = catch_unwind(|| {
            let t = TestContext::detached("detached");
            t.fail(&message("recorded only"));
            assert!(t.failed());
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_with_capture() {
        let frames = vec![CallStackEntry::new("a.rs", "m::f", 3)];
        let t = TestContext::detached("capture").with_capture(FixedCapture::new(frames.clone()));
        let capture = t.stack_capture().unwrap();
        assert_eq!(capture.capture(std::panic::Location::caller()), frames);
        assert!(TestContext::detached("none").stack_capture().is_none());
    }
}
