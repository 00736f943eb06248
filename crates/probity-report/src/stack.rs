//! Call stack capture

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

/// Symbol of the function every backtrace is taken from
pub const BOUNDARY_SYMBOL: &str = "probity_report::stack::capture_boundary";

/// Frame the test harness wraps each test in
pub const HARNESS_SENTINEL: &str = "__rust_begin_short_backtrace";

/// Function name used when only a source location is known
const UNKNOWN_FUNCTION: &str = "<unknown>";

const RUNTIME_PREFIXES: [&str; 4] = ["core::", "std::", "alloc::", "test::"];
const LIBRARY_PREFIXES: [&str; 3] = ["probity::", "probity_core::", "probity_report::"];

/// Self types of the closure and fn-pointer shims in `<T as Trait>::method` frames
const SHIM_SELF_TYPES: [&str; 4] = ["fn(", "fn ", "dyn ", "&"];

/// Source paths of the standard library as recorded in debug info
const TOOLCHAIN_PATHS: [&str; 2] = ["/rustc/", "/rustlib/src/rust/library/"];

static FRAME_LINE: OnceLock<Option<Regex>> = OnceLock::new();
static LOCATION_LINE: OnceLock<Option<Regex>> = OnceLock::new();
static SYMBOL_HASH: OnceLock<Option<Regex>> = OnceLock::new();

fn frame_line() -> Option<&'static Regex> {
    FRAME_LINE
        .get_or_init(|| Regex::new(r"^\s*(?:\d+:\s+)?(\S.*?)\s*$").ok())
        .as_ref()
}

fn location_line() -> Option<&'static Regex> {
    LOCATION_LINE
        .get_or_init(|| Regex::new(r"^\s+at\s+(.+?):(\d+)(?::\d+)?\s*$").ok())
        .as_ref()
}

fn symbol_hash() -> Option<&'static Regex> {
    SYMBOL_HASH
        .get_or_init(|| Regex::new(r"::h[0-9a-f]{16}$").ok())
        .as_ref()
}

/// One frame of a rendered call stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallStackEntry {
    /// Source file name without its directory
    pub file: String,
    /// Last two path segments of the function
    pub function: String,
    pub line: u32,
}

impl CallStackEntry {
    pub fn new(file: impl Into<String>, function: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            function: function.into(),
            line,
        }
    }

    /// Entry for a caller location with no known function
    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(
            basename(location.file()),
            UNKNOWN_FUNCTION,
            location.line(),
        )
    }
}

impl fmt::Display for CallStackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.file, self.line, self.function)
    }
}

/// Source of the frames shown under `Call stack:`
///
/// `caller` is the location of the assertion call, available even when a
/// full backtrace is not.
pub trait StackCapture: Send + Sync {
    fn capture(&self, caller: &'static Location<'static>) -> Vec<CallStackEntry>;
}

/// Captures and parses a full backtrace
///
/// Only frames between [`capture_boundary`] and the test harness are kept,
/// without runtime or probity frames, innermost first.
#[derive(Debug, Clone)]
pub struct BacktraceCapture {
    max_frames: usize,
}

impl BacktraceCapture {
    pub fn new(max_frames: usize) -> Self {
        Self { max_frames }
    }
}

impl StackCapture for BacktraceCapture {
    fn capture(&self, caller: &'static Location<'static>) -> Vec<CallStackEntry> {
        let backtrace = capture_boundary();
        let frames = parse_backtrace(&backtrace.to_string());
        let entries = select_frames(frames, self.max_frames);
        if entries.is_empty() {
            debug!(
                file = caller.file(),
                line = caller.line(),
                "No usable backtrace frames, using caller location"
            );
            return vec![CallStackEntry::from_location(caller)];
        }
        entries
    }
}

/// Reports only the location of the assertion call
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerCapture;

impl StackCapture for CallerCapture {
    fn capture(&self, caller: &'static Location<'static>) -> Vec<CallStackEntry> {
        vec![CallStackEntry::from_location(caller)]
    }
}

/// Always reports the same frames
#[derive(Debug, Clone, Default)]
pub struct FixedCapture {
    frames: Vec<CallStackEntry>,
}

impl FixedCapture {
    pub fn new(frames: Vec<CallStackEntry>) -> Self {
        Self { frames }
    }

    /// Reports no frames at all
    pub fn empty() -> Self {
        Self::default()
    }
}

impl StackCapture for FixedCapture {
    fn capture(&self, _caller: &'static Location<'static>) -> Vec<CallStackEntry> {
        self.frames.clone()
    }
}

/// Take a backtrace whose frames above this one belong to the caller
#[inline(never)]
pub fn capture_boundary() -> Backtrace {
    let backtrace = Backtrace::force_capture();
    // keeps this frame on the stack instead of a tail call
    std::hint::black_box(&backtrace);
    backtrace
}

/// A frame as read from a rendered backtrace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub function: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

/// Read the frames out of a rendered [`Backtrace`]
///
/// Inlined frames show up as separate entries. A frame takes the first
/// source location listed under it.
pub fn parse_backtrace(text: &str) -> Vec<RawFrame> {
    let (Some(frame_re), Some(location_re)) = (frame_line(), location_line()) else {
        return Vec::new();
    };

    let mut frames: Vec<RawFrame> = Vec::new();
    for line in text.lines() {
        if let Some(caps) = location_re.captures(line) {
            if let Some(frame) = frames.last_mut() {
                if frame.file.is_none() {
                    frame.file = Some(caps[1].to_string());
                    frame.line = caps[2].parse().ok();
                }
            }
            continue;
        }
        if let Some(caps) = frame_re.captures(line) {
            frames.push(RawFrame {
                function: strip_hash(&caps[1]),
                file: None,
                line: None,
            });
        }
    }
    trace!(count = frames.len(), "Parsed backtrace frames");
    frames
}

fn strip_hash(symbol: &str) -> String {
    match symbol_hash() {
        Some(re) => re.replace(symbol, "").into_owned(),
        None => symbol.to_string(),
    }
}

/// Keep the frames that belong to the code under test
///
/// Frames up to and including [`BOUNDARY_SYMBOL`] are dropped, as is
/// everything from the harness sentinel outward. Runtime frames, probity's
/// own frames and frames without a source location are skipped.
pub fn select_frames(frames: Vec<RawFrame>, max_frames: usize) -> Vec<CallStackEntry> {
    let start = frames
        .iter()
        .position(|frame| strip_generic_args(&frame.function) == BOUNDARY_SYMBOL)
        .map_or(0, |index| index + 1);

    frames
        .into_iter()
        .skip(start)
        .take_while(|frame| !is_harness_frame(&frame.function))
        .filter_map(|frame| {
            let (Some(file), Some(line)) = (frame.file, frame.line) else {
                return None;
            };
            let function = strip_generic_args(&frame.function);
            if is_toolchain_file(&file) || !is_user_function(&function) {
                return None;
            }
            Some(CallStackEntry::new(
                basename(&file),
                short_function_name(&function),
                line,
            ))
        })
        .take(max_frames)
        .collect()
}

/// Drop turbofish arguments such as `::<T, fn() -> U>` from a symbol
pub fn strip_generic_args(function: &str) -> String {
    split_path(function)
        .into_iter()
        .enumerate()
        .filter(|(index, segment)| *index == 0 || !segment.starts_with('<'))
        .map(|(_, segment)| segment)
        .collect::<Vec<_>>()
        .join("::")
}

fn is_harness_frame(function: &str) -> bool {
    strip_generic_args(function).ends_with(HARNESS_SENTINEL)
}

fn is_toolchain_file(file: &str) -> bool {
    let file = file.replace('\\', "/");
    TOOLCHAIN_PATHS.iter().any(|path| file.contains(path))
}

fn is_user_function(function: &str) -> bool {
    let path = function.strip_prefix('<').unwrap_or(function);
    if RUNTIME_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return false;
    }
    let qualified = function.starts_with('<');
    if qualified && SHIM_SELF_TYPES.iter().any(|prefix| path.starts_with(prefix)) {
        return false;
    }
    // probity's own unit tests still count as user code
    !LIBRARY_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) || path.contains("::tests::")
}

/// The last two segments of a function path
///
/// Separators inside generic arguments are not split on, so
/// `<a::B as c::D>::run` keeps its qualified self type intact.
pub fn short_function_name(function: &str) -> String {
    let segments = split_path(function);
    let keep = segments.len().saturating_sub(2);
    segments[keep..].join("::")
}

fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&path[start..]);
    segments
}

fn basename(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "   0: std::backtrace_rs::backtrace::libunwind::trace
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/std/src/../../backtrace/src/backtrace/libunwind.rs:116:5
   1: std::backtrace::Backtrace::create
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/std/src/backtrace.rs:331:13
   2: probity_report::stack::capture_boundary
             at ./crates/probity-report/src/stack.rs:170:21
   3: <probity_report::stack::BacktraceCapture as probity_report::stack::StackCapture>::capture
             at ./crates/probity-report/src/stack.rs:118:25
   4: probity::asserter::Asserter<S>::conclude
             at ./crates/probity/src/asserter.rs:236:29
   5: probity::asserter::Asserter<S>::equals
             at ./crates/probity/src/asserter.rs:74:9
   6: assertions::check_reading
             at ./crates/probity/tests/assertions.rs:40:5
   7: assertions::test_reading
             at ./crates/probity/tests/assertions.rs:50:5
   8: assertions::test_reading::{closure#0}
             at ./crates/probity/tests/assertions.rs:48:20
   9: <fn() -> core::result::Result<(), alloc::string::String> as core::ops::function::FnOnce<()>>::call_once
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/core/src/ops/function.rs:250:5
  10: test::__rust_begin_short_backtrace::<core::result::Result<(), alloc::string::String>, fn() -> core::result::Result<(), alloc::string::String>>
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/test/src/lib.rs:663:18
  11: test::run_test_in_process
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/test/src/lib.rs:686:27
  12: test::run_test::{closure#0}
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/test/src/lib.rs:607:43
";

    /// Calls [`BacktraceCapture`] one frame below the test
    #[inline(never)]
    fn capture_from_helper() -> Vec<CallStackEntry> {
        BacktraceCapture::new(32).capture(Location::caller())
    }

    fn is_runtime_entry(entry: &CallStackEntry) -> bool {
        ["test::", "core::", "std::", "alloc::"]
            .iter()
            .any(|prefix| entry.function.contains(prefix))
            || entry.function.contains("call_once")
            || entry.function.contains("run_test")
    }

    #[test]
    fn test_parse_backtrace() {
        let frames = parse_backtrace(SAMPLE);
        assert_eq!(frames.len(), 13);
        assert_eq!(frames[2].function, BOUNDARY_SYMBOL);
        assert_eq!(frames[2].line, Some(170));
        assert_eq!(frames[7].function, "assertions::test_reading");
        assert_eq!(frames[7].file.as_deref(), Some("./crates/probity/tests/assertions.rs"));
    }

    #[test]
    fn test_select_frames_between_boundary_and_harness() {
        let entries = select_frames(parse_backtrace(SAMPLE), 32);
        assert_eq!(
            entries,
            vec![
                CallStackEntry::new("assertions.rs", "assertions::check_reading", 40),
                CallStackEntry::new("assertions.rs", "assertions::test_reading", 50),
                CallStackEntry::new("assertions.rs", "test_reading::{closure#0}", 48),
            ]
        );
    }

    #[test]
    fn test_runtime_frames_are_dropped_without_harness() {
        let text = "   0: probity_report::stack::capture_boundary
             at ./crates/probity-report/src/stack.rs:170:21
   1: worker::run
             at ./src/worker.rs:9:5
   2: <fn() as core::ops::function::FnOnce<()>>::call_once
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/core/src/ops/function.rs:250:5
   3: test::run_test_in_process
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/test/src/lib.rs:686:27
   4: std::thread::Builder::spawn_unchecked_::{closure#1}
             at /home/dev/.rustup/toolchains/stable/lib/rustlib/src/rust/library/std/src/thread/mod.rs:561:30
";
        let entries = select_frames(parse_backtrace(text), 32);
        assert_eq!(entries, vec![CallStackEntry::new("worker.rs", "worker::run", 9)]);
    }

    #[test]
    fn test_strip_generic_args() {
        assert_eq!(
            strip_generic_args(
                "test::__rust_begin_short_backtrace::<core::result::Result<(), alloc::string::String>, fn() -> core::result::Result<(), alloc::string::String>>"
            ),
            "test::__rust_begin_short_backtrace"
        );
        assert_eq!(
            strip_generic_args("probity::asserter::Asserter<S>::equals"),
            "probity::asserter::Asserter<S>::equals"
        );
        assert_eq!(strip_generic_args("<a::B as c::D>::run"), "<a::B as c::D>::run");
    }

    #[test]
    fn test_backtrace_capture_starts_at_caller_and_stops_at_harness() {
        let entries = capture_from_helper();
        assert!(entries.len() >= 2, "{:?}", entries);
        assert_eq!(entries[0].function, "tests::capture_from_helper");
        assert_eq!(entries[0].file, "stack.rs");
        assert_eq!(
            entries[1].function,
            "tests::test_backtrace_capture_starts_at_caller_and_stops_at_harness"
        );
        let last = entries.last().map(|e| e.function.as_str()).unwrap_or_default();
        assert!(
            last.contains("test_backtrace_capture_starts_at_caller_and_stops_at_harness"),
            "{:?}",
            entries
        );
        assert!(!entries.iter().any(is_runtime_entry), "{:?}", entries);
    }

    #[test]
    fn test_select_frames_respects_limit() {
        let entries = select_frames(parse_backtrace(SAMPLE), 1);
        assert_eq!(
            entries,
            vec![CallStackEntry::new("assertions.rs", "assertions::check_reading", 40)]
        );
    }

    #[test]
    fn test_frames_without_locations_are_dropped() {
        let text = "   0: probity_report::stack::capture_boundary
   1: app::check
   2: app::main
             at src/main.rs:3:5
";
        let entries = select_frames(parse_backtrace(text), 32);
        assert_eq!(entries, vec![CallStackEntry::new("main.rs", "app::main", 3)]);
    }

    #[test]
    fn test_symbol_hashes_are_stripped() {
        let frames = parse_backtrace("   0: app::check::h0123456789abcdef\n");
        assert_eq!(frames[0].function, "app::check");
    }

    #[test]
    fn test_short_function_name() {
        assert_eq!(short_function_name("a::b::c::d"), "c::d");
        assert_eq!(short_function_name("main"), "main");
        assert_eq!(
            short_function_name("<a::B as c::D>::run"),
            "<a::B as c::D>::run"
        );
        assert_eq!(
            short_function_name("x::Wrapper<a::b::C>::get"),
            "Wrapper<a::b::C>::get"
        );
    }

    #[test]
    fn test_entry_display() {
        let entry = CallStackEntry::new("file.rs", "tests::test_x", 12);
        assert_eq!(entry.to_string(), "file.rs.12: tests::test_x");
    }

    #[test]
    fn test_caller_capture() {
        let caller = Location::caller();
        let entries = CallerCapture.capture(caller);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file, "stack.rs");
        assert_eq!(entries[0].function, UNKNOWN_FUNCTION);
        assert_eq!(entries[0].line, caller.line());
    }

    #[test]
    fn test_backtrace_capture_respects_limit() {
        let entries = BacktraceCapture::new(1).capture(Location::caller());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file, "stack.rs");
    }

    #[test]
    fn test_fixed_capture() {
        let frames = vec![CallStackEntry::new("a.rs", "m::f", 1)];
        assert_eq!(FixedCapture::new(frames.clone()).capture(Location::caller()), frames);
        assert!(FixedCapture::empty().capture(Location::caller()).is_empty());
    }
}
