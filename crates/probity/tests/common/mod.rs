//! Shared test utilities
//!
//! Provides contexts with a fixed call stack and tables of zero and non-zero
//! values for every kind.

#![allow(dead_code)]

use probity::{
    CallStackEntry, Channel, ComplexType, FixedCapture, FloatType, Function, Signature,
    StructType, TestContext, Type, Value,
};

/// Frame reported by [`context`]
pub fn test_frame() -> CallStackEntry {
    CallStackEntry::new("assertions.rs", "assertions::test_case", 7)
}

/// A detached context reporting [`test_frame`] as its only frame
pub fn context(name: &str) -> TestContext {
    probity::logging::init_test_logging();
    TestContext::detached(name).with_capture(FixedCapture::new(vec![test_frame()]))
}

pub fn noop_func() -> Value {
    Value::func(Signature::nullary(), Function::new(|_| Vec::new()))
}

pub fn point_type() -> std::sync::Arc<StructType> {
    StructType::named("Point")
        .field("x", Type::int())
        .field("y", Type::int())
        .build()
}

pub fn point(x: i64, y: i64) -> Value {
    Value::structure(point_type(), vec![Value::int(x), Value::int(y)])
}

/// One zero (or empty) value per kind
pub fn zero_values() -> Vec<(&'static str, Value)> {
    vec![
        ("array", Value::array(Type::int(), vec![])),
        ("bool", Value::from(false)),
        ("byte", Value::from(0u8)),
        ("chan", Value::chan(Type::int(), Channel::with_capacity(1))),
        ("complex64", Value::Complex(ComplexType::Complex64, 0.0, 0.0)),
        ("complex128", Value::Complex(ComplexType::Complex128, 0.0, 0.0)),
        ("float32", Value::Float(FloatType::Float32, 0.0)),
        ("func", Value::nil_func(Signature::nullary())),
        ("int", Value::int(0)),
        ("interface", Value::Nil),
        ("map", Value::nil_map(Type::String, Type::int())),
        ("ptr", Value::nil_pointer(Type::int())),
        ("nil slice", Value::nil_slice(Type::int())),
        ("empty slice", Value::slice(Type::int(), vec![])),
        ("string", Value::from("")),
        ("struct", point(0, 0)),
    ]
}

/// One non-zero (or non-empty) value per kind
pub fn non_zero_values() -> Vec<(&'static str, Value)> {
    let chan = Channel::with_capacity(1);
    chan.try_send(Value::int(1));
    vec![
        ("array", Value::from([1i64, 2, 3])),
        ("bool", Value::from(true)),
        ("byte", Value::from(b'a')),
        ("chan", Value::chan(Type::int(), chan)),
        ("complex64", Value::Complex(ComplexType::Complex64, 5.0, 2.0)),
        ("complex128", Value::Complex(ComplexType::Complex128, 5.0, 2.0)),
        ("float32", Value::from(1.5f32)),
        ("func", noop_func()),
        ("int", Value::int(3)),
        ("interface", Value::from("dummy-string")),
        (
            "map",
            Value::map(
                Type::String,
                Type::int(),
                vec![(Value::from("a"), Value::int(1))],
            ),
        ),
        ("ptr", Value::pointer(Value::int(3))),
        ("slice", Value::from(vec![1i64, 2, 3])),
        ("string", Value::from("dummy-string")),
        ("struct", point(1, 2)),
    ]
}
