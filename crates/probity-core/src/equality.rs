//! Deep equality over dynamic values

use std::sync::Arc;

use tracing::trace;

use crate::classify::is_func;
use crate::error::{AssertError, AssertResult};
use crate::value::Value;

/// Assert that `got` equals `want`
///
/// Function-typed operands cannot be compared. Two absent values are equal,
/// one absent value never equals anything else, and all other values are
/// compared with [`deep_equal`].
pub fn equals(got: &Value, want: &Value) -> AssertResult<()> {
    validate_operands(got, want)?;
    if values_equal(got, want) {
        return Ok(());
    }
    match (got.type_of(), want.type_of()) {
        (Some(got_type), Some(want_type)) if got_type != want_type => {
            Err(AssertError::mismatch(format!(
                "Observed and expected values must be equal, found types {} and {}",
                got_type, want_type
            )))
        }
        _ => Err(AssertError::mismatch(
            "Observed and expected values must be equal",
        )),
    }
}

/// Assert that `got` does not equal `want`, with the same validation as [`equals`]
pub fn not_equals(got: &Value, want: &Value) -> AssertResult<()> {
    validate_operands(got, want)?;
    if values_equal(got, want) {
        Err(AssertError::mismatch(
            "Observed and expected values must be unequal",
        ))
    } else {
        Ok(())
    }
}

fn validate_operands(got: &Value, want: &Value) -> AssertResult<()> {
    if got.is_absent() && want.is_absent() {
        return Ok(());
    }
    if is_func(got) || is_func(want) {
        return Err(AssertError::invalid(
            "cannot compare equality for function type",
        ));
    }
    Ok(())
}

fn values_equal(got: &Value, want: &Value) -> bool {
    let equal = deep_equal(got, want);
    trace!(
        got_kind = %got.kind_name(),
        want_kind = %want.kind_name(),
        equal,
        "Compared values"
    );
    equal
}

/// Recursive structural equality
///
/// Values must have identical runtime types. Arrays, slices and structs are
/// compared element by element, maps key by key regardless of entry order.
/// A nil slice or map never equals a non-nil one, even an empty one.
/// Pointers are equal when they share an allocation or their targets are
/// deeply equal. Channels are equal only when they are the same channel and
/// functions only when both are nil. Floats follow IEEE equality, so NaN is
/// never equal to itself. Cyclic values are not guarded against.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Nil, _) | (_, Value::Nil) => false,
        _ => a.same_type(b) && deep_value_equal(a, b),
    }
}

fn deep_value_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(_, x), Value::Int(_, y)) => x == y,
        (Value::Uint(_, x), Value::Uint(_, y)) => x == y,
        (Value::Float(_, x), Value::Float(_, y)) => x == y,
        (Value::Complex(_, xr, xi), Value::Complex(_, yr, yi)) => xr == yr && xi == yi,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array { items: x, .. }, Value::Array { items: y, .. }) => all_equal(x, y),
        (Value::Slice { items: x, .. }, Value::Slice { items: y, .. }) => match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => all_equal(x, y),
            _ => false,
        },
        (Value::Map { entries: x, .. }, Value::Map { entries: y, .. }) => match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => {
                x.len() == y.len()
                    && x.iter().all(|(key, value)| {
                        lookup(y, key).is_some_and(|other| deep_equal(value, other))
                    })
            }
            _ => false,
        },
        (Value::Struct { fields: x, .. }, Value::Struct { fields: y, .. }) => all_equal(x, y),
        (Value::Pointer { target: x, .. }, Value::Pointer { target: y, .. }) => match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => Arc::ptr_eq(x, y) || deep_equal(x, y),
            _ => false,
        },
        (Value::Chan { chan: x, .. }, Value::Chan { chan: y, .. }) => match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => x.same_channel(y),
            _ => false,
        },
        (Value::Func { func: x, .. }, Value::Func { func: y, .. }) => x.is_none() && y.is_none(),
        _ => false,
    }
}

fn all_equal(x: &[Value], y: &[Value]) -> bool {
    x.len() == y.len() && x.iter().zip(y).all(|(a, b)| deep_equal(a, b))
}

fn lookup<'a>(entries: &'a [(Value, Value)], key: &Value) -> Option<&'a Value> {
    entries
        .iter()
        .find(|(candidate, _)| key_equal(candidate, key))
        .map(|(_, value)| value)
}

/// The `==` relation used for map keys
///
/// Unlike [`deep_equal`], pointers and channels compare by identity.
/// Slices, maps and non-nil functions are never key-equal.
pub fn key_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Nil, _) | (_, Value::Nil) => false,
        _ if !a.same_type(b) => false,
        (Value::Array { items: x, .. }, Value::Array { items: y, .. })
        | (Value::Struct { fields: x, .. }, Value::Struct { fields: y, .. }) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| key_equal(a, b))
        }
        (Value::Pointer { target: x, .. }, Value::Pointer { target: y, .. }) => match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => Arc::ptr_eq(x, y),
            _ => false,
        },
        (Value::Slice { .. }, _) | (Value::Map { .. }, _) | (Value::Func { .. }, _) => false,
        _ => deep_value_equal(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::IntType;
    use crate::types::{Signature, StructType, Type};
    use crate::value::{Channel, Function};

    fn noop() -> Value {
        Value::func(Signature::nullary(), Function::new(|_| Vec::new()))
    }

    #[test]
    fn test_equals_absent_values() {
        assert!(equals(&Value::Nil, &Value::Nil).is_ok());
        assert!(equals(&Value::Nil, &Value::int(3)).unwrap_err().is_mismatch());
        assert!(equals(&Value::int(3), &Value::Nil).unwrap_err().is_mismatch());
    }

    #[test]
    fn test_equals_rejects_functions() {
        let err = equals(&noop(), &Value::int(3)).unwrap_err();
        assert!(err.is_invalid_argument());
        let err = equals(&Value::string("x"), &noop()).unwrap_err();
        assert!(err.is_invalid_argument());
        let err = not_equals(&noop(), &noop()).unwrap_err();
        assert!(err.is_invalid_argument());
        let nil_func = Value::nil_func(Signature::nullary());
        assert!(equals(&nil_func, &Value::Nil).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_equals_is_reflexive() {
        let values = [
            Value::int(3),
            Value::string("dummy-string"),
            Value::from(vec![1i64, 2, 3]),
            Value::from([1i64, 2, 3]),
            Value::pointer(Value::from(vec![1i64])),
            Value::nil_map(Type::String, Type::String),
        ];
        for v in &values {
            assert!(equals(v, v).is_ok(), "{:?}", v);
            assert!(not_equals(v, v).unwrap_err().is_mismatch());
        }
    }

    #[test]
    fn test_types_must_match() {
        assert!(!deep_equal(&Value::from(3i64), &Value::from(3i32)));
        assert!(!deep_equal(&Value::int(3), &Value::string("3")));
        assert!(!deep_equal(&Value::from([1i64, 2]), &Value::from(vec![1i64, 2])));
    }

    #[test]
    fn test_type_mismatch_names_both_types() {
        let err = equals(&Value::from(3i32), &Value::int(3)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Observed and expected values must be equal, found types int32 and int"
        );
        let err = equals(&Value::int(3), &Value::int(4)).unwrap_err();
        assert_eq!(err.to_string(), "Observed and expected values must be equal");
        let err = equals(&Value::Nil, &Value::int(4)).unwrap_err();
        assert_eq!(err.to_string(), "Observed and expected values must be equal");
    }

    #[test]
    fn test_nil_slice_differs_from_empty_slice() {
        let nil = Value::nil_slice(Type::int());
        let empty = Value::slice(Type::int(), vec![]);
        assert!(!deep_equal(&nil, &empty));
        assert!(deep_equal(&nil, &Value::nil_slice(Type::int())));
    }

    #[test]
    fn test_map_ignores_entry_order() {
        let a = Value::map(
            Type::String,
            Type::int(),
            vec![(Value::string("a"), Value::int(1)), (Value::string("b"), Value::int(2))],
        );
        let b = Value::map(
            Type::String,
            Type::int(),
            vec![(Value::string("b"), Value::int(2)), (Value::string("a"), Value::int(1))],
        );
        let c = Value::map(
            Type::String,
            Type::int(),
            vec![(Value::string("a"), Value::int(1)), (Value::string("b"), Value::int(3))],
        );
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn test_pointers_compare_targets() {
        let a = Value::pointer(Value::int(1));
        let b = Value::pointer(Value::int(1));
        assert!(deep_equal(&a, &b));
        assert!(!key_equal(&a, &b));
        assert!(key_equal(&a, &a.clone()));
        assert!(!deep_equal(&a, &Value::nil_pointer(Type::int())));
    }

    #[test]
    fn test_struct_fields() {
        let ty = StructType::named("A").field("i", Type::int()).build();
        let other = StructType::named("B").field("i", Type::int()).build();
        let a = Value::structure(ty.clone(), vec![Value::int(5)]);
        assert!(deep_equal(&a, &Value::structure(ty.clone(), vec![Value::int(5)])));
        assert!(!deep_equal(&a, &Value::structure(ty, vec![Value::int(6)])));
        assert!(!deep_equal(&a, &Value::structure(other, vec![Value::int(5)])));
    }

    #[test]
    fn test_channels_compare_by_identity() {
        let chan = Channel::unbuffered();
        let a = Value::chan(Type::int(), chan.clone());
        let b = Value::chan(Type::int(), chan);
        let c = Value::chan(Type::int(), Channel::unbuffered());
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn test_functions_equal_only_when_nil() {
        let f = noop();
        assert!(!deep_equal(&f, &f));
        let nil = Value::nil_func(Signature::nullary());
        assert!(deep_equal(&nil, &nil));
    }

    #[test]
    fn test_nan_is_not_equal() {
        let nan = Value::float64(f64::NAN);
        assert!(!deep_equal(&nan, &nan));
    }

    #[test]
    fn test_interface_elements() {
        let a = Value::slice(Type::any(), vec![Value::int(1), Value::string("a"), Value::Nil]);
        let b = Value::slice(Type::any(), vec![Value::int(1), Value::string("a"), Value::Nil]);
        let c = Value::slice(
            Type::any(),
            vec![Value::Int(IntType::Int8, 1), Value::string("a"), Value::Nil],
        );
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }
}
