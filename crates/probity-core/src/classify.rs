//! Category classification: nil-ability, nil state and emptiness

use tracing::trace;

use crate::equality::deep_equal;
use crate::kind::Kind;
use crate::value::Value;

/// Whether the value's runtime kind belongs to the nilable category
///
/// The untyped absence has no type and is therefore not nilable.
pub fn is_nilable(v: &Value) -> bool {
    v.kind().is_some_and(Kind::is_nilable)
}

/// Whether the value is the untyped absence or a nilable value in its nil state
pub fn is_nil(v: &Value) -> bool {
    if v.is_absent() {
        return true;
    }
    is_nilable(v) && v.is_nil_reference()
}

/// Whether the value is empty
///
/// Arrays, channels, maps and slices are empty when they have no elements.
/// Nil pointers are empty, other pointers are empty when what they point to
/// is. Every other value is empty when it equals its type's zero value.
/// Cyclic pointer chains are not guarded against.
pub fn is_empty(v: &Value) -> bool {
    match v {
        Value::Nil => true,
        Value::Array { .. } | Value::Chan { .. } | Value::Map { .. } | Value::Slice { .. } => {
            v.len() == Some(0)
        }
        Value::Pointer { target, .. } => match target {
            None => true,
            Some(target) => {
                trace!(kind = %target.kind_name(), "Checking emptiness through pointer");
                is_empty(target)
            }
        },
        _ => match v.type_of() {
            Some(ty) => deep_equal(v, &ty.zero()),
            None => true,
        },
    }
}

/// Whether the value is function-typed (nil functions included)
pub fn is_func(v: &Value) -> bool {
    v.kind() == Some(Kind::Func)
}

/// Whether the value is channel-typed (nil channels included)
pub fn is_chan(v: &Value) -> bool {
    v.kind() == Some(Kind::Chan)
}

/// Only the boolean `true` is true
pub fn is_true(v: &Value) -> bool {
    v.as_bool() == Some(true)
}

/// Only the boolean `false` is false
pub fn is_false(v: &Value) -> bool {
    v.as_bool() == Some(false)
}
