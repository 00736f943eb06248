//! Runtime type identity and interface conformance

use std::sync::Arc;

use tracing::trace;

use crate::classify::is_nil;
use crate::error::{AssertError, AssertResult};
use crate::types::{InterfaceType, Type};
use crate::value::Value;

/// Assert that `got` and `want` have the same runtime type
///
/// Two pointers are compared by the types they point to, one level deep, and
/// a nil pointer on either side cannot be compared. Two absent values match.
pub fn is_type(got: &Value, want: &Value) -> AssertResult<()> {
    if got.is_absent() && want.is_absent() {
        return Ok(());
    }

    let same = match (got, want) {
        (Value::Pointer { target: g, .. }, Value::Pointer { target: w, .. }) => match (g, w) {
            (Some(g), Some(w)) => g.type_of() == w.type_of(),
            _ => false,
        },
        _ => got.type_of() == want.type_of(),
    };

    trace!(
        got_type = %describe_type(got),
        want_type = %describe_type(want),
        same,
        "Compared runtime types"
    );

    if same {
        Ok(())
    } else {
        Err(AssertError::mismatch(
            "Observed and expected values must be of the same Type",
        ))
    }
}

fn describe_type(v: &Value) -> String {
    v.type_of()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "nil".to_string())
}

/// Assert that `got` implements the interface named by `want`
///
/// `want` must be a pointer to an interface type, see
/// [`Value::interface_marker`]. Both values and pointers are accepted for
/// `got` but it must not be nil.
pub fn implements(got: &Value, want: &Value) -> AssertResult<()> {
    if is_nil(got) || want.is_absent() {
        return Err(AssertError::invalid("Observed/Expected value must non-nil"));
    }

    let iface = interface_of_marker(want)?;
    // a non-nil value always has a type
    let got_type = got.type_of().unwrap_or_else(Type::any);

    let missing = got_type.missing_methods(&iface);
    if missing.is_empty() {
        return Ok(());
    }
    Err(AssertError::mismatch(format!(
        "Observed value must implement expected interface {} (missing methods: {})",
        iface,
        missing.join(", ")
    )))
}

fn interface_of_marker(want: &Value) -> AssertResult<Arc<InterfaceType>> {
    match want {
        Value::Pointer {
            elem: Type::Interface(iface),
            ..
        } => Ok(Arc::clone(iface)),
        _ => Err(AssertError::invalid(
            "Expected value must be a pointer to an interface",
        )),
    }
}

/// Assert that two pointers hold the same address
///
/// Both operands must be pointers. Pointee values are not inspected: two
/// distinct allocations holding equal values are different pointers. Two nil
/// pointers of the same type hold the same address.
pub fn is_same_pointer(got: &Value, want: &Value) -> AssertResult<()> {
    let (
        Value::Pointer {
            elem: got_elem,
            target: got_target,
        },
        Value::Pointer {
            elem: want_elem,
            target: want_target,
        },
    ) = (got, want)
    else {
        return Err(AssertError::invalid(format!(
            "both observed and expected values must be pointers, found {} and {}",
            got.kind_name(),
            want.kind_name()
        )));
    };

    let same = got_elem == want_elem
        && match (got_target, want_target) {
            (None, None) => true,
            (Some(g), Some(w)) => Arc::ptr_eq(g, w),
            _ => false,
        };

    if same {
        Ok(())
    } else {
        Err(AssertError::mismatch(
            "Observed pointer must be the same as the expected",
        ))
    }
}

/// Assert that `got` is an error exactly when one is wanted
///
/// A non-nil `got` must implement the built-in `error` interface.
pub fn is_wanted_error(got: &Value, want_err: bool) -> AssertResult<()> {
    let nil = is_nil(got);
    if want_err && nil {
        return Err(AssertError::mismatch("Observed value must not be nil"));
    }
    if !want_err && !nil {
        return Err(AssertError::mismatch("Observed value must be nil"));
    }
    if !nil {
        let is_error = got
            .type_of()
            .is_some_and(|t| t.implements(&InterfaceType::error()));
        if !is_error {
            return Err(AssertError::mismatch("Observed value must be an error"));
        }
    }
    Ok(())
}
