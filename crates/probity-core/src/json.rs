//! JSON-normalized structural equality

use std::borrow::Cow;

use tracing::trace;

use crate::classify::is_nil;
use crate::equality::deep_equal;
use crate::error::{AssertError, AssertResult, Side};
use crate::types::Type;
use crate::value::Value;

/// Document used in place of empty input
const EMPTY_DOCUMENT: &[u8] = b"{}";

/// Assert that two JSON encodings describe the same document
///
/// Operands are strings or byte slices. Empty input is read as `{}`. Both
/// sides are decoded into generic trees and compared with [`deep_equal`], so
/// object member order is irrelevant while array order matters.
pub fn json_equals(got: &Value, want: &Value) -> AssertResult<()> {
    if is_nil(got) && is_nil(want) {
        return Ok(());
    }
    if got.is_absent() || want.is_absent() {
        return Err(AssertError::invalid(
            "observed and expected values must both be present",
        ));
    }

    let got_source = json_source(got, Side::Observed)?;
    let want_source = json_source(want, Side::Expected)?;

    let got_tree = decode(&got_source, Side::Observed)?;
    let want_tree = decode(&want_source, Side::Expected)?;

    if deep_equal(&got_tree, &want_tree) {
        Ok(())
    } else {
        Err(AssertError::mismatch("Values are not equal"))
    }
}

fn json_source(value: &Value, side: Side) -> AssertResult<Cow<'_, [u8]>> {
    let source: Cow<'_, [u8]> = match value {
        Value::String(s) => Cow::Borrowed(s.as_bytes()),
        Value::Slice { .. } => match value.as_bytes() {
            Some(bytes) => Cow::Owned(bytes),
            None => {
                return Err(AssertError::invalid(format!(
                    "{} slice must be a slice of bytes",
                    side
                )))
            }
        },
        other => {
            return Err(AssertError::invalid(format!(
                "{} value must be a string or slice of bytes, found {}",
                side,
                other.kind_name()
            )))
        }
    };
    if source.is_empty() {
        return Ok(Cow::Borrowed(EMPTY_DOCUMENT));
    }
    Ok(source)
}

fn decode(source: &[u8], side: Side) -> AssertResult<Value> {
    let tree: serde_json::Value =
        serde_json::from_slice(source).map_err(|e| AssertError::ParseFailure {
            side,
            message: e.to_string(),
        })?;
    trace!(%side, "Decoded JSON document");
    Ok(from_json(tree))
}

/// Convert a decoded JSON tree into a dynamic value
///
/// Objects become `map[string]interface {}`, arrays `[]interface {}`, numbers
/// `float64` and `null` the untyped absence.
pub fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::float64(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::slice(Type::any(), items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(members) => Value::map(
            Type::String,
            Type::any(),
            members
                .into_iter()
                .map(|(k, v)| (Value::String(k), from_json(v)))
                .collect(),
        ),
    }
}
