//! Comparison primitives over dynamic values
//!
//! This crate provides the value model the assertion library operates on
//! (`Value`, `Type`, `Kind`) together with the checks themselves: deep
//! equality, nil and emptiness classification, order-independent sequence
//! comparison, JSON-normalized equality and type conformance. Every check
//! returns an [`AssertResult`]; rendering failures is left to callers.

mod classify;
mod conformance;
mod equality;
mod error;
mod json;
mod kind;
mod multiset;
mod reflect;
mod types;
mod value;

pub use classify::{is_chan, is_empty, is_false, is_func, is_nil, is_nilable, is_true};
pub use conformance::{implements, is_same_pointer, is_type, is_wanted_error};
pub use equality::{deep_equal, equals, key_equal, not_equals};
pub use error::{ensure, AssertError, AssertResult, Side};
pub use json::{from_json, json_equals};
pub use kind::{Category, ComplexType, FloatType, IntType, Kind, UintType, NILABLE_KINDS};
pub use multiset::equals_ignoring_order;
pub use reflect::Reflect;
pub use types::{Field, InterfaceType, Signature, StructType, Type};
pub use value::{Channel, Function, Value};
