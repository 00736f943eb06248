//! Conversion of statically typed Rust values into dynamic [`Value`]s

use std::collections::{BTreeMap, HashMap};

use crate::kind::{FloatType, IntType, UintType};
use crate::types::Type;
use crate::value::Value;

/// Types with a known runtime [`Type`] that can be lifted into a [`Value`]
pub trait Reflect {
    /// The runtime type every value of `Self` has
    fn reflect_type() -> Type;

    fn into_value(self) -> Value;
}

macro_rules! reflect_scalar {
    ($($ty:ty => $variant:ident($width:expr) as $repr:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn reflect_type() -> Type {
                    Type::$variant($width)
                }

                fn into_value(self) -> Value {
                    Value::$variant($width, self as $repr)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    v.into_value()
                }
            }
        )*
    };
}

reflect_scalar! {
    i8 => Int(IntType::Int8) as i64,
    i16 => Int(IntType::Int16) as i64,
    i32 => Int(IntType::Int32) as i64,
    i64 => Int(IntType::Int) as i64,
    isize => Int(IntType::Int) as i64,
    u8 => Uint(UintType::Uint8) as u64,
    u16 => Uint(UintType::Uint16) as u64,
    u32 => Uint(UintType::Uint32) as u64,
    u64 => Uint(UintType::Uint) as u64,
    usize => Uint(UintType::Uint) as u64,
    f32 => Float(FloatType::Float32) as f64,
    f64 => Float(FloatType::Float64) as f64,
}

impl Reflect for bool {
    fn reflect_type() -> Type {
        Type::Bool
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Characters are runes: 32-bit integers
impl Reflect for char {
    fn reflect_type() -> Type {
        Type::Int(IntType::Int32)
    }

    fn into_value(self) -> Value {
        Value::Int(IntType::Int32, i64::from(u32::from(self)))
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        v.into_value()
    }
}

impl Reflect for String {
    fn reflect_type() -> Type {
        Type::String
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl Reflect for &str {
    fn reflect_type() -> Type {
        Type::String
    }

    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Vectors become non-nil slices
impl<T: Reflect> Reflect for Vec<T> {
    fn reflect_type() -> Type {
        Type::slice_of(T::reflect_type())
    }

    fn into_value(self) -> Value {
        Value::slice(
            T::reflect_type(),
            self.into_iter().map(Reflect::into_value).collect(),
        )
    }
}

impl<T: Reflect> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        v.into_value()
    }
}

/// Fixed-size arrays keep their length in the type
impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect_type() -> Type {
        Type::array_of(T::reflect_type(), N)
    }

    fn into_value(self) -> Value {
        Value::array(
            T::reflect_type(),
            self.into_iter().map(Reflect::into_value).collect(),
        )
    }
}

impl<T: Reflect, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        v.into_value()
    }
}

/// Boxes become pointers to a fresh allocation
impl<T: Reflect> Reflect for Box<T> {
    fn reflect_type() -> Type {
        Type::pointer_to(T::reflect_type())
    }

    fn into_value(self) -> Value {
        Value::Pointer {
            elem: T::reflect_type(),
            target: Some(std::sync::Arc::new((*self).into_value())),
        }
    }
}

impl<T: Reflect> From<Box<T>> for Value {
    fn from(v: Box<T>) -> Self {
        v.into_value()
    }
}

fn map_value<K, V>(entries: impl Iterator<Item = (K, V)>) -> Value
where
    K: Reflect,
    V: Reflect,
{
    Value::map(
        K::reflect_type(),
        V::reflect_type(),
        entries
            .map(|(k, v)| (k.into_value(), v.into_value()))
            .collect(),
    )
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn reflect_type() -> Type {
        Type::map_of(K::reflect_type(), V::reflect_type())
    }

    fn into_value(self) -> Value {
        map_value(self.into_iter())
    }
}

impl<K: Reflect, V: Reflect> From<BTreeMap<K, V>> for Value {
    fn from(v: BTreeMap<K, V>) -> Self {
        v.into_value()
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn reflect_type() -> Type {
        Type::map_of(K::reflect_type(), V::reflect_type())
    }

    fn into_value(self) -> Value {
        map_value(self.into_iter())
    }
}

impl<K: Reflect, V: Reflect, S> From<HashMap<K, V, S>> for Value {
    fn from(v: HashMap<K, V, S>) -> Self {
        v.into_value()
    }
}
