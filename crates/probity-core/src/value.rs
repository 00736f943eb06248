//! Dynamically-typed runtime values
//!
//! A [`Value`] is an opaque handle to an arbitrary runtime value whose type is
//! only known at runtime. Nilable values (slices, maps, pointers, channels and
//! functions) model their nil state explicitly, and reference-like values keep
//! identity through shared allocations so address comparisons are meaningful.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::kind::{ComplexType, FloatType, IntType, Kind, UintType};
use crate::types::{InterfaceType, Signature, StructType, Type};

/// A runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// Untyped absence of a value
    Nil,
    Bool(bool),
    Int(IntType, i64),
    Uint(UintType, u64),
    Float(FloatType, f64),
    Complex(ComplexType, f64, f64),
    String(String),
    Array {
        elem: Type,
        items: Vec<Value>,
    },
    /// `items` is `None` for a nil slice
    Slice {
        elem: Type,
        items: Option<Vec<Value>>,
    },
    /// `entries` is `None` for a nil map
    Map {
        key: Type,
        value: Type,
        entries: Option<Vec<(Value, Value)>>,
    },
    Struct {
        ty: Arc<StructType>,
        fields: Vec<Value>,
    },
    /// `target` is `None` for a nil pointer
    Pointer {
        elem: Type,
        target: Option<Arc<Value>>,
    },
    Chan {
        elem: Type,
        chan: Option<Channel>,
    },
    Func {
        sig: Arc<Signature>,
        func: Option<Function>,
    },
}

impl Value {
    pub fn int(v: i64) -> Self {
        Value::Int(IntType::Int, v)
    }

    pub fn float64(v: f64) -> Self {
        Value::Float(FloatType::Float64, v)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// A `[]uint8` slice holding `bytes`
    pub fn bytes(bytes: &[u8]) -> Self {
        Value::slice(
            Type::byte(),
            bytes.iter().map(|b| Value::Uint(UintType::Uint8, u64::from(*b))).collect(),
        )
    }

    pub fn slice(elem: Type, items: Vec<Value>) -> Self {
        Value::Slice {
            elem,
            items: Some(items),
        }
    }

    pub fn nil_slice(elem: Type) -> Self {
        Value::Slice { elem, items: None }
    }

    pub fn array(elem: Type, items: Vec<Value>) -> Self {
        Value::Array { elem, items }
    }

    pub fn map(key: Type, value: Type, entries: Vec<(Value, Value)>) -> Self {
        Value::Map {
            key,
            value,
            entries: Some(entries),
        }
    }

    pub fn nil_map(key: Type, value: Type) -> Self {
        Value::Map {
            key,
            value,
            entries: None,
        }
    }

    pub fn structure(ty: Arc<StructType>, fields: Vec<Value>) -> Self {
        Value::Struct { ty, fields }
    }

    /// A pointer to a fresh allocation holding `target`
    ///
    /// The element type is taken from the target; pointing at the untyped
    /// absence yields a pointer to the empty interface.
    pub fn pointer(target: Value) -> Self {
        let elem = target.type_of().unwrap_or_else(Type::any);
        Value::Pointer {
            elem,
            target: Some(Arc::new(target)),
        }
    }

    pub fn nil_pointer(elem: Type) -> Self {
        Value::Pointer { elem, target: None }
    }

    /// A nil pointer to an interface type, used to name the interface
    /// in conformance checks
    pub fn interface_marker(iface: Arc<InterfaceType>) -> Self {
        Value::nil_pointer(Type::Interface(iface))
    }

    pub fn chan(elem: Type, chan: Channel) -> Self {
        Value::Chan {
            elem,
            chan: Some(chan),
        }
    }

    pub fn nil_chan(elem: Type) -> Self {
        Value::Chan { elem, chan: None }
    }

    pub fn func(sig: Arc<Signature>, func: Function) -> Self {
        Value::Func {
            sig,
            func: Some(func),
        }
    }

    pub fn nil_func(sig: Arc<Signature>) -> Self {
        Value::Func { sig, func: None }
    }

    /// True only for the untyped absence of a value
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Kind of the value's runtime type, `None` for the untyped absence
    pub fn kind(&self) -> Option<Kind> {
        let kind = match self {
            Value::Nil => return None,
            Value::Bool(_) => Kind::Bool,
            Value::Int(t, _) => t.kind(),
            Value::Uint(t, _) => t.kind(),
            Value::Float(t, _) => t.kind(),
            Value::Complex(t, ..) => t.kind(),
            Value::String(_) => Kind::String,
            Value::Array { .. } => Kind::Array,
            Value::Slice { .. } => Kind::Slice,
            Value::Map { .. } => Kind::Map,
            Value::Struct { .. } => Kind::Struct,
            Value::Pointer { .. } => Kind::Pointer,
            Value::Chan { .. } => Kind::Chan,
            Value::Func { .. } => Kind::Func,
        };
        Some(kind)
    }

    /// Kind name used in diagnostics, `nil` for the untyped absence
    pub fn kind_name(&self) -> String {
        self.kind()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "nil".to_string())
    }

    /// Runtime type of the value, `None` for the untyped absence
    pub fn type_of(&self) -> Option<Type> {
        let ty = match self {
            Value::Nil => return None,
            Value::Bool(_) => Type::Bool,
            Value::Int(t, _) => Type::Int(*t),
            Value::Uint(t, _) => Type::Uint(*t),
            Value::Float(t, _) => Type::Float(*t),
            Value::Complex(t, ..) => Type::Complex(*t),
            Value::String(_) => Type::String,
            Value::Array { elem, items } => Type::Array(Box::new(elem.clone()), items.len()),
            Value::Slice { elem, .. } => Type::Slice(Box::new(elem.clone())),
            Value::Map { key, value, .. } => {
                Type::Map(Box::new(key.clone()), Box::new(value.clone()))
            }
            Value::Struct { ty, .. } => Type::Struct(Arc::clone(ty)),
            Value::Pointer { elem, .. } => Type::Pointer(Box::new(elem.clone())),
            Value::Chan { elem, .. } => Type::Chan(Box::new(elem.clone())),
            Value::Func { sig, .. } => Type::Func(Arc::clone(sig)),
        };
        Some(ty)
    }

    /// Whether both values have the identical runtime type
    ///
    /// Equivalent to comparing [`Value::type_of`] without building the types.
    pub fn same_type(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(_), Value::Bool(_)) | (Value::String(_), Value::String(_)) => true,
            (Value::Int(a, _), Value::Int(b, _)) => a == b,
            (Value::Uint(a, _), Value::Uint(b, _)) => a == b,
            (Value::Float(a, _), Value::Float(b, _)) => a == b,
            (Value::Complex(a, ..), Value::Complex(b, ..)) => a == b,
            (
                Value::Array { elem: a, items: x },
                Value::Array { elem: b, items: y },
            ) => a == b && x.len() == y.len(),
            (Value::Slice { elem: a, .. }, Value::Slice { elem: b, .. })
            | (Value::Pointer { elem: a, .. }, Value::Pointer { elem: b, .. })
            | (Value::Chan { elem: a, .. }, Value::Chan { elem: b, .. }) => a == b,
            (
                Value::Map {
                    key: ka, value: va, ..
                },
                Value::Map {
                    key: kb, value: vb, ..
                },
            ) => ka == kb && va == vb,
            (Value::Struct { ty: a, .. }, Value::Struct { ty: b, .. }) => {
                Arc::ptr_eq(a, b) || a == b
            }
            (Value::Func { sig: a, .. }, Value::Func { sig: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Whether a nilable value currently holds its nil state
    ///
    /// Always false for non-nilable kinds and for the untyped absence.
    pub fn is_nil_reference(&self) -> bool {
        match self {
            Value::Slice { items, .. } => items.is_none(),
            Value::Map { entries, .. } => entries.is_none(),
            Value::Pointer { target, .. } => target.is_none(),
            Value::Chan { chan, .. } => chan.is_none(),
            Value::Func { func, .. } => func.is_none(),
            _ => false,
        }
    }

    /// Length of arrays, slices, maps, channels and strings
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.len()),
            Value::Array { items, .. } => Some(items.len()),
            Value::Slice { items, .. } => Some(items.as_ref().map_or(0, Vec::len)),
            Value::Map { entries, .. } => Some(entries.as_ref().map_or(0, Vec::len)),
            Value::Chan { chan, .. } => Some(chan.as_ref().map_or(0, Channel::len)),
            _ => None,
        }
    }

    /// Elements of an array or slice; a nil slice has no elements
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array { items, .. } => Some(items),
            Value::Slice { items, .. } => Some(items.as_deref().unwrap_or(&[])),
            _ => None,
        }
    }

    pub fn index(&self, i: usize) -> Option<&Value> {
        self.elements().and_then(|items| items.get(i))
    }

    /// The value a non-nil pointer points to
    pub fn elem(&self) -> Option<&Value> {
        match self {
            Value::Pointer {
                target: Some(target),
                ..
            } => Some(target),
            _ => None,
        }
    }

    /// Whether the value can be used as a map key
    ///
    /// Slices, maps and functions are not comparable; arrays and structs are
    /// comparable when all their elements are.
    pub fn is_comparable(&self) -> bool {
        match self {
            Value::Slice { .. } | Value::Map { .. } | Value::Func { .. } => false,
            Value::Array { items, .. } => items.iter().all(Value::is_comparable),
            Value::Struct { fields, .. } => fields.iter().all(Value::is_comparable),
            _ => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Contents of a `[]uint8` slice; a nil byte slice yields no bytes
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Value::Slice {
                elem: Type::Uint(UintType::Uint8),
                items,
            } => items
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(|item| match item {
                    Value::Uint(UintType::Uint8, b) => u8::try_from(*b).ok(),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("<nil>"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(_, v) => write!(f, "{}", v),
            Value::Uint(_, v) => write!(f, "{}", v),
            Value::Float(_, v) => write!(f, "{}", v),
            Value::Complex(_, re, im) => write!(f, "({}{:+}i)", re, im),
            Value::String(s) => f.write_str(s),
            Value::Array { items, .. } => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Value::Slice { items, .. } => {
                f.write_str("[")?;
                write_joined(f, items.as_deref().unwrap_or(&[]))?;
                f.write_str("]")
            }
            Value::Map { entries, .. } => {
                f.write_str("map[")?;
                for (i, (k, v)) in entries.as_deref().unwrap_or(&[]).iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                f.write_str("]")
            }
            Value::Struct { fields, .. } => {
                f.write_str("{")?;
                write_joined(f, fields)?;
                f.write_str("}")
            }
            Value::Pointer { target, .. } => match target {
                Some(target) => write!(f, "&{}", target),
                None => f.write_str("<nil>"),
            },
            Value::Chan { chan, .. } => match chan {
                Some(chan) => write!(f, "{:#x}", chan.address()),
                None => f.write_str("<nil>"),
            },
            Value::Func { func, .. } => match func {
                Some(func) => write!(f, "{:#x}", func.address()),
                None => f.write_str("<nil>"),
            },
        }
    }
}

/// A buffered channel handle; clones refer to the same channel
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelState>,
}

struct ChannelState {
    capacity: usize,
    buffer: Mutex<VecDeque<Value>>,
}

impl Channel {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(ChannelState {
                capacity,
                buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            }),
        }
    }

    /// An unbuffered channel
    pub fn unbuffered() -> Self {
        Self::with_capacity(0)
    }

    /// Buffer a value without blocking; returns false when the buffer is full
    pub fn try_send(&self, value: Value) -> bool {
        let mut buffer = self.inner.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        if buffer.len() >= self.inner.capacity {
            return false;
        }
        buffer.push_back(value);
        true
    }

    pub fn try_recv(&self) -> Option<Value> {
        self.inner
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// Number of buffered values
    pub fn len(&self) -> usize {
        self.inner
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn same_channel(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("capacity", &self.inner.capacity)
            .field("len", &self.len())
            .finish()
    }
}

type Callable = dyn Fn(&[Value]) -> Vec<Value> + Send + Sync;

/// A callable function value; clones refer to the same function
#[derive(Clone)]
pub struct Function {
    inner: Arc<Callable>,
}

impl Function {
    pub fn new(f: impl Fn(&[Value]) -> Vec<Value> + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    pub fn call(&self, args: &[Value]) -> Vec<Value> {
        (self.inner)(args)
    }

    pub fn same_function(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:#x})", self.address())
    }
}
