//! Reified runtime type metadata
//!
//! Every [`Value`] carries enough type information to rebuild its [`Type`],
//! and every [`Type`] can synthesize its zero value. Named struct types carry
//! method sets so interface conformance can be checked at runtime.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::kind::{ComplexType, FloatType, IntType, Kind, UintType};
use crate::value::Value;

/// Runtime type of a value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    Int(IntType),
    Uint(UintType),
    Float(FloatType),
    Complex(ComplexType),
    String,
    Array(Box<Type>, usize),
    Slice(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Struct(Arc<StructType>),
    Pointer(Box<Type>),
    Chan(Box<Type>),
    Func(Arc<Signature>),
    Interface(Arc<InterfaceType>),
}

impl Type {
    pub fn int() -> Self {
        Type::Int(IntType::Int)
    }

    pub fn byte() -> Self {
        Type::Uint(UintType::Uint8)
    }

    pub fn float64() -> Self {
        Type::Float(FloatType::Float64)
    }

    /// The empty interface, which every value satisfies
    pub fn any() -> Self {
        Type::Interface(Arc::new(InterfaceType::any()))
    }

    pub fn slice_of(elem: Type) -> Self {
        Type::Slice(Box::new(elem))
    }

    pub fn array_of(elem: Type, len: usize) -> Self {
        Type::Array(Box::new(elem), len)
    }

    pub fn map_of(key: Type, value: Type) -> Self {
        Type::Map(Box::new(key), Box::new(value))
    }

    pub fn pointer_to(elem: Type) -> Self {
        Type::Pointer(Box::new(elem))
    }

    pub fn chan_of(elem: Type) -> Self {
        Type::Chan(Box::new(elem))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Type::Bool => Kind::Bool,
            Type::Int(t) => t.kind(),
            Type::Uint(t) => t.kind(),
            Type::Float(t) => t.kind(),
            Type::Complex(t) => t.kind(),
            Type::String => Kind::String,
            Type::Array(..) => Kind::Array,
            Type::Slice(_) => Kind::Slice,
            Type::Map(..) => Kind::Map,
            Type::Struct(_) => Kind::Struct,
            Type::Pointer(_) => Kind::Pointer,
            Type::Chan(_) => Kind::Chan,
            Type::Func(_) => Kind::Func,
            Type::Interface(_) => Kind::Interface,
        }
    }

    /// Element type of arrays, slices, pointers and channels
    pub fn elem(&self) -> Option<&Type> {
        match self {
            Type::Array(elem, _) | Type::Slice(elem) | Type::Pointer(elem) | Type::Chan(elem) => {
                Some(elem)
            }
            Type::Map(_, value) => Some(value),
            _ => None,
        }
    }

    /// The canonical zero value of this type
    ///
    /// Nilable types yield their nil value and the empty interface yields the
    /// untyped absence, matching what an uninitialized variable would hold.
    pub fn zero(&self) -> Value {
        match self {
            Type::Bool => Value::Bool(false),
            Type::Int(t) => Value::Int(*t, 0),
            Type::Uint(t) => Value::Uint(*t, 0),
            Type::Float(t) => Value::Float(*t, 0.0),
            Type::Complex(t) => Value::Complex(*t, 0.0, 0.0),
            Type::String => Value::String(String::new()),
            Type::Array(elem, len) => Value::Array {
                elem: (**elem).clone(),
                items: (0..*len).map(|_| elem.zero()).collect(),
            },
            Type::Slice(elem) => Value::nil_slice((**elem).clone()),
            Type::Map(key, value) => Value::nil_map((**key).clone(), (**value).clone()),
            Type::Struct(ty) => Value::Struct {
                ty: Arc::clone(ty),
                fields: ty.fields.iter().map(|f| f.ty.zero()).collect(),
            },
            Type::Pointer(elem) => Value::nil_pointer((**elem).clone()),
            Type::Chan(elem) => Value::nil_chan((**elem).clone()),
            Type::Func(sig) => Value::Func {
                sig: Arc::clone(sig),
                func: None,
            },
            Type::Interface(_) => Value::Nil,
        }
    }

    /// Names of the methods callable on a value of this type
    ///
    /// Pointers to named structs see both value and pointer receiver methods,
    /// struct values only see value receiver methods.
    pub fn method_set(&self) -> BTreeSet<&str> {
        match self {
            Type::Struct(ty) => ty.methods.iter().map(String::as_str).collect(),
            Type::Pointer(elem) => match elem.as_ref() {
                Type::Struct(ty) => ty
                    .methods
                    .iter()
                    .chain(ty.pointer_methods.iter())
                    .map(String::as_str)
                    .collect(),
                _ => BTreeSet::new(),
            },
            Type::Interface(iface) => iface.methods.iter().map(String::as_str).collect(),
            _ => BTreeSet::new(),
        }
    }

    /// Methods required by `iface` that this type lacks
    pub fn missing_methods<'a>(&self, iface: &'a InterfaceType) -> Vec<&'a str> {
        let available = self.method_set();
        iface
            .methods
            .iter()
            .map(String::as_str)
            .filter(|m| !available.contains(m))
            .collect()
    }

    pub fn implements(&self, iface: &InterfaceType) -> bool {
        self.missing_methods(iface).is_empty()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Array(elem, len) => write!(f, "[{}]{}", len, elem),
            Type::Slice(elem) => write!(f, "[]{}", elem),
            Type::Map(key, value) => write!(f, "map[{}]{}", key, value),
            Type::Struct(ty) => write!(f, "{}", ty),
            Type::Pointer(elem) => write!(f, "*{}", elem),
            Type::Chan(elem) => write!(f, "chan {}", elem),
            Type::Func(sig) => write!(f, "{}", sig),
            Type::Interface(iface) => write!(f, "{}", iface),
            scalar => write!(f, "{}", scalar.kind()),
        }
    }
}

/// A named struct field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

/// Struct type with its declared fields and method sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StructType {
    /// Type name, empty for anonymous structs
    pub name: String,
    pub fields: Vec<Field>,
    /// Methods declared on the value receiver
    pub methods: BTreeSet<String>,
    /// Methods declared on the pointer receiver
    pub pointer_methods: BTreeSet<String>,
}

impl StructType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.methods.insert(name.into());
        self
    }

    pub fn pointer_method(mut self, name: impl Into<String>) -> Self {
        self.pointer_methods.insert(name.into());
        self
    }

    pub fn build(self) -> Arc<StructType> {
        Arc::new(self)
    }
}

impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            return f.write_str(&self.name);
        }
        f.write_str("struct {")?;
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " " } else { "; " };
            write!(f, "{}{} {}", sep, field.name, field.ty)?;
        }
        f.write_str(" }")
    }
}

/// Parameter and result types of a function
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<Type>,
    pub results: Vec<Type>,
}

impl Signature {
    pub fn new(params: Vec<Type>, results: Vec<Type>) -> Arc<Self> {
        Arc::new(Self { params, results })
    }

    /// `func()`
    pub fn nullary() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(Type::to_string).collect();
        write!(f, "func({})", params.join(", "))?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " {}", single),
            many => {
                let results: Vec<String> = many.iter().map(Type::to_string).collect();
                write!(f, " ({})", results.join(", "))
            }
        }
    }
}

/// An interface: a named set of required methods
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InterfaceType {
    pub name: String,
    pub methods: BTreeSet<String>,
}

impl InterfaceType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: BTreeSet::new(),
        }
    }

    /// The empty interface
    pub fn any() -> Self {
        Self::named("interface {}")
    }

    /// The built-in error interface
    pub fn error() -> Self {
        Self::named("error").method("Error")
    }

    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.methods.insert(name.into());
        self
    }

    pub fn build(self) -> Arc<InterfaceType> {
        Arc::new(self)
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
