//! Runtime kinds and the nilable category

use std::fmt;

/// Coarse classification of a runtime type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Array,
    Chan,
    Func,
    Interface,
    Map,
    Pointer,
    Slice,
    Struct,
}

/// Kinds whose values can hold an absent state
pub const NILABLE_KINDS: [Kind; 6] = [
    Kind::Chan,
    Kind::Func,
    Kind::Map,
    Kind::Interface,
    Kind::Pointer,
    Kind::Slice,
];

/// Whether values of a kind can be nil
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Nilable,
    NonNilable,
}

impl Kind {
    /// Category of this kind, derived only from the kind itself
    pub fn category(self) -> Category {
        if NILABLE_KINDS.contains(&self) {
            Category::Nilable
        } else {
            Category::NonNilable
        }
    }

    pub fn is_nilable(self) -> bool {
        self.category() == Category::Nilable
    }

    /// Fixed-size or variable-size ordered collection
    pub fn is_sequence(self) -> bool {
        matches!(self, Kind::Array | Kind::Slice)
    }

    fn name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Uintptr => "uintptr",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Complex64 => "complex64",
            Kind::Complex128 => "complex128",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Chan => "chan",
            Kind::Func => "func",
            Kind::Interface => "interface",
            Kind::Map => "map",
            Kind::Pointer => "ptr",
            Kind::Slice => "slice",
            Kind::Struct => "struct",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signed integer widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntType {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
}

impl IntType {
    pub fn kind(self) -> Kind {
        match self {
            IntType::Int => Kind::Int,
            IntType::Int8 => Kind::Int8,
            IntType::Int16 => Kind::Int16,
            IntType::Int32 => Kind::Int32,
            IntType::Int64 => Kind::Int64,
        }
    }
}

/// Unsigned integer widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UintType {
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
}

impl UintType {
    pub fn kind(self) -> Kind {
        match self {
            UintType::Uint => Kind::Uint,
            UintType::Uint8 => Kind::Uint8,
            UintType::Uint16 => Kind::Uint16,
            UintType::Uint32 => Kind::Uint32,
            UintType::Uint64 => Kind::Uint64,
            UintType::Uintptr => Kind::Uintptr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatType {
    Float32,
    Float64,
}

impl FloatType {
    pub fn kind(self) -> Kind {
        match self {
            FloatType::Float32 => Kind::Float32,
            FloatType::Float64 => Kind::Float64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplexType {
    Complex64,
    Complex128,
}

impl ComplexType {
    pub fn kind(self) -> Kind {
        match self {
            ComplexType::Complex64 => Kind::Complex64,
            ComplexType::Complex128 => Kind::Complex128,
        }
    }
}
