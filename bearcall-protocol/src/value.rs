//! Value model for BCP arguments.
//!
//! Every value on the wire is one of the variants of [`Value`], identified by
//! a stable one-byte [`TypeTag`]. Containers hold further values, so an
//! argument is a tree with primitives and strings at the leaves.

use crate::error::ProtocolError;
use std::fmt;

/// One-byte type discriminator prefixed to every encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Bool = 1,
    U8 = 2,
    U16 = 3,
    U32 = 4,
    U64 = 5,
    I8 = 6,
    I16 = 7,
    I32 = 8,
    I64 = 9,
    F32 = 10,
    F64 = 11,
    C64 = 12,
    C128 = 13,
    Str = 14,
    Record = 15,
    Seq = 16,
    /// String-keyed map. Accepted on decode; the encoder always emits the
    /// generic [`TypeTag::Map`] instead.
    StrMap = 17,
    Map = 18,
}

impl TypeTag {
    /// Whether content under this tag has a fixed byte width.
    pub fn is_fixed_width(self) -> bool {
        (TypeTag::Bool as u8..=TypeTag::C128 as u8).contains(&(self as u8))
    }

    /// Stable lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::U8 => "uint8",
            TypeTag::U16 => "uint16",
            TypeTag::U32 => "uint32",
            TypeTag::U64 => "uint64",
            TypeTag::I8 => "int8",
            TypeTag::I16 => "int16",
            TypeTag::I32 => "int32",
            TypeTag::I64 => "int64",
            TypeTag::F32 => "float32",
            TypeTag::F64 => "float64",
            TypeTag::C64 => "complex64",
            TypeTag::C128 => "complex128",
            TypeTag::Str => "string",
            TypeTag::Record => "record",
            TypeTag::Seq => "sequence",
            TypeTag::StrMap => "string-keyed map",
            TypeTag::Map => "map",
        }
    }
}

impl TryFrom<u8> for TypeTag {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TypeTag::Bool),
            2 => Ok(TypeTag::U8),
            3 => Ok(TypeTag::U16),
            4 => Ok(TypeTag::U32),
            5 => Ok(TypeTag::U64),
            6 => Ok(TypeTag::I8),
            7 => Ok(TypeTag::I16),
            8 => Ok(TypeTag::I32),
            9 => Ok(TypeTag::I64),
            10 => Ok(TypeTag::F32),
            11 => Ok(TypeTag::F64),
            12 => Ok(TypeTag::C64),
            13 => Ok(TypeTag::C128),
            14 => Ok(TypeTag::Str),
            15 => Ok(TypeTag::Record),
            16 => Ok(TypeTag::Seq),
            17 => Ok(TypeTag::StrMap),
            18 => Ok(TypeTag::Map),
            other => Err(ProtocolError::UnknownTag(other)),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complex number with `f32` parts (wire tag [`TypeTag::C64`]).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex32 {
    pub re: f32,
    pub im: f32,
}

impl Complex32 {
    pub fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }
}

/// Complex number with `f64` parts (wire tag [`TypeTag::C128`]).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex64 {
    pub re: f64,
    pub im: f64,
}

impl Complex64 {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// A typed value carried by one argument.
///
/// Records keep their fields in declaration order; maps keep insertion order
/// (the encoder orders map pairs by the stringified key form, so the wire
/// encoding does not depend on insertion order).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    C64(Complex32),
    C128(Complex64),
    Str(String),
    Record(Vec<(String, Value)>),
    Seq(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// The wire tag this value encodes under.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Bool(_) => TypeTag::Bool,
            Value::U8(_) => TypeTag::U8,
            Value::U16(_) => TypeTag::U16,
            Value::U32(_) => TypeTag::U32,
            Value::U64(_) => TypeTag::U64,
            Value::I8(_) => TypeTag::I8,
            Value::I16(_) => TypeTag::I16,
            Value::I32(_) => TypeTag::I32,
            Value::I64(_) => TypeTag::I64,
            Value::F32(_) => TypeTag::F32,
            Value::F64(_) => TypeTag::F64,
            Value::C64(_) => TypeTag::C64,
            Value::C128(_) => TypeTag::C128,
            Value::Str(_) => TypeTag::Str,
            Value::Record(_) => TypeTag::Record,
            Value::Seq(_) => TypeTag::Seq,
            Value::Map(_) => TypeTag::Map,
        }
    }

    /// Smallest signed variant whose range contains `v`.
    pub fn int(v: i64) -> Value {
        if v >= i8::MIN as i64 && v <= i8::MAX as i64 {
            Value::I8(v as i8)
        } else if v >= i16::MIN as i64 && v <= i16::MAX as i64 {
            Value::I16(v as i16)
        } else if v >= i32::MIN as i64 && v <= i32::MAX as i64 {
            Value::I32(v as i32)
        } else {
            Value::I64(v)
        }
    }

    /// Smallest unsigned variant whose range contains `v`.
    pub fn uint(v: u64) -> Value {
        if v <= u8::MAX as u64 {
            Value::U8(v as u8)
        } else if v <= u16::MAX as u64 {
            Value::U16(v as u16)
        } else if v <= u32::MAX as u64 {
            Value::U32(v as u32)
        } else {
            Value::U64(v)
        }
    }

    /// Common element tag of a homogeneous, non-empty sequence.
    ///
    /// `None` for empty sequences, sequences with mixed element types, and
    /// non-sequence values.
    pub fn element_tag(&self) -> Option<TypeTag> {
        match self {
            Value::Seq(items) => {
                let first = items.first()?.tag();
                items.iter().all(|v| v.tag() == first).then_some(first)
            }
            _ => None,
        }
    }
}

/// The stringified form, used as the ordering key for generic-map pairs.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::C64(c) if c.im < 0.0 => write!(f, "({}{}i)", c.re, c.im),
            Value::C64(c) => write!(f, "({}+{}i)", c.re, c.im),
            Value::C128(c) if c.im < 0.0 => write!(f, "({}{}i)", c.re, c.im),
            Value::C128(c) => write!(f, "({}+{}i)", c.re, c.im),
            Value::Str(s) => f.write_str(s),
            Value::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_from_primitive {
    ($($variant:ident: $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    Bool: bool,
    U8: u8,
    U16: u16,
    U32: u32,
    U64: u64,
    I8: i8,
    I16: i16,
    I32: i32,
    I64: i64,
    F32: f32,
    F64: f64,
    C64: Complex32,
    C128: Complex64,
    Str: String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Seq(v)
    }
}

/// Builds an argument tree from a JSON document.
///
/// Integers shrink to the smallest fitting variant, arrays become sequences,
/// objects become records. JSON `null` has no wire representation and is
/// rejected.
impl TryFrom<serde_json::Value> for Value {
    type Error = ProtocolError;

    fn try_from(v: serde_json::Value) -> Result<Self, Self::Error> {
        match v {
            serde_json::Value::Null => Err(ProtocolError::UnsupportedType("null")),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::uint(u))
                } else {
                    Ok(Value::F64(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => Ok(Value::Str(s)),
            serde_json::Value::Array(items) => Ok(Value::Seq(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            )),
            serde_json::Value::Object(fields) => Ok(Value::Record(
                fields
                    .into_iter()
                    .map(|(name, value)| Ok((name, Value::try_from(value)?)))
                    .collect::<Result<_, ProtocolError>>()?,
            )),
        }
    }
}

/// A single named, typed unit decoded from the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub value: Value,
    pub tag: TypeTag,
}
