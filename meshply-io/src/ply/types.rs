//! PLY scalar types
//!
//! Every PLY property value is one of eight primitive types. Each type knows
//! how to parse itself from an ASCII token (with range checking) and how to
//! decode itself from a fixed-width binary field in either byte order.

use byteorder::ByteOrder;
use meshply_core::{Error, Result};
use std::fmt;

/// A decoded property value, wide enough to hold any PLY scalar without loss
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Value as a 64-bit integer; floating values are truncated toward zero
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(v) => v,
            Number::Float(v) => v as i64,
        }
    }

    /// Value as a 32-bit integer, with the same narrowing as an `as` cast
    pub fn as_i32(self) -> i32 {
        match self {
            Number::Int(v) => v as i32,
            Number::Float(v) => v as i32,
        }
    }

    /// Value as a 64-bit float; integers beyond 2^53 may round
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

/// A Rust primitive that stores one PLY scalar type
pub(crate) trait PlyScalar: Copy {
    /// Width of the binary encoding in bytes
    const WIDTH: usize;

    /// Parse an ASCII token; `None` if it is malformed or out of range
    fn parse_token(token: &str) -> Option<Self>;

    /// Decode from the first `WIDTH` bytes of `bytes`
    fn decode<B: ByteOrder>(bytes: &[u8]) -> Self;

    fn into_number(self) -> Number;
}

// ASCII `char` and `short` are symmetric: -128 and -32768 are out of range.
// Binary decoding keeps the full two's complement range.
impl PlyScalar for i8 {
    const WIDTH: usize = 1;

    fn parse_token(token: &str) -> Option<Self> {
        token.parse::<i8>().ok().filter(|v| *v != i8::MIN)
    }

    fn decode<B: ByteOrder>(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    fn into_number(self) -> Number {
        Number::Int(self.into())
    }
}

impl PlyScalar for i16 {
    const WIDTH: usize = 2;

    fn parse_token(token: &str) -> Option<Self> {
        token.parse::<i16>().ok().filter(|v| *v != i16::MIN)
    }

    fn decode<B: ByteOrder>(bytes: &[u8]) -> Self {
        B::read_i16(bytes)
    }

    fn into_number(self) -> Number {
        Number::Int(self.into())
    }
}

impl PlyScalar for u8 {
    const WIDTH: usize = 1;

    fn parse_token(token: &str) -> Option<Self> {
        token.parse().ok()
    }

    fn decode<B: ByteOrder>(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn into_number(self) -> Number {
        Number::Int(self.into())
    }
}

macro_rules! impl_ply_scalar {
    ($ty:ty, $read:ident, $variant:ident) => {
        impl PlyScalar for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            fn parse_token(token: &str) -> Option<Self> {
                token.parse().ok()
            }

            fn decode<B: ByteOrder>(bytes: &[u8]) -> Self {
                B::$read(bytes)
            }

            fn into_number(self) -> Number {
                Number::$variant(self.into())
            }
        }
    };
}

impl_ply_scalar!(u16, read_u16, Int);
impl_ply_scalar!(i32, read_i32, Int);
impl_ply_scalar!(u32, read_u32, Int);
impl_ply_scalar!(f32, read_f32, Float);
impl_ply_scalar!(f64, read_f64, Float);

/// The eight PLY 1.0 scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

/// Width in bytes of the widest scalar type
pub(crate) const MAX_SCALAR_WIDTH: usize = 8;

impl ScalarType {
    /// Look up a type by its header keyword.
    ///
    /// Besides the PLY 1.0 names, the sized spellings (`uint8`, `float32`, ...)
    /// written by many scanners are accepted.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "char" | "int8" => Some(ScalarType::Char),
            "uchar" | "uint8" => Some(ScalarType::UChar),
            "short" | "int16" => Some(ScalarType::Short),
            "ushort" | "uint16" => Some(ScalarType::UShort),
            "int" | "int32" => Some(ScalarType::Int),
            "uint" | "uint32" => Some(ScalarType::UInt),
            "float" | "float32" => Some(ScalarType::Float),
            "double" | "float64" => Some(ScalarType::Double),
            _ => None,
        }
    }

    /// The PLY 1.0 header keyword
    pub fn keyword(self) -> &'static str {
        match self {
            ScalarType::Char => "char",
            ScalarType::UChar => "uchar",
            ScalarType::Short => "short",
            ScalarType::UShort => "ushort",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        }
    }

    /// Width of the binary encoding in bytes
    pub fn width(self) -> usize {
        match self {
            ScalarType::Char => i8::WIDTH,
            ScalarType::UChar => u8::WIDTH,
            ScalarType::Short => i16::WIDTH,
            ScalarType::UShort => u16::WIDTH,
            ScalarType::Int => i32::WIDTH,
            ScalarType::UInt => u32::WIDTH,
            ScalarType::Float => f32::WIDTH,
            ScalarType::Double => f64::WIDTH,
        }
    }

    /// `false` for `float` and `double`
    pub fn is_integral(self) -> bool {
        !matches!(self, ScalarType::Float | ScalarType::Double)
    }

    /// Parse one ASCII token as a value of this type
    pub fn parse_ascii(self, token: &str) -> Result<Number> {
        let value = match self {
            ScalarType::Char => parse_as::<i8>(token),
            ScalarType::UChar => parse_as::<u8>(token),
            ScalarType::Short => parse_as::<i16>(token),
            ScalarType::UShort => parse_as::<u16>(token),
            ScalarType::Int => parse_as::<i32>(token),
            ScalarType::UInt => parse_as::<u32>(token),
            ScalarType::Float => parse_as::<f32>(token),
            ScalarType::Double => parse_as::<f64>(token),
        };
        value.ok_or_else(|| Error::format(format!("Cannot parse '{}' as {}", token, self)))
    }

    /// Decode a binary field of this type.
    ///
    /// `bytes` must hold at least [`ScalarType::width`] bytes; only that many are used.
    pub fn decode<B: ByteOrder>(self, bytes: &[u8]) -> Number {
        debug_assert!(bytes.len() >= self.width());
        match self {
            ScalarType::Char => i8::decode::<B>(bytes).into_number(),
            ScalarType::UChar => u8::decode::<B>(bytes).into_number(),
            ScalarType::Short => i16::decode::<B>(bytes).into_number(),
            ScalarType::UShort => u16::decode::<B>(bytes).into_number(),
            ScalarType::Int => i32::decode::<B>(bytes).into_number(),
            ScalarType::UInt => u32::decode::<B>(bytes).into_number(),
            ScalarType::Float => f32::decode::<B>(bytes).into_number(),
            ScalarType::Double => f64::decode::<B>(bytes).into_number(),
        }
    }
}

fn parse_as<T: PlyScalar>(token: &str) -> Option<Number> {
    T::parse_token(token).map(PlyScalar::into_number)
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
