//! In-memory value tree.

use crate::error::{Error, Result};
use crate::format::FormatId;

/// A value that can be written to, or eagerly read from, the wire.
///
/// Integer variants keep the width they were built with; the writer never
/// compacts them. `UInt7` and `Int5` are the inline forms and must stay in
/// `0..=127` and `-32..=-1` respectively.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    UInt7(u8),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Int5(i8),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Str(String),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Returns the format this value is written with.
    pub fn format(&self) -> Result<FormatId> {
        let format = match self {
            Value::Nil => FormatId::Nil,
            Value::Bool(false) => FormatId::False,
            Value::Bool(true) => FormatId::True,
            Value::UInt7(_) => FormatId::PositiveFixInt,
            Value::UInt8(_) => FormatId::UInt8,
            Value::UInt16(_) => FormatId::UInt16,
            Value::UInt32(_) => FormatId::UInt32,
            Value::UInt64(_) => FormatId::UInt64,
            Value::Int5(_) => FormatId::NegativeFixInt,
            Value::Int8(_) => FormatId::Int8,
            Value::Int16(_) => FormatId::Int16,
            Value::Int32(_) => FormatId::Int32,
            Value::Int64(_) => FormatId::Int64,
            Value::Float32(_) => FormatId::Float32,
            Value::Float64(_) => FormatId::Float64,
            Value::Str(s) => FormatId::for_str_len(s.len())?,
            Value::Array(items) => FormatId::for_array_len(items.len())?,
            Value::Map(pairs) => FormatId::for_map_len(pairs.len())?,
        };
        Ok(format)
    }

    /// Checks the inline-integer ranges of this value and its children.
    pub fn validate(&self) -> Result<()> {
        match self {
            Value::UInt7(v) if *v > 0x7f => Err(Error::encoding(format!(
                "{} does not fit a positive fixint",
                v
            ))),
            Value::Int5(v) if !(-32..=-1).contains(v) => Err(Error::encoding(format!(
                "{} does not fit a negative fixint",
                v
            ))),
            Value::Array(items) => items.iter().try_for_each(Value::validate),
            Value::Map(pairs) => pairs.iter().try_for_each(|(k, v)| {
                k.validate()?;
                v.validate()
            }),
            _ => Ok(()),
        }
    }

    /// Returns true for `Value::Nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the string content of a `Str` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a string key in a `Map` value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs
                .iter()
                .rev()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => Str,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

/// An integer in `0..=127` carried in the tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveFixInt(pub u8);

/// An integer in `-32..=-1` carried in the tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeFixInt(pub i8);

impl From<PositiveFixInt> for Value {
    fn from(value: PositiveFixInt) -> Self {
        Value::UInt7(value.0)
    }
}

impl From<NegativeFixInt> for Value {
    fn from(value: NegativeFixInt) -> Self {
        Value::Int5(value.0)
    }
}
