//! Encoding builder: from host values to a value tree to bytes.
//!
//! Host types implement [`Encode`] and describe themselves through a
//! [`ValueEncoder`]. Containers are described by callbacks: a map callback
//! receives a [`MapEncoder`] and supplies ordered `(name, value)` pairs, a
//! sequence callback receives a [`SeqEncoder`]. Each element is built into
//! a [`Value`] before its parent is assembled.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::value::{NegativeFixInt, PositiveFixInt, Value};
use crate::writer::{Writer, INITIAL_CAPACITY};

/// Types that can describe themselves to the encoder.
pub trait Encode {
    /// Stores exactly one value (scalar or container) into `encoder`.
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()>;
}

/// Slot that receives exactly one value.
#[derive(Debug, Default)]
pub struct ValueEncoder {
    storage: Option<Value>,
}

impl ValueEncoder {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self { storage: None }
    }

    /// Stores a prepared value after checking its inline-integer ranges.
    pub fn encode_value(&mut self, value: Value) -> Result<()> {
        value.validate()?;
        self.store(value)
    }

    // Container children were validated in their own slots.
    fn store(&mut self, value: Value) -> Result<()> {
        if self.storage.is_some() {
            return Err(Error::encoding("a value was already encoded in this slot"));
        }
        self.storage = Some(value);
        Ok(())
    }

    /// Stores nil.
    pub fn encode_nil(&mut self) -> Result<()> {
        self.encode_value(Value::Nil)
    }

    /// Stores a boolean.
    pub fn encode_bool(&mut self, value: bool) -> Result<()> {
        self.encode_value(Value::Bool(value))
    }

    /// Stores an 8-bit unsigned integer.
    pub fn encode_u8(&mut self, value: u8) -> Result<()> {
        self.encode_value(Value::UInt8(value))
    }

    /// Stores a 16-bit unsigned integer.
    pub fn encode_u16(&mut self, value: u16) -> Result<()> {
        self.encode_value(Value::UInt16(value))
    }

    /// Stores a 32-bit unsigned integer.
    pub fn encode_u32(&mut self, value: u32) -> Result<()> {
        self.encode_value(Value::UInt32(value))
    }

    /// Stores a 64-bit unsigned integer.
    pub fn encode_u64(&mut self, value: u64) -> Result<()> {
        self.encode_value(Value::UInt64(value))
    }

    /// Stores an 8-bit signed integer.
    pub fn encode_i8(&mut self, value: i8) -> Result<()> {
        self.encode_value(Value::Int8(value))
    }

    /// Stores a 16-bit signed integer.
    pub fn encode_i16(&mut self, value: i16) -> Result<()> {
        self.encode_value(Value::Int16(value))
    }

    /// Stores a 32-bit signed integer.
    pub fn encode_i32(&mut self, value: i32) -> Result<()> {
        self.encode_value(Value::Int32(value))
    }

    /// Stores a 64-bit signed integer.
    pub fn encode_i64(&mut self, value: i64) -> Result<()> {
        self.encode_value(Value::Int64(value))
    }

    /// Stores a platform-width unsigned integer at the pointer width.
    pub fn encode_usize(&mut self, value: usize) -> Result<()> {
        #[cfg(target_pointer_width = "64")]
        let value = Value::UInt64(value as u64);
        #[cfg(not(target_pointer_width = "64"))]
        let value = Value::UInt32(value as u32);
        self.encode_value(value)
    }

    /// Stores a platform-width signed integer at the pointer width.
    pub fn encode_isize(&mut self, value: isize) -> Result<()> {
        #[cfg(target_pointer_width = "64")]
        let value = Value::Int64(value as i64);
        #[cfg(not(target_pointer_width = "64"))]
        let value = Value::Int32(value as i32);
        self.encode_value(value)
    }

    /// Stores a 32-bit float.
    pub fn encode_f32(&mut self, value: f32) -> Result<()> {
        self.encode_value(Value::Float32(value))
    }

    /// Stores a 64-bit float.
    pub fn encode_f64(&mut self, value: f64) -> Result<()> {
        self.encode_value(Value::Float64(value))
    }

    /// Stores an integer in `0..=127` in its single-byte form.
    pub fn encode_positive_fixint(&mut self, value: u8) -> Result<()> {
        self.encode_value(Value::UInt7(value))
    }

    /// Stores an integer in `-32..=-1` in its single-byte form.
    pub fn encode_negative_fixint(&mut self, value: i8) -> Result<()> {
        self.encode_value(Value::Int5(value))
    }

    /// Stores a string.
    pub fn encode_str(&mut self, value: &str) -> Result<()> {
        self.encode_value(Value::Str(value.to_owned()))
    }

    /// Stores a string given as raw bytes, which must be valid UTF-8.
    pub fn encode_utf8(&mut self, bytes: &[u8]) -> Result<()> {
        let value = std::str::from_utf8(bytes)
            .map_err(|e| Error::encoding(format!("string is not valid UTF-8: {}", e)))?;
        self.encode_str(value)
    }

    /// Stores a map whose entries are supplied by `build`.
    pub fn map<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(&mut MapEncoder) -> Result<()>,
    {
        let mut map = MapEncoder::new();
        build(&mut map)?;
        self.store(Value::Map(map.pairs))
    }

    /// Stores an array whose elements are supplied by `build`.
    pub fn seq<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(&mut SeqEncoder) -> Result<()>,
    {
        let mut seq = SeqEncoder::new();
        build(&mut seq)?;
        self.store(Value::Array(seq.items))
    }

    /// Returns true once a value has been stored.
    pub fn has_value(&self) -> bool {
        self.storage.is_some()
    }

    /// Takes the stored value.
    pub fn into_value(self) -> Result<Value> {
        self.storage.ok_or(Error::ContainerNotRequested)
    }
}

/// Collects the ordered entries of a map.
#[derive(Debug, Default)]
pub struct MapEncoder {
    pairs: Vec<(Value, Value)>,
}

impl MapEncoder {
    fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Appends a field.
    pub fn field<T: Encode + ?Sized>(&mut self, name: &str, value: &T) -> Result<&mut Self> {
        self.field_with(name, |encoder| value.encode(encoder))
    }

    /// Appends a field whose value is produced by a callback.
    pub fn field_with<F>(&mut self, name: &str, produce: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut ValueEncoder) -> Result<()>,
    {
        let mut encoder = ValueEncoder::new();
        produce(&mut encoder)?;
        self.pairs
            .push((Value::Str(name.to_owned()), encoder.into_value()?));
        Ok(self)
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no entry was added.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Collects the ordered elements of an array.
#[derive(Debug, Default)]
pub struct SeqEncoder {
    items: Vec<Value>,
}

impl SeqEncoder {
    fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends an element.
    pub fn element<T: Encode + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        self.element_with(|encoder| value.encode(encoder))
    }

    /// Appends an element produced by a callback.
    pub fn element_with<F>(&mut self, produce: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut ValueEncoder) -> Result<()>,
    {
        let mut encoder = ValueEncoder::new();
        produce(&mut encoder)?;
        self.items.push(encoder.into_value()?);
        Ok(self)
    }

    /// Number of elements added so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no element was added.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Builds the value tree for `value`.
pub fn to_value<T: Encode + ?Sized>(value: &T) -> Result<Value> {
    let mut encoder = ValueEncoder::new();
    value.encode(&mut encoder)?;
    encoder.into_value()
}

/// Encode session owning an output buffer.
pub struct Encoder {
    writer: Writer,
}

impl Encoder {
    /// Creates an encoder with the default buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates an encoder with the given buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            writer: Writer::with_capacity(capacity),
        }
    }

    /// Encodes `value`, replacing any previous output.
    ///
    /// On failure the output is left empty.
    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T) -> Result<&[u8]> {
        self.writer.reset();
        let written = to_value(value).and_then(|tree| self.writer.write_value(&tree));
        if let Err(err) = written {
            self.writer.reset();
            return Err(err);
        }
        Ok(self.writer.as_bytes())
    }

    /// Consumes the encoder and returns the last output.
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! impl_encode {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl Encode for $ty {
                fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
                    encoder.$method(*self)
                }
            }
        )*
    };
}

impl_encode! {
    bool => encode_bool,
    u8 => encode_u8,
    u16 => encode_u16,
    u32 => encode_u32,
    u64 => encode_u64,
    usize => encode_usize,
    i8 => encode_i8,
    i16 => encode_i16,
    i32 => encode_i32,
    i64 => encode_i64,
    isize => encode_isize,
    f32 => encode_f32,
    f64 => encode_f64,
}

impl Encode for PositiveFixInt {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        encoder.encode_positive_fixint(self.0)
    }
}

impl Encode for NegativeFixInt {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        encoder.encode_negative_fixint(self.0)
    }
}

impl Encode for str {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        encoder.encode_str(self)
    }
}

impl Encode for String {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        encoder.encode_str(self)
    }
}

impl Encode for Value {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        encoder.encode_value(self.clone())
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        (**self).encode(encoder)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        match self {
            Some(value) => value.encode(encoder),
            None => encoder.encode_nil(),
        }
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        encoder.seq(|seq| {
            for item in self {
                seq.element(item)?;
            }
            Ok(())
        })
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        self.as_slice().encode(encoder)
    }
}

impl<K: AsRef<str>, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        encoder.map(|map| {
            for (name, value) in self {
                map.field(name.as_ref(), value)?;
            }
            Ok(())
        })
    }
}
