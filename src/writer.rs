//! Wire writer.

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::format::FormatId;
use crate::value::Value;

/// Default initial capacity of the output buffer.
pub const INITIAL_CAPACITY: usize = 256;

/// Writer serializes values into a growable byte buffer.
///
/// Every multi-byte field is written big-endian.
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    /// Creates a new writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates a new writer with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Returns the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the encoded bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Resets the writer for reuse.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Writes a raw byte.
    pub fn write_byte(&mut self, value: u8) -> Result<()> {
        self.buffer.push(value);
        Ok(())
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Writes nil.
    pub fn write_nil(&mut self) -> Result<()> {
        self.write_byte(FormatId::Nil.tag())
    }

    /// Writes a boolean.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        let format = if value { FormatId::True } else { FormatId::False };
        self.write_byte(format.tag())
    }

    /// Writes an integer in `0..=127` as a single tag byte.
    pub fn write_positive_fixint(&mut self, value: u8) -> Result<()> {
        if value > 0x7f {
            return Err(Error::encoding(format!(
                "{} does not fit a positive fixint",
                value
            )));
        }
        self.write_byte(value)
    }

    /// Writes an integer in `-32..=-1` as a single tag byte.
    pub fn write_negative_fixint(&mut self, value: i8) -> Result<()> {
        if !(-32..=-1).contains(&value) {
            return Err(Error::encoding(format!(
                "{} does not fit a negative fixint",
                value
            )));
        }
        self.write_byte(value as u8)
    }

    /// Writes an 8-bit unsigned integer.
    pub fn write_uint8(&mut self, value: u8) -> Result<()> {
        self.buffer.push(FormatId::UInt8.tag());
        self.buffer.push(value);
        Ok(())
    }

    /// Writes a 16-bit unsigned integer.
    pub fn write_uint16(&mut self, value: u16) -> Result<()> {
        self.buffer.push(FormatId::UInt16.tag());
        self.buffer.write_u16::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a 32-bit unsigned integer.
    pub fn write_uint32(&mut self, value: u32) -> Result<()> {
        self.buffer.push(FormatId::UInt32.tag());
        self.buffer.write_u32::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a 64-bit unsigned integer.
    pub fn write_uint64(&mut self, value: u64) -> Result<()> {
        self.buffer.push(FormatId::UInt64.tag());
        self.buffer.write_u64::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes an 8-bit signed integer.
    pub fn write_int8(&mut self, value: i8) -> Result<()> {
        self.buffer.push(FormatId::Int8.tag());
        self.buffer.write_i8(value)?;
        Ok(())
    }

    /// Writes a 16-bit signed integer.
    pub fn write_int16(&mut self, value: i16) -> Result<()> {
        self.buffer.push(FormatId::Int16.tag());
        self.buffer.write_i16::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a 32-bit signed integer.
    pub fn write_int32(&mut self, value: i32) -> Result<()> {
        self.buffer.push(FormatId::Int32.tag());
        self.buffer.write_i32::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a 64-bit signed integer.
    pub fn write_int64(&mut self, value: i64) -> Result<()> {
        self.buffer.push(FormatId::Int64.tag());
        self.buffer.write_i64::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a 32-bit float as its big-endian bit pattern.
    pub fn write_float32(&mut self, value: f32) -> Result<()> {
        self.buffer.push(FormatId::Float32.tag());
        self.buffer.write_f32::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a 64-bit float as its big-endian bit pattern.
    pub fn write_float64(&mut self, value: f64) -> Result<()> {
        self.buffer.push(FormatId::Float64.tag());
        self.buffer.write_f64::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes the header of a string of `len` bytes.
    pub fn write_str_header(&mut self, len: usize) -> Result<()> {
        self.write_len_header(FormatId::for_str_len(len)?, len)
    }

    /// Writes the header of an array of `count` elements.
    pub fn write_array_header(&mut self, count: usize) -> Result<()> {
        self.write_len_header(FormatId::for_array_len(count)?, count)
    }

    /// Writes the header of a map of `count` entries.
    pub fn write_map_header(&mut self, count: usize) -> Result<()> {
        self.write_len_header(FormatId::for_map_len(count)?, count)
    }

    /// Writes a string using the smallest string format that fits.
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_str_header(value.len())?;
        self.buffer.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Writes a value tree.
    ///
    /// Either the whole tree is appended or, on error, the buffer is left as
    /// it was before the call.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        let mark = self.buffer.len();
        let written = self.write_tree(value);
        if written.is_err() {
            self.buffer.truncate(mark);
        }
        written
    }

    fn write_tree(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Nil => self.write_nil(),
            Value::Bool(b) => self.write_bool(*b),
            Value::UInt7(v) => self.write_positive_fixint(*v),
            Value::UInt8(v) => self.write_uint8(*v),
            Value::UInt16(v) => self.write_uint16(*v),
            Value::UInt32(v) => self.write_uint32(*v),
            Value::UInt64(v) => self.write_uint64(*v),
            Value::Int5(v) => self.write_negative_fixint(*v),
            Value::Int8(v) => self.write_int8(*v),
            Value::Int16(v) => self.write_int16(*v),
            Value::Int32(v) => self.write_int32(*v),
            Value::Int64(v) => self.write_int64(*v),
            Value::Float32(v) => self.write_float32(*v),
            Value::Float64(v) => self.write_float64(*v),
            Value::Str(s) => self.write_str(s),
            Value::Array(items) => {
                self.write_array_header(items.len())?;
                for item in items {
                    self.write_tree(item)?;
                }
                Ok(())
            }
            Value::Map(pairs) => {
                self.write_map_header(pairs.len())?;
                for (key, value) in pairs {
                    self.write_tree(key)?;
                    self.write_tree(value)?;
                }
                Ok(())
            }
        }
    }

    fn write_len_header(&mut self, format: FormatId, len: usize) -> Result<()> {
        match format.prefix_len() {
            0 => self.buffer.push(format.tag() | len as u8),
            1 => {
                self.buffer.push(format.tag());
                self.buffer.push(len as u8);
            }
            2 => {
                self.buffer.push(format.tag());
                self.buffer.write_u16::<BigEndian>(len as u16)?;
            }
            _ => {
                self.buffer.push(format.tag());
                self.buffer.write_u32::<BigEndian>(len as u32)?;
            }
        }
        Ok(())
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
