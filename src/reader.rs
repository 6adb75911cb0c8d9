//! Cursor-based decoder for single values.

use byteorder::{BigEndian, ByteOrder};

use crate::decode::{Decode, RawValue};
use crate::error::{Error, Result};
use crate::format::{FormatId, PayloadLen, Shape};
use crate::slice::Slice;
use crate::value::{NegativeFixInt, PositiveFixInt, Value};

/// Default limit on container nesting for recursive decoding.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Reader decodes values from a buffer, one at a time.
///
/// Positions are absolute offsets into the backing buffer of the slice the
/// reader was created from.
pub struct Reader<'a> {
    slice: Slice<'a>,
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self::from_slice(Slice::new(data))
    }

    /// Creates a reader positioned at the start of a view.
    pub fn from_slice(slice: Slice<'a>) -> Self {
        Self {
            slice,
            pos: slice.start(),
        }
    }

    /// Returns the current position in the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to an absolute position inside the view.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        self.slice.check(pos, 0)?;
        self.pos = pos;
        Ok(())
    }

    /// Returns the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.slice.end().saturating_sub(self.pos)
    }

    /// Returns true if there is more data to read.
    pub fn has_more(&self) -> bool {
        self.pos < self.slice.end()
    }

    /// Returns the view this reader walks.
    pub fn slice(&self) -> Slice<'a> {
        self.slice
    }

    /// Reads a raw byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let value = self.slice.byte(self.pos)?;
        self.pos += 1;
        Ok(value)
    }

    /// Reads raw bytes without copying.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let bytes = self.slice.bytes(self.pos, length)?;
        self.pos += length;
        Ok(bytes)
    }

    /// Advances the cursor by `length` bytes.
    pub fn skip(&mut self, length: usize) -> Result<()> {
        self.slice.check(self.pos, length)?;
        self.pos += length;
        Ok(())
    }

    /// Returns the format of the next value without consuming it.
    pub fn peek_format(&self) -> Result<FormatId> {
        let tag = self.slice.byte(self.pos)?;
        FormatId::classify(tag, self.pos)
    }

    /// Returns true if the next value is nil, without consuming it.
    pub fn peek_nil(&self) -> Result<bool> {
        Ok(self.slice.byte(self.pos)? == FormatId::Nil.tag())
    }

    /// Reads and classifies a tag byte.
    pub fn read_format(&mut self) -> Result<(FormatId, u8)> {
        let offset = self.pos;
        let tag = self.read_byte()?;
        Ok((FormatId::classify(tag, offset)?, tag))
    }

    /// Reads the length or count belonging to a tag that was just read.
    pub fn read_len(&mut self, format: FormatId, tag: u8) -> Result<usize> {
        match format.payload_len() {
            PayloadLen::Inline => Ok(format.inline_len(tag)),
            PayloadLen::Prefixed(1) => Ok(self.read_byte()? as usize),
            PayloadLen::Prefixed(2) => Ok(BigEndian::read_u16(self.read_bytes(2)?) as usize),
            PayloadLen::Prefixed(_) => Ok(BigEndian::read_u32(self.read_bytes(4)?) as usize),
            PayloadLen::Fixed(n) => Ok(n),
            PayloadLen::None => Ok(0),
        }
    }

    /// Reads a map header and returns its entry count.
    pub fn read_map_len(&mut self) -> Result<usize> {
        self.read_container_len(Shape::Map, "map")
    }

    /// Reads an array header and returns its element count.
    pub fn read_array_len(&mut self) -> Result<usize> {
        self.read_container_len(Shape::Array, "array")
    }

    fn read_container_len(&mut self, shape: Shape, expected: &'static str) -> Result<usize> {
        let start = self.pos;
        let (format, tag) = self.read_format()?;
        if format.shape() != shape {
            self.pos = start;
            return Err(Error::type_mismatch(expected, format));
        }
        self.read_len(format, tag)
    }

    /// Locates the next scalar or string value and returns it with the
    /// position just past it. The cursor is not moved.
    fn raw_at(&self, expected: &'static str) -> Result<(RawValue<'a>, usize)> {
        let mut probe = Reader {
            slice: self.slice,
            pos: self.pos,
        };
        let start = probe.pos;
        let (format, tag) = probe.read_format()?;
        let payload = match format.shape() {
            Shape::Array | Shape::Map => return Err(Error::type_mismatch(expected, format)),
            Shape::Str => {
                let len = probe.read_len(format, tag)?;
                probe.read_bytes(len)?
            }
            _ if format.header_len() == 0 => self.slice.bytes(start, 1)?,
            _ => {
                let width = format.fixed_width().unwrap_or(0);
                probe.read_bytes(width)?
            }
        };
        Ok((RawValue::new(format, payload)?, probe.pos))
    }

    /// Reads one value as `T`.
    ///
    /// The cursor only advances if decoding succeeds.
    pub fn read<T: Decode<'a>>(&mut self) -> Result<T> {
        let (raw, next) = self.raw_at(T::EXPECTED)?;
        let value = T::decode(raw)?;
        self.pos = next;
        Ok(value)
    }

    /// Reads a string without copying.
    pub fn read_str(&mut self) -> Result<&'a str> {
        self.read()
    }

    /// Skips one complete value, including nested containers.
    pub fn skip_value(&mut self) -> Result<()> {
        let mut pending: usize = 1;
        while pending > 0 {
            pending -= 1;
            let (format, tag) = self.read_format()?;
            match format.shape() {
                Shape::Map => {
                    let count = self.read_len(format, tag)?;
                    pending = count
                        .checked_mul(2)
                        .and_then(|n| n.checked_add(pending))
                        .ok_or_else(|| Error::buffer_underflow(count, self.remaining()))?;
                }
                Shape::Array => {
                    let count = self.read_len(format, tag)?;
                    pending = pending
                        .checked_add(count)
                        .ok_or_else(|| Error::buffer_underflow(count, self.remaining()))?;
                }
                Shape::Str => {
                    let len = self.read_len(format, tag)?;
                    self.skip(len)?;
                }
                _ if format.header_len() == 0 => {}
                _ => self.skip(format.fixed_width().unwrap_or(0))?,
            }
        }
        Ok(())
    }

    /// Eagerly decodes the next value into a [`Value`] tree.
    pub fn read_value(&mut self) -> Result<Value> {
        self.read_value_depth(0, DEFAULT_MAX_DEPTH)
    }

    fn read_value_depth(&mut self, depth: usize, max_depth: usize) -> Result<Value> {
        let format = self.peek_format()?;
        let value = match format {
            FormatId::FixArray | FormatId::Array16 | FormatId::Array32 => {
                if depth >= max_depth {
                    return Err(Error::DepthLimitExceeded { limit: max_depth });
                }
                let count = self.read_array_len()?;
                let mut items = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    items.push(self.read_value_depth(depth + 1, max_depth)?);
                }
                Value::Array(items)
            }
            FormatId::FixMap | FormatId::Map16 | FormatId::Map32 => {
                if depth >= max_depth {
                    return Err(Error::DepthLimitExceeded { limit: max_depth });
                }
                let count = self.read_map_len()?;
                let mut pairs = Vec::with_capacity(count.min(self.remaining() / 2));
                for _ in 0..count {
                    let key = self.read_value_depth(depth + 1, max_depth)?;
                    let value = self.read_value_depth(depth + 1, max_depth)?;
                    pairs.push((key, value));
                }
                Value::Map(pairs)
            }
            FormatId::Nil => {
                self.skip(1)?;
                Value::Nil
            }
            FormatId::False | FormatId::True => Value::Bool(self.read()?),
            FormatId::PositiveFixInt => Value::UInt7(self.read::<PositiveFixInt>()?.0),
            FormatId::NegativeFixInt => Value::Int5(self.read::<NegativeFixInt>()?.0),
            FormatId::UInt8 => Value::UInt8(self.read()?),
            FormatId::UInt16 => Value::UInt16(self.read()?),
            FormatId::UInt32 => Value::UInt32(self.read()?),
            FormatId::UInt64 => Value::UInt64(self.read()?),
            FormatId::Int8 => Value::Int8(self.read()?),
            FormatId::Int16 => Value::Int16(self.read()?),
            FormatId::Int32 => Value::Int32(self.read()?),
            FormatId::Int64 => Value::Int64(self.read()?),
            FormatId::Float32 => Value::Float32(self.read()?),
            FormatId::Float64 => Value::Float64(self.read()?),
            FormatId::FixStr | FormatId::Str8 | FormatId::Str16 | FormatId::Str32 => {
                Value::Str(self.read::<String>()?)
            }
        };
        Ok(value)
    }

    /// Creates a sub-reader over the next `length` bytes and skips them.
    pub fn sub_reader(&mut self, length: usize) -> Result<Reader<'a>> {
        let sub = self.slice.sub(self.pos, length)?;
        self.pos += length;
        Ok(Reader::from_slice(sub))
    }
}
