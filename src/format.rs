//! Wire format table: classification of lead bytes.
//!
//! Every encoded value starts with a single tag byte. The tag selects a
//! [`FormatId`], which in turn fixes how many header bytes precede the
//! payload and how long the payload is.

use crate::error::{Error, Result};

/// Wire formats understood by the codec.
///
/// The discriminant is the tag byte for exact-match formats and the first
/// tag of the range for inline-length formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FormatId {
    /// 7-bit unsigned integer packed into the tag (0x00-0x7f).
    PositiveFixInt = 0x00,
    /// Map with up to 15 entries (0x80-0x8f).
    FixMap = 0x80,
    /// Array with up to 15 elements (0x90-0x9f).
    FixArray = 0x90,
    /// String of up to 31 bytes (0xa0-0xbf).
    FixStr = 0xa0,
    Nil = 0xc0,
    False = 0xc2,
    True = 0xc3,
    Float32 = 0xca,
    Float64 = 0xcb,
    UInt8 = 0xcc,
    UInt16 = 0xcd,
    UInt32 = 0xce,
    UInt64 = 0xcf,
    Int8 = 0xd0,
    Int16 = 0xd1,
    Int32 = 0xd2,
    Int64 = 0xd3,
    Str8 = 0xd9,
    Str16 = 0xda,
    Str32 = 0xdb,
    Array16 = 0xdc,
    Array32 = 0xdd,
    Map16 = 0xde,
    Map32 = 0xdf,
    /// 5-bit negative integer packed into the tag (0xe0-0xff).
    NegativeFixInt = 0xe0,
}

/// Coarse value shape of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Nil,
    Bool,
    UInt,
    Int,
    Float,
    Str,
    Array,
    Map,
}

/// How the payload length of a format is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadLen {
    /// No payload at all (nil, booleans).
    None,
    /// Fixed number of bytes.
    Fixed(usize),
    /// Length or count taken from the low bits of the tag.
    Inline,
    /// Length or count read from a big-endian prefix of the given width.
    Prefixed(usize),
}

/// Largest length an inline string can carry.
pub const FIXSTR_MAX: usize = 31;

/// Largest count an inline map or array can carry.
pub const FIXCONTAINER_MAX: usize = 15;

impl FormatId {
    /// Converts a tag byte to its format.
    ///
    /// Exact-match tags are tried first, then the inline ranges.
    pub fn from_tag(tag: u8) -> Option<Self> {
        let exact = match tag {
            0xc0 => Some(FormatId::Nil),
            0xc2 => Some(FormatId::False),
            0xc3 => Some(FormatId::True),
            0xca => Some(FormatId::Float32),
            0xcb => Some(FormatId::Float64),
            0xcc => Some(FormatId::UInt8),
            0xcd => Some(FormatId::UInt16),
            0xce => Some(FormatId::UInt32),
            0xcf => Some(FormatId::UInt64),
            0xd0 => Some(FormatId::Int8),
            0xd1 => Some(FormatId::Int16),
            0xd2 => Some(FormatId::Int32),
            0xd3 => Some(FormatId::Int64),
            0xd9 => Some(FormatId::Str8),
            0xda => Some(FormatId::Str16),
            0xdb => Some(FormatId::Str32),
            0xdc => Some(FormatId::Array16),
            0xdd => Some(FormatId::Array32),
            0xde => Some(FormatId::Map16),
            0xdf => Some(FormatId::Map32),
            _ => None,
        };
        if exact.is_some() {
            return exact;
        }

        match tag {
            0x00..=0x7f => Some(FormatId::PositiveFixInt),
            0x80..=0x8f => Some(FormatId::FixMap),
            0x90..=0x9f => Some(FormatId::FixArray),
            0xa0..=0xbf => Some(FormatId::FixStr),
            0xe0..=0xff => Some(FormatId::NegativeFixInt),
            _ => None,
        }
    }

    /// Classifies a tag read at `offset`, failing on unassigned tags.
    pub fn classify(tag: u8, offset: usize) -> Result<Self> {
        Self::from_tag(tag).ok_or(Error::UnknownFormat { tag, offset })
    }

    /// Returns the tag byte, or the first tag of an inline range.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Returns true if the length or value lives in the tag's low bits.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            FormatId::PositiveFixInt
                | FormatId::NegativeFixInt
                | FormatId::FixMap
                | FormatId::FixArray
                | FormatId::FixStr
        )
    }

    /// Returns the value shape of this format.
    pub fn shape(self) -> Shape {
        match self {
            FormatId::Nil => Shape::Nil,
            FormatId::False | FormatId::True => Shape::Bool,
            FormatId::PositiveFixInt
            | FormatId::UInt8
            | FormatId::UInt16
            | FormatId::UInt32
            | FormatId::UInt64 => Shape::UInt,
            FormatId::NegativeFixInt
            | FormatId::Int8
            | FormatId::Int16
            | FormatId::Int32
            | FormatId::Int64 => Shape::Int,
            FormatId::Float32 | FormatId::Float64 => Shape::Float,
            FormatId::FixStr | FormatId::Str8 | FormatId::Str16 | FormatId::Str32 => Shape::Str,
            FormatId::FixArray | FormatId::Array16 | FormatId::Array32 => Shape::Array,
            FormatId::FixMap | FormatId::Map16 | FormatId::Map32 => Shape::Map,
        }
    }

    /// Returns the width of the big-endian length prefix following the tag.
    pub fn prefix_len(self) -> usize {
        match self {
            FormatId::Str8 => 1,
            FormatId::Str16 | FormatId::Array16 | FormatId::Map16 => 2,
            FormatId::Str32 | FormatId::Array32 | FormatId::Map32 => 4,
            _ => 0,
        }
    }

    /// Returns the number of bytes from the start of a value to its payload.
    ///
    /// Inline integers carry their payload in the tag byte itself, so their
    /// header is empty.
    pub fn header_len(self) -> usize {
        match self {
            FormatId::PositiveFixInt | FormatId::NegativeFixInt => 0,
            other => 1 + other.prefix_len(),
        }
    }

    /// Returns the payload length rule.
    pub fn payload_len(self) -> PayloadLen {
        match self {
            FormatId::Nil | FormatId::False | FormatId::True => PayloadLen::None,
            FormatId::PositiveFixInt
            | FormatId::NegativeFixInt
            | FormatId::UInt8
            | FormatId::Int8 => PayloadLen::Fixed(1),
            FormatId::UInt16 | FormatId::Int16 => PayloadLen::Fixed(2),
            FormatId::UInt32 | FormatId::Int32 | FormatId::Float32 => PayloadLen::Fixed(4),
            FormatId::UInt64 | FormatId::Int64 | FormatId::Float64 => PayloadLen::Fixed(8),
            FormatId::FixMap | FormatId::FixArray | FormatId::FixStr => PayloadLen::Inline,
            other => PayloadLen::Prefixed(other.prefix_len()),
        }
    }

    /// Returns the fixed payload width, if the format has one.
    pub fn fixed_width(self) -> Option<usize> {
        match self.payload_len() {
            PayloadLen::Fixed(n) => Some(n),
            PayloadLen::None => Some(0),
            _ => None,
        }
    }

    /// Extracts the length or count packed into an inline-length tag.
    pub fn inline_len(self, tag: u8) -> usize {
        match self {
            FormatId::FixMap | FormatId::FixArray => (tag & 0x0f) as usize,
            FormatId::FixStr => (tag & 0x1f) as usize,
            _ => 0,
        }
    }

    /// Selects the smallest string format for `len` bytes.
    pub fn for_str_len(len: usize) -> Result<Self> {
        match len {
            0..=FIXSTR_MAX => Ok(FormatId::FixStr),
            32..=0xff => Ok(FormatId::Str8),
            0x100..=0xffff => Ok(FormatId::Str16),
            _ if len <= u32::MAX as usize => Ok(FormatId::Str32),
            _ => Err(Error::encoding(format!("string of {} bytes is too long", len))),
        }
    }

    /// Selects the smallest array format for `count` elements.
    pub fn for_array_len(count: usize) -> Result<Self> {
        match count {
            0..=FIXCONTAINER_MAX => Ok(FormatId::FixArray),
            16..=0xffff => Ok(FormatId::Array16),
            _ if count <= u32::MAX as usize => Ok(FormatId::Array32),
            _ => Err(Error::encoding(format!("array of {} elements is too long", count))),
        }
    }

    /// Selects the smallest map format for `count` entries.
    pub fn for_map_len(count: usize) -> Result<Self> {
        match count {
            0..=FIXCONTAINER_MAX => Ok(FormatId::FixMap),
            16..=0xffff => Ok(FormatId::Map16),
            _ if count <= u32::MAX as usize => Ok(FormatId::Map32),
            _ => Err(Error::encoding(format!("map of {} entries is too long", count))),
        }
    }
}
