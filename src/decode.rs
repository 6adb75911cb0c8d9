//! Typed decoding of single classified values.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};
use crate::format::{FormatId, Shape};
use crate::value::{NegativeFixInt, PositiveFixInt};

/// A classified value whose payload has been located but not decoded.
///
/// The payload is empty for nil and booleans, the tag byte itself for
/// inline integers, the fixed-width number bytes for other numerics and
/// the content bytes for strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawValue<'a> {
    format: FormatId,
    payload: &'a [u8],
}

impl<'a> RawValue<'a> {
    /// Creates a raw value, checking fixed-width payload sizes.
    pub fn new(format: FormatId, payload: &'a [u8]) -> Result<Self> {
        if let Some(width) = format.fixed_width() {
            if payload.len() != width {
                return Err(Error::buffer_underflow(width, payload.len()));
            }
        }
        Ok(Self { format, payload })
    }

    /// Returns the format of the value.
    pub fn format(&self) -> FormatId {
        self.format
    }

    /// Returns the payload bytes.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    fn expect(&self, expected: &'static str, format: FormatId) -> Result<&'a [u8]> {
        if self.format != format {
            return Err(Error::type_mismatch(expected, self.format));
        }
        Ok(self.payload)
    }
}

/// Types that can be decoded from a single wire value.
///
/// Decoding only succeeds when the stored format is exactly the one the
/// target type maps to; values are never widened or narrowed.
pub trait Decode<'a>: Sized {
    /// Name used in type mismatch errors.
    const EXPECTED: &'static str;

    /// Decodes the value.
    fn decode(raw: RawValue<'a>) -> Result<Self>;
}

macro_rules! impl_decode_number {
    ($($ty:ty => $format:ident, $name:literal, $read:expr;)*) => {
        $(
            impl<'a> Decode<'a> for $ty {
                const EXPECTED: &'static str = $name;

                fn decode(raw: RawValue<'a>) -> Result<Self> {
                    let payload = raw.expect(Self::EXPECTED, FormatId::$format)?;
                    Ok($read(payload))
                }
            }
        )*
    };
}

impl_decode_number! {
    u8 => UInt8, "u8", |p: &[u8]| p[0];
    u16 => UInt16, "u16", BigEndian::read_u16;
    u32 => UInt32, "u32", BigEndian::read_u32;
    u64 => UInt64, "u64", BigEndian::read_u64;
    i8 => Int8, "i8", |p: &[u8]| p[0] as i8;
    i16 => Int16, "i16", BigEndian::read_i16;
    i32 => Int32, "i32", BigEndian::read_i32;
    i64 => Int64, "i64", BigEndian::read_i64;
    f32 => Float32, "f32", BigEndian::read_f32;
    f64 => Float64, "f64", BigEndian::read_f64;
    PositiveFixInt => PositiveFixInt, "positive fixint", |p: &[u8]| PositiveFixInt(p[0]);
    NegativeFixInt => NegativeFixInt, "negative fixint", |p: &[u8]| NegativeFixInt(p[0] as i8);
}

impl<'a> Decode<'a> for usize {
    const EXPECTED: &'static str = "usize";

    #[cfg(target_pointer_width = "64")]
    fn decode(raw: RawValue<'a>) -> Result<Self> {
        let payload = raw.expect(Self::EXPECTED, FormatId::UInt64)?;
        Ok(BigEndian::read_u64(payload) as usize)
    }

    #[cfg(not(target_pointer_width = "64"))]
    fn decode(raw: RawValue<'a>) -> Result<Self> {
        let payload = raw.expect(Self::EXPECTED, FormatId::UInt32)?;
        Ok(BigEndian::read_u32(payload) as usize)
    }
}

impl<'a> Decode<'a> for isize {
    const EXPECTED: &'static str = "isize";

    #[cfg(target_pointer_width = "64")]
    fn decode(raw: RawValue<'a>) -> Result<Self> {
        let payload = raw.expect(Self::EXPECTED, FormatId::Int64)?;
        Ok(BigEndian::read_i64(payload) as isize)
    }

    #[cfg(not(target_pointer_width = "64"))]
    fn decode(raw: RawValue<'a>) -> Result<Self> {
        let payload = raw.expect(Self::EXPECTED, FormatId::Int32)?;
        Ok(BigEndian::read_i32(payload) as isize)
    }
}

impl<'a> Decode<'a> for bool {
    const EXPECTED: &'static str = "bool";

    fn decode(raw: RawValue<'a>) -> Result<Self> {
        match raw.format {
            FormatId::True => Ok(true),
            FormatId::False => Ok(false),
            other => Err(Error::type_mismatch(Self::EXPECTED, other)),
        }
    }
}

impl<'a> Decode<'a> for &'a str {
    const EXPECTED: &'static str = "str";

    fn decode(raw: RawValue<'a>) -> Result<Self> {
        if raw.format.shape() != Shape::Str {
            return Err(Error::type_mismatch(Self::EXPECTED, raw.format));
        }
        std::str::from_utf8(raw.payload).map_err(|_| Error::InvalidUtf8)
    }
}

impl<'a> Decode<'a> for String {
    const EXPECTED: &'static str = "str";

    fn decode(raw: RawValue<'a>) -> Result<Self> {
        <&str>::decode(raw).map(str::to_owned)
    }
}

impl<'a, T: Decode<'a>> Decode<'a> for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn decode(raw: RawValue<'a>) -> Result<Self> {
        if raw.format == FormatId::Nil {
            return Ok(None);
        }
        T::decode(raw).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn raw(format: FormatId, payload: &[u8]) -> RawValue<'_> {
        RawValue::new(format, payload).unwrap()
    }

    #[test]
    fn test_decode_numbers() {
        assert_eq!(u8::decode(raw(FormatId::UInt8, &[5])).unwrap(), 5);
        assert_eq!(u16::decode(raw(FormatId::UInt16, &[1, 2])).unwrap(), 0x0102);
        assert_eq!(i8::decode(raw(FormatId::Int8, &[0xff])).unwrap(), -1);
        assert_eq!(
            i32::decode(raw(FormatId::Int32, &[0x80, 0, 0, 0])).unwrap(),
            i32::MIN
        );
        assert_eq!(
            f32::decode(raw(FormatId::Float32, &[0x3f, 0x80, 0, 0])).unwrap(),
            1.0
        );
    }

    #[test]
    fn test_decode_exact_width() {
        let err = u16::decode(raw(FormatId::UInt8, &[5])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let err = u8::decode(raw(FormatId::PositiveFixInt, &[5])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let err = i64::decode(raw(FormatId::UInt64, &[0; 8])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_decode_fixints() {
        assert_eq!(
            PositiveFixInt::decode(raw(FormatId::PositiveFixInt, &[0x7f])).unwrap(),
            PositiveFixInt(127)
        );
        assert_eq!(
            NegativeFixInt::decode(raw(FormatId::NegativeFixInt, &[0xe0])).unwrap(),
            NegativeFixInt(-32)
        );
    }

    #[test]
    fn test_decode_bool() {
        assert!(bool::decode(raw(FormatId::True, &[])).unwrap());
        assert!(!bool::decode(raw(FormatId::False, &[])).unwrap());
        assert!(bool::decode(raw(FormatId::Nil, &[])).is_err());
    }

    #[test]
    fn test_decode_str() {
        assert_eq!(<&str>::decode(raw(FormatId::FixStr, b"hi")).unwrap(), "hi");
        let err = <&str>::decode(raw(FormatId::Str8, &[0xff, 0xfe])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataCorrupted);
        assert!(String::decode(raw(FormatId::UInt8, &[1])).is_err());
    }

    #[test]
    fn test_decode_option() {
        assert_eq!(Option::<u8>::decode(raw(FormatId::Nil, &[])).unwrap(), None);
        assert_eq!(
            Option::<u8>::decode(raw(FormatId::UInt8, &[9])).unwrap(),
            Some(9)
        );
    }

    #[test]
    fn test_raw_value_checks_width() {
        assert!(RawValue::new(FormatId::UInt32, &[0, 0]).is_err());
        assert!(RawValue::new(FormatId::Nil, &[1]).is_err());
    }
}
