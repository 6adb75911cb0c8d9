//! Field index for map-shaped values.
//!
//! A [`FieldTable`] records, for every key of one map, where the value
//! lives and what format it has. Building the table walks the map once;
//! keys are copied out, values are only classified and stepped over.
//! Nested maps get their own table, so the same key at two nesting levels
//! never collides.

use std::collections::HashMap;
use std::sync::Arc;

use crate::decode::RawValue;
use crate::error::{Error, Result};
use crate::format::{FormatId, Shape};
use crate::reader::Reader;
use crate::slice::Slice;

/// Location and type of one indexed map value.
#[derive(Debug, Clone)]
pub enum DecodedField {
    /// Nil or a boolean; the format is the whole value.
    Constant(FormatId),
    /// Fixed-size number whose payload starts at `offset`.
    ///
    /// For inline integers `offset` is the tag byte itself.
    FixedWidth { format: FormatId, offset: usize },
    /// String whose `len` content bytes start at `offset`.
    VariableWidth {
        format: FormatId,
        offset: usize,
        len: usize,
    },
    /// Nested map with its own index.
    NestedMap(Arc<FieldTable>),
}

impl DecodedField {
    /// Returns the wire format of the field.
    pub fn format(&self) -> FormatId {
        match self {
            DecodedField::Constant(format)
            | DecodedField::FixedWidth { format, .. }
            | DecodedField::VariableWidth { format, .. } => *format,
            DecodedField::NestedMap(table) => table.format(),
        }
    }

    /// Returns true if the field holds nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, DecodedField::Constant(FormatId::Nil))
    }

    /// Resolves the field's payload in `slice` without copying.
    ///
    /// Nested maps have no scalar payload and are reported as a type
    /// mismatch against `expected`.
    pub fn raw<'a>(&self, slice: &Slice<'a>, expected: &'static str) -> Result<RawValue<'a>> {
        match self {
            DecodedField::Constant(format) => RawValue::new(*format, &[]),
            DecodedField::FixedWidth { format, offset } => {
                let width = format.fixed_width().unwrap_or(0);
                RawValue::new(*format, slice.bytes(*offset, width)?)
            }
            DecodedField::VariableWidth {
                format,
                offset,
                len,
            } => RawValue::new(*format, slice.bytes(*offset, *len)?),
            DecodedField::NestedMap(table) => Err(Error::type_mismatch(expected, table.format())),
        }
    }
}

/// Index of one map: key to field location, plus the map's byte range.
#[derive(Debug, Clone)]
pub struct FieldTable {
    format: FormatId,
    start: usize,
    byte_count: usize,
    fields: HashMap<String, DecodedField>,
}

impl FieldTable {
    /// Indexes the map starting at the reader's position.
    ///
    /// On success the reader is left just past the map. `depth` counts the
    /// maps already entered above this one.
    pub fn build(reader: &mut Reader<'_>, depth: usize, max_depth: usize) -> Result<Self> {
        if depth >= max_depth {
            return Err(Error::DepthLimitExceeded { limit: max_depth });
        }

        let start = reader.position();
        let (format, tag) = reader.read_format()?;
        if format.shape() != Shape::Map {
            return Err(Error::type_mismatch("map", format));
        }
        let count = reader.read_len(format, tag)?;

        // Every entry needs at least two bytes.
        let mut fields = HashMap::with_capacity(count.min(reader.remaining() / 2));
        for _ in 0..count {
            let key = reader.read_str()?.to_owned();
            let field = Self::index_value(reader, depth, max_depth)?;
            fields.insert(key, field);
        }

        Ok(Self {
            format,
            start,
            byte_count: reader.position() - start,
            fields,
        })
    }

    fn index_value(reader: &mut Reader<'_>, depth: usize, max_depth: usize) -> Result<DecodedField> {
        let value_start = reader.position();
        let format = reader.peek_format()?;

        let field = match format.shape() {
            Shape::Nil | Shape::Bool => {
                reader.skip(1)?;
                DecodedField::Constant(format)
            }
            Shape::Map => {
                let child = Self::build(reader, depth + 1, max_depth)?;
                DecodedField::NestedMap(Arc::new(child))
            }
            Shape::Array => {
                return Err(Error::NotImplemented(
                    "array values inside an indexed map",
                ))
            }
            Shape::Str => {
                let (format, tag) = reader.read_format()?;
                let len = reader.read_len(format, tag)?;
                let offset = reader.position();
                reader.skip(len)?;
                DecodedField::VariableWidth {
                    format,
                    offset,
                    len,
                }
            }
            Shape::UInt | Shape::Int | Shape::Float => {
                let offset = value_start + format.header_len();
                let width = format.fixed_width().unwrap_or(0);
                reader.set_position(offset)?;
                reader.skip(width)?;
                DecodedField::FixedWidth { format, offset }
            }
        };
        Ok(field)
    }

    /// Returns the format of the indexed map.
    pub fn format(&self) -> FormatId {
        self.format
    }

    /// Absolute offset of the map's tag byte.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Total encoded size of the map, header included.
    pub fn byte_count(&self) -> usize {
        self.byte_count
    }

    /// One past the last byte of the map.
    pub fn end(&self) -> usize {
        self.start + self.byte_count
    }

    /// Looks up a field.
    pub fn get(&self, key: &str) -> Option<&DecodedField> {
        self.fields.get(key)
    }

    /// Returns true if the map has the key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::reader::DEFAULT_MAX_DEPTH;
    use crate::value::Value;
    use crate::writer::Writer;

    fn encode(value: &Value) -> Vec<u8> {
        let mut writer = Writer::new();
        writer.write_value(value).unwrap();
        writer.into_bytes()
    }

    fn build(data: &[u8]) -> Result<FieldTable> {
        let mut reader = Reader::new(data);
        FieldTable::build(&mut reader, 0, DEFAULT_MAX_DEPTH)
    }

    #[test]
    fn test_index_records_locations() {
        let data = encode(&Value::Map(vec![
            (Value::from("n"), Value::Nil),
            (Value::from("i"), Value::UInt7(9)),
            (Value::from("u"), Value::UInt16(0x0102)),
            (Value::from("s"), Value::from("hey")),
        ]));
        // 84 | a1 6e c0 | a1 69 09 | a1 75 cd 01 02 | a1 73 a3 68 65 79
        let table = build(&data).unwrap();

        assert_eq!(table.start(), 0);
        assert_eq!(table.byte_count(), data.len());
        assert_eq!(table.len(), 4);
        assert!(matches!(
            table.get("n"),
            Some(DecodedField::Constant(FormatId::Nil))
        ));
        assert!(matches!(
            table.get("i"),
            Some(DecodedField::FixedWidth {
                format: FormatId::PositiveFixInt,
                offset: 6
            })
        ));
        assert!(matches!(
            table.get("u"),
            Some(DecodedField::FixedWidth {
                format: FormatId::UInt16,
                offset: 10
            })
        ));
        assert!(matches!(
            table.get("s"),
            Some(DecodedField::VariableWidth {
                format: FormatId::FixStr,
                offset: 15,
                len: 3
            })
        ));
    }

    #[test]
    fn test_nested_table_range() {
        let data = encode(&Value::Map(vec![
            (
                Value::from("outer"),
                Value::Map(vec![(Value::from("inner"), Value::Bool(true))]),
            ),
            (Value::from("after"), Value::Bool(false)),
        ]));
        let table = build(&data).unwrap();

        let child = match table.get("outer") {
            Some(DecodedField::NestedMap(child)) => child.clone(),
            other => panic!("unexpected field {:?}", other),
        };
        // 82 | a5 "outer" | 81 a5 "inner" c3 | a5 "after" c2
        assert_eq!(child.start(), 7);
        assert_eq!(child.byte_count(), 8);
        assert!(child.contains_key("inner"));
        assert!(!table.contains_key("inner"));
        assert!(matches!(
            table.get("after"),
            Some(DecodedField::Constant(FormatId::False))
        ));
    }

    #[test]
    fn test_same_key_at_two_levels() {
        let data = encode(&Value::Map(vec![
            (Value::from("id"), Value::UInt8(1)),
            (
                Value::from("child"),
                Value::Map(vec![(Value::from("id"), Value::from("nested"))]),
            ),
        ]));
        let table = build(&data).unwrap();
        assert_eq!(table.get("id").unwrap().format(), FormatId::UInt8);
        match table.get("child") {
            Some(DecodedField::NestedMap(child)) => {
                assert_eq!(child.get("id").unwrap().format(), FormatId::FixStr)
            }
            other => panic!("unexpected field {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let data = encode(&Value::Map(vec![
            (Value::from("k"), Value::UInt8(1)),
            (Value::from("k"), Value::UInt16(2)),
        ]));
        let table = build(&data).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("k").unwrap().format(), FormatId::UInt16);
    }

    #[test]
    fn test_array_value_not_implemented() {
        let data = encode(&Value::Map(vec![(
            Value::from("list"),
            Value::Array(vec![Value::Nil]),
        )]));
        let err = build(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn test_non_map_root() {
        let err = build(&[0xc3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_non_string_key() {
        let err = build(&[0x81, 0x01, 0xc3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_truncated_map() {
        // Claims two entries, holds one.
        assert!(build(&[0x82, 0xa1, 0x61, 0xc3])
            .unwrap_err()
            .is_data_corrupted());
        // Fixed payload cut short.
        assert!(build(&[0x81, 0xa1, 0x61, 0xce, 0x00])
            .unwrap_err()
            .is_data_corrupted());
        // String payload cut short.
        assert!(build(&[0x81, 0xa1, 0x61, 0xa4, b'x'])
            .unwrap_err()
            .is_data_corrupted());
    }

    #[test]
    fn test_depth_limit() {
        let mut data = Vec::new();
        for _ in 0..4 {
            data.extend_from_slice(&[0x81, 0xa1, b'k']);
        }
        data.push(0x80);

        let mut reader = Reader::new(&data);
        assert!(FieldTable::build(&mut reader, 0, 5).is_ok());

        let mut reader = Reader::new(&data);
        let err = FieldTable::build(&mut reader, 0, 4).unwrap_err();
        assert!(matches!(err, Error::DepthLimitExceeded { limit: 4 }));
    }

    #[test]
    fn test_empty_map() {
        let table = build(&[0x80]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.byte_count(), 1);
    }
}
