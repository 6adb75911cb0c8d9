//! Lazily indexed decoding of map-shaped documents.
//!
//! A [`Document`] borrows an encoded map and answers field queries. The
//! first query walks the map once and builds its [`FieldTable`]; every
//! later query, in any order, is a hash lookup plus a bounds-checked read
//! at a stored offset. Nested maps are indexed during that same walk and
//! handed to child documents that share the parent's bytes.

use std::cell::OnceCell;
use std::ops::Range;
use std::sync::Arc;

use crate::decode::Decode;
use crate::error::{Error, Result};
use crate::reader::{Reader, DEFAULT_MAX_DEPTH};
use crate::slice::Slice;
use crate::table::{DecodedField, FieldTable};

/// A decode session over one encoded map.
///
/// The field index is built on first access and cached for the lifetime of
/// the document. A document can be moved to another thread but not shared
/// between threads.
#[derive(Debug)]
pub struct Document<'a> {
    slice: Slice<'a>,
    max_depth: usize,
    table: OnceCell<Arc<FieldTable>>,
}

impl<'a> Document<'a> {
    /// Creates a document over `data`, which must start with a map.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_max_depth(data, DEFAULT_MAX_DEPTH)
    }

    /// Creates a document that rejects maps nested deeper than `max_depth`.
    pub fn with_max_depth(data: &'a [u8], max_depth: usize) -> Self {
        Self {
            slice: Slice::new(data),
            max_depth,
            table: OnceCell::new(),
        }
    }

    /// Creates a document for an already indexed nested map.
    fn from_table(slice: Slice<'a>, table: Arc<FieldTable>, max_depth: usize) -> Self {
        Self {
            slice,
            max_depth,
            table: OnceCell::from(table),
        }
    }

    /// Returns the bytes this document covers.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.slice.as_bytes()
    }

    /// Returns the view this document reads from.
    pub fn slice(&self) -> Slice<'a> {
        self.slice
    }

    /// Returns a single-value reader at the start of the document.
    pub fn reader(&self) -> Reader<'a> {
        Reader::from_slice(self.slice)
    }

    /// Returns true once the field index has been built.
    pub fn is_indexed(&self) -> bool {
        self.table.get().is_some()
    }

    /// Returns the field index, building it on first use.
    pub fn table(&self) -> Result<&Arc<FieldTable>> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let mut reader = self.reader();
        let table = FieldTable::build(&mut reader, 0, self.max_depth)?;
        Ok(self.table.get_or_init(|| Arc::new(table)))
    }

    /// Absolute byte range of the indexed map in the backing buffer.
    pub fn byte_range(&self) -> Result<Range<usize>> {
        let table = self.table()?;
        Ok(table.start()..table.end())
    }

    /// Number of distinct keys in the map.
    pub fn len(&self) -> Result<usize> {
        Ok(self.table()?.len())
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.table()?.is_empty())
    }

    /// Iterates over the map's keys in unspecified order.
    pub fn keys(&self) -> Result<impl Iterator<Item = &str>> {
        Ok(self.table()?.keys())
    }

    /// Returns true if the map has an entry for `name`.
    pub fn has_field(&self, name: &str) -> Result<bool> {
        Ok(self.table()?.contains_key(name))
    }

    /// Returns the indexed location of a field.
    pub fn field(&self, name: &str) -> Result<&DecodedField> {
        self.table()?
            .get(name)
            .ok_or_else(|| Error::KeyNotFound(name.to_owned()))
    }

    /// Returns true if the field holds nil.
    pub fn is_null(&self, name: &str) -> Result<bool> {
        Ok(self.field(name)?.is_nil())
    }

    /// Decodes a field as `T`.
    ///
    /// Strings decode as `&'a str` borrowed from the document's buffer.
    pub fn decode_field<T: Decode<'a>>(&self, name: &str) -> Result<T> {
        let raw = self.field(name)?.raw(&self.slice, T::EXPECTED)?;
        T::decode(raw)
    }

    /// Decodes a field as `T`, treating a missing key or nil as `None`.
    pub fn decode_field_if_present<T: Decode<'a>>(&self, name: &str) -> Result<Option<T>> {
        match self.table()?.get(name) {
            None => Ok(None),
            Some(field) if field.is_nil() => Ok(None),
            Some(field) => T::decode(field.raw(&self.slice, T::EXPECTED)?).map(Some),
        }
    }

    /// Returns a document for the nested map stored under `name`.
    ///
    /// The child covers exactly the nested map's bytes, shares the parent's
    /// buffer and reuses the index built while scanning the parent.
    pub fn nested(&self, name: &str) -> Result<Document<'a>> {
        match self.field(name)? {
            DecodedField::NestedMap(child) => {
                let slice = self.slice.sub(child.start(), child.byte_count())?;
                Ok(Document::from_table(slice, Arc::clone(child), self.max_depth))
            }
            other => Err(Error::type_mismatch("map", other.format())),
        }
    }
}
