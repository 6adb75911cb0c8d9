//! Lazypack - MessagePack-compatible codec with lazily indexed map decoding
//!
//! Encoding goes through a value tree: host types implement [`Encode`] and
//! the tree is serialized by a [`Writer`]. Decoding a map-shaped message
//! goes through a [`Document`], which indexes the map on first access and
//! then resolves fields directly from the input buffer.
//!
//! # Example
//!
//! ```rust
//! use lazypack::{Document, Encode, Encoder, Result, ValueEncoder};
//!
//! struct Point {
//!     x: i32,
//!     label: String,
//! }
//!
//! impl Encode for Point {
//!     fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
//!         encoder.map(|map| {
//!             map.field("x", &self.x)?.field("label", &self.label)?;
//!             Ok(())
//!         })
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     // Encoding
//!     let point = Point { x: -7, label: "origin".to_string() };
//!     let mut encoder = Encoder::new();
//!     let data = encoder.encode(&point)?.to_vec();
//!
//!     // Decoding
//!     let doc = Document::new(&data);
//!     let x: i32 = doc.decode_field("x")?;
//!     let label: &str = doc.decode_field("label")?;
//!     assert_eq!(x, -7);
//!     assert_eq!(label, "origin");
//!     Ok(())
//! }
//! ```

mod decode;
mod document;
mod encode;
mod error;
mod format;
mod reader;
mod slice;
mod table;
mod value;
mod writer;

pub use decode::{Decode, RawValue};
pub use document::Document;
pub use encode::{to_value, Encode, Encoder, MapEncoder, SeqEncoder, ValueEncoder};
pub use error::{Error, ErrorKind, Result};
pub use format::{FormatId, PayloadLen, Shape};
pub use reader::{Reader, DEFAULT_MAX_DEPTH};
pub use slice::Slice;
pub use table::{DecodedField, FieldTable};
pub use value::{NegativeFixInt, PositiveFixInt, Value};
pub use writer::{Writer, INITIAL_CAPACITY};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Marshal encodes a value using a custom encoder function.
pub fn marshal<T, F>(value: &T, encoder: F) -> Result<Vec<u8>>
where
    T: ?Sized,
    F: FnOnce(&mut ValueEncoder, &T) -> Result<()>,
{
    let mut slot = ValueEncoder::new();
    encoder(&mut slot, value)?;
    let tree = slot.into_value()?;
    let mut writer = Writer::new();
    writer.write_value(&tree)?;
    Ok(writer.into_bytes())
}

/// Encodes a value through its [`Encode`] implementation.
pub fn to_vec<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>> {
    marshal(value, |slot, value| value.encode(slot))
}

/// Unmarshal decodes a map-shaped message using a custom decoder function.
pub fn unmarshal<'a, T, F>(data: &'a [u8], decoder: F) -> Result<T>
where
    F: FnOnce(&Document<'a>) -> Result<T>,
{
    let doc = Document::new(data);
    decoder(&doc)
}
