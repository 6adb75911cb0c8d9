//! Error types for lazypack operations.

use thiserror::Error;

use crate::format::FormatId;

/// Result type for lazypack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for lazypack operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A tag byte that does not belong to any known format.
    #[error("unknown format tag 0x{tag:02x} at offset {offset}")]
    UnknownFormat { tag: u8, offset: usize },

    /// Buffer underflow during decoding.
    #[error("buffer underflow: needed {needed} bytes, only {available} available")]
    BufferUnderflow { needed: usize, available: usize },

    /// Invalid UTF-8 string payload.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Nested maps go deeper than the decoder allows.
    #[error("nesting depth exceeds limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// The stored format is not the one the requested type maps to.
    #[error("type mismatch: expected {expected}, found {found:?}")]
    TypeMismatch {
        expected: &'static str,
        found: FormatId,
    },

    /// Map lookup miss.
    #[error("key not found: {0:?}")]
    KeyNotFound(String),

    /// Operation the lazy engine does not support.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// A value that cannot be put on the wire.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// An encode callback finished without producing a value.
    #[error("no container or value was requested by the encoder")]
    ContainerNotRequested,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown tag, truncated buffer or malformed payload.
    DataCorrupted,
    /// Requested type does not match the encoded format.
    TypeMismatch,
    /// A map has no entry with the requested key.
    KeyNotFound,
    /// The operation is not supported by the indexed decoder.
    NotImplemented,
    /// The value could not be encoded.
    Encoding,
    /// The encoder was never given a value.
    ContainerNotRequested,
}

impl Error {
    /// Creates a buffer underflow error.
    pub fn buffer_underflow(needed: usize, available: usize) -> Self {
        Self::BufferUnderflow { needed, available }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: &'static str, found: FormatId) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Creates an encoding error.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Returns the kind this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownFormat { .. }
            | Error::BufferUnderflow { .. }
            | Error::InvalidUtf8
            | Error::DepthLimitExceeded { .. } => ErrorKind::DataCorrupted,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::KeyNotFound(_) => ErrorKind::KeyNotFound,
            Error::NotImplemented(_) => ErrorKind::NotImplemented,
            Error::Encoding(_) | Error::Io(_) => ErrorKind::Encoding,
            Error::ContainerNotRequested => ErrorKind::ContainerNotRequested,
        }
    }

    /// Returns true for corrupt or truncated input.
    pub fn is_data_corrupted(&self) -> bool {
        self.kind() == ErrorKind::DataCorrupted
    }
}
