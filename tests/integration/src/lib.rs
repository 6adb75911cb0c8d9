//! Lazypack integration tests.
//!
//! These tests pin the wire output against golden hex vectors and drive
//! host types through both encode and lazy decode paths.

pub mod fixtures;

#[cfg(test)]
mod interop_test;

pub use fixtures::*;
