//! Content hashing for comet.
//!
//! Every object key and every drift comparison goes through a
//! domain-separated BLAKE3 [`ContentHasher`]. All hashing wraps the `blake3`
//! crate; there is no custom cryptography.

pub mod hasher;

pub use hasher::{ContentHasher, HasherError};
