//! The archive container format.
//!
//! A single self-describing byte stream binds the compressor and the cipher
//! together; [`archive`] holds the reader and writer for it. All multi-byte
//! integers in the container are big-endian.

pub mod archive;
