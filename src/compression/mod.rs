//! Streaming dictionary compression.
//!
//! The archive layer compresses every payload before encryption with the
//! codec in [`dict`]: an LZW-style scheme whose dictionary grows one entry
//! per previously-unseen prefix until it fills the 16-bit code space, then
//! freezes. Both sides count entries identically, so the record framing
//! needs no in-band signalling.
//!
//! Compression happens before encryption because the cipher's output is
//! incompressible; the reverse order would make every archive larger than
//! its input.

pub mod dict;
