//! Password-derived key material.
//!
//! The cipher consumes exactly 4096 bytes of key material per password:
//!
//! * bytes `[0, 2048)` key the eight substitution boxes, 256 bytes each;
//! * bytes `[2048, 4096)` key the bit-permutation box.
//!
//! Expansion is plain cyclic repetition of the password bytes - there is no
//! hashing and no KDF, so two passwords that are cyclic rotations of each
//! other can collide. This module is a plain data container; all
//! cryptographic operations live in [`crate::cipher`].

use crate::{Error, Result};

/// Total key bytes consumed by the cipher.
pub const KEY_LEN: usize = 4096;

/// Number of substitution boxes keyed from the schedule.
pub const SBOX_COUNT: usize = 8;

/// Key bytes per substitution box.
pub const SBOX_KEY_LEN: usize = 256;

/// Key bytes for the permutation box.
pub const PBOX_KEY_LEN: usize = 2048;

/// Expanded key material for one password.
pub struct KeySchedule {
    bytes: Box<[u8; KEY_LEN]>,
}

impl KeySchedule {
    /// Expand a password into [`KEY_LEN`] bytes by cyclic repetition.
    /// Passwords longer than [`KEY_LEN`] bytes are truncated.
    ///
    /// Returns [`Error::Parse`] for an empty password.
    pub fn from_password(password: &[u8]) -> Result<Self> {
        if password.is_empty() {
            return Err(Error::Parse("password must not be empty"));
        }
        let mut bytes = Box::new([0u8; KEY_LEN]);
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = password[i % password.len()];
        }
        Ok(Self { bytes })
    }

    /// Key bytes for substitution box `s`.
    ///
    /// # Panics
    /// Panics if `s >= SBOX_COUNT`.
    pub(crate) fn sbox_key(&self, s: usize) -> &[u8; SBOX_KEY_LEN] {
        assert!(s < SBOX_COUNT);
        self.bytes[s * SBOX_KEY_LEN..][..SBOX_KEY_LEN]
            .try_into()
            .unwrap()
    }

    /// Key bytes for the permutation box.
    pub(crate) fn pbox_key(&self) -> &[u8; PBOX_KEY_LEN] {
        self.bytes[SBOX_COUNT * SBOX_KEY_LEN..].try_into().unwrap()
    }
}
