//! The password-keyed block cipher.
//!
//! A substitution-permutation network over 256-byte blocks, keyed by plain
//! cyclic expansion of the password (see [`crate::keys`]) and chained from
//! block to block through an evolving 256-byte seed.
//!
//! These are **not** modern cryptographic primitives. The design predates any
//! security review, is not constant-time, and exists to read and write a
//! fixed archive format. Treat it as an encoding, not as protection against
//! a motivated attacker.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`sbox`]  | Keyed byte substitution (two mutually inverse 256-entry tables) |
//! | [`pbox`]  | Keyed bit permutation over a 256-byte block (2048 positions) |
//! | [`spbox`] | Eight-round network combining both, plus the chaining [`spbox::Seed`] |
//!
//! ## Payload streams
//!
//! [`Cipher`] wraps the network behind a payload-level protocol: a fresh
//! random seed per payload, the payload length up front, random padding on
//! the trailing partial block.
//!
//! ```text
//! [0x000] PayloadLength N   (u64 BE)
//! [0x008] Initial seed      (256 bytes, no zero bytes)
//! [0x108] Ciphertext        (N rounded up to a multiple of 256 bytes)
//! ```

pub mod pbox;
pub mod sbox;
pub mod spbox;

use std::io::{Read, Write};

use rand::Rng;

use crate::cipher::spbox::{BLOCK_LEN, Seed, Spbox};
use crate::keys::KeySchedule;
use crate::progress::Progress;
use crate::utils::{be_u64, bytesa};
use crate::{Error, Result};

/// Block-stream cipher keyed by a password.
///
/// One `Cipher` can encode or decode any number of payloads; every payload
/// carries its own seed, so payloads are independent of each other.
pub struct Cipher {
    sp_box: Spbox,
}

impl Cipher {
    /// Key the cipher from a password.
    ///
    /// Returns [`Error::Parse`] for an empty password.
    pub fn new(password: &[u8]) -> Result<Self> {
        let keys = KeySchedule::from_password(password)?;
        // The placeholder seed is replaced before any block is processed.
        let sp_box = Spbox::new(&keys, Seed::ones());
        Ok(Self { sp_box })
    }

    /// Encrypt `payload` to `out` as one payload stream: length, fresh seed,
    /// then one 256-byte ciphertext block per (padded) plaintext block.
    ///
    /// The trailing partial block is padded with random bytes; the length
    /// field tells the decoder how much of the final block to keep.
    pub fn encode_payload<W: Write, G: Rng>(
        &mut self,
        payload: &[u8],
        out: &mut W,
        rng: &mut G,
        progress: &mut dyn Progress,
    ) -> Result<()> {
        let seed = Seed::random(rng);
        out.write_all(&(payload.len() as u64).to_be_bytes())?;
        out.write_all(seed.as_bytes())?;
        self.sp_box.set_seed(seed);

        let total = payload.len() as u64;
        let mut done = 0u64;
        for chunk in payload.chunks(BLOCK_LEN) {
            let mut block = [0u8; BLOCK_LEN];
            block[..chunk.len()].copy_from_slice(chunk);
            if chunk.len() < BLOCK_LEN {
                rng.fill(&mut block[chunk.len()..]);
            }
            out.write_all(&self.sp_box.encrypt_block(&block))?;
            done += chunk.len() as u64;
            progress.report(done, total);
        }
        Ok(())
    }

    /// Decrypt one payload stream from `r`, returning exactly the number of
    /// plaintext bytes the stream's length field promises.
    ///
    /// Truncated streams surface as [`Error::UnexpectedEof`]; a seed with a
    /// zero byte as [`Error::Parse`].
    pub fn decode_payload<R: Read>(
        &mut self,
        r: &mut R,
        progress: &mut dyn Progress,
    ) -> Result<Vec<u8>> {
        let len = be_u64(r)?;
        let seed = Seed::try_from(bytesa::<BLOCK_LEN>(r)?)?;
        self.sp_box.set_seed(seed);

        let cap =
            usize::try_from(len).map_err(|_| Error::Parse("payload length exceeds address space"))?;
        // The length field is untrusted; cap the pre-allocation and let the
        // vector grow against actual ciphertext.
        let mut plain = Vec::with_capacity(cap.min(1 << 20));
        let mut remaining = len;
        while remaining > 0 {
            let block = bytesa::<BLOCK_LEN>(r)?;
            let decoded = self.sp_box.decrypt_block(&block);
            let keep = remaining.min(BLOCK_LEN as u64) as usize;
            plain.extend_from_slice(&decoded[..keep]);
            remaining -= keep as u64;
            progress.report(len - remaining, len);
        }
        Ok(plain)
    }
}

/// Deterministic pseudo-random bytes for unit tests.
#[cfg(test)]
pub(crate) fn test_key_bytes<const N: usize>(salt: u64) -> [u8; N] {
    let mut state = salt.wrapping_mul(0x9e3779b97f4a7c15).wrapping_add(1);
    let mut out = [0u8; N];
    for b in &mut out {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        *b = (state >> 33) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::progress::NoProgress;

    fn round_trip(len: usize) {
        let payload: Vec<u8> = test_key_bytes::<4096>(len as u64)[..len].to_vec();
        let mut cipher = Cipher::new(b"correct horse").unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let mut stream = Vec::new();
        cipher
            .encode_payload(&payload, &mut stream, &mut rng, &mut NoProgress)
            .unwrap();

        // length + seed + ciphertext rounded up to whole blocks
        let blocks = len.div_ceil(BLOCK_LEN);
        assert_eq!(stream.len(), 8 + BLOCK_LEN + blocks * BLOCK_LEN);

        let mut decoder = Cipher::new(b"correct horse").unwrap();
        let decoded = decoder
            .decode_payload(&mut Cursor::new(&stream), &mut NoProgress)
            .unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn payload_round_trips_at_boundary_lengths() {
        for len in [0, 1, 100, 255, 256, 257, 300, 512, 1000] {
            round_trip(len);
        }
    }

    #[test]
    fn wrong_password_garbles_the_payload() {
        let payload = test_key_bytes::<512>(9).to_vec();
        let mut cipher = Cipher::new(b"alpha").unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let mut stream = Vec::new();
        cipher
            .encode_payload(&payload, &mut stream, &mut rng, &mut NoProgress)
            .unwrap();

        let mut other = Cipher::new(b"beta").unwrap();
        let decoded = other
            .decode_payload(&mut Cursor::new(&stream), &mut NoProgress)
            .unwrap();
        assert_eq!(decoded.len(), payload.len());
        assert_ne!(decoded, payload);
    }

    #[test]
    fn truncated_stream_is_an_eof_error() {
        let payload = test_key_bytes::<512>(10).to_vec();
        let mut cipher = Cipher::new(b"pw").unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let mut stream = Vec::new();
        cipher
            .encode_payload(&payload, &mut stream, &mut rng, &mut NoProgress)
            .unwrap();
        stream.truncate(8 + BLOCK_LEN + 100);

        let mut decoder = Cipher::new(b"pw").unwrap();
        let err = decoder
            .decode_payload(&mut Cursor::new(&stream), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn zero_seed_byte_is_rejected() {
        let mut stream = vec![0u8; 8 + BLOCK_LEN + BLOCK_LEN];
        stream[7] = 1; // length 1, seed all zero
        let mut decoder = Cipher::new(b"pw").unwrap();
        let err = decoder
            .decode_payload(&mut Cursor::new(&stream), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
