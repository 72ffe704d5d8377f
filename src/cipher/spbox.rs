//! The eight-round substitution-permutation network and its chaining seed.

use rand::Rng;

use crate::cipher::pbox::Pbox;
use crate::cipher::sbox::Sbox;
use crate::keys::{KeySchedule, SBOX_COUNT};
use crate::{Error, Result};

/// Cipher block size in bytes.
pub const BLOCK_LEN: usize = 256;

/// 256 bytes of chaining state.
///
/// Every byte is in `1..=255`. A zero byte would make the per-byte
/// substitution chain in [`Spbox`] degenerate, so `0x00` is rejected at
/// construction and rewritten to `0x01` whenever the seed evolves.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed([u8; BLOCK_LEN]);

impl Seed {
    /// Draw a fresh seed, each byte uniform in `1..=255`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; BLOCK_LEN];
        for b in &mut bytes {
            *b = rng.gen_range(1..=255);
        }
        Self(bytes)
    }

    /// The all-ones seed. A placeholder for callers that install a real seed
    /// before processing any block.
    pub const fn ones() -> Self {
        Self([1; BLOCK_LEN])
    }

    /// Raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; BLOCK_LEN] {
        &self.0
    }
}

impl TryFrom<[u8; BLOCK_LEN]> for Seed {
    type Error = Error;

    /// Rejects any seed containing a zero byte.
    fn try_from(bytes: [u8; BLOCK_LEN]) -> Result<Self> {
        if bytes.contains(&0) {
            return Err(Error::Parse("seed contains a zero byte"));
        }
        Ok(Self(bytes))
    }
}

/// Substitution-permutation network over 256-byte blocks.
///
/// Eight [`Sbox`]es and one [`Pbox`] are keyed once from the password's
/// [`KeySchedule`]; the [`Seed`] chains consecutive blocks. Each block is
/// processed in eight rounds, every round XOR-mixing the seed and the round's
/// substitution table into the block, piping each byte through the seed-bit
/// selected chain of substitutions, and scattering the result bit-wise
/// through the permutation box.
///
/// Encrypting or decrypting a block advances the seed, so a decryptor must
/// install the exact seed the encryptor started from (see
/// [`set_seed`](Self::set_seed)) and process blocks in order.
pub struct Spbox {
    s_boxes: [Sbox; SBOX_COUNT],
    p_box: Pbox,
    seed: Seed,
}

impl Spbox {
    /// Key the network and install `seed` as the initial chaining state.
    pub fn new(keys: &KeySchedule, seed: Seed) -> Self {
        let s_boxes = std::array::from_fn(|s| Sbox::new(keys.sbox_key(s)));
        let p_box = Pbox::new(keys.pbox_key());
        Self {
            s_boxes,
            p_box,
            seed,
        }
    }

    /// Current chaining state.
    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Replace the chaining state.
    pub fn set_seed(&mut self, seed: Seed) {
        self.seed = seed;
    }

    // The permutation offset for the next block: the sum of all seed bytes
    // mod 256. Computed before the block advances the seed, so both
    // directions derive the same value.
    fn p_seed(&self) -> u8 {
        self.seed
            .0
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_add(b))
    }

    fn encode_round(&self, input: &[u8; BLOCK_LEN], round: usize, p_seed: u8) -> [u8; BLOCK_LEN] {
        let mut out = [0u8; BLOCK_LEN];
        for i in 0..BLOCK_LEN {
            let seed_i = self.seed.0[i];
            let mut x = input[i] ^ self.s_boxes[round].encode(i as u8) ^ seed_i;
            // The seed bits select which of the eight substitutions apply,
            // in ascending order.
            for j in 0..SBOX_COUNT {
                if seed_i & (1 << j) != 0 {
                    x = self.s_boxes[j].encode(x);
                }
            }
            out[i] = x;
        }
        self.p_box.encode(&out, p_seed)
    }

    fn decode_round(&self, input: &[u8; BLOCK_LEN], round: usize, p_seed: u8) -> [u8; BLOCK_LEN] {
        let mut out = self.p_box.decode(input, p_seed);
        for i in 0..BLOCK_LEN {
            let seed_i = self.seed.0[i];
            // Unwind the substitution chain in descending order.
            for j in (0..SBOX_COUNT).rev() {
                if seed_i & (1 << j) != 0 {
                    out[i] = self.s_boxes[j].decode(out[i]);
                }
            }
            out[i] ^= self.s_boxes[round].encode(i as u8) ^ seed_i;
        }
        out
    }

    /// Encrypt one block and advance the chaining seed.
    pub fn encrypt_block(&mut self, plain: &[u8; BLOCK_LEN]) -> [u8; BLOCK_LEN] {
        let p_seed = self.p_seed();
        let mut block = self.encode_round(plain, 0, p_seed);
        for round in 1..SBOX_COUNT {
            block = self.encode_round(&block, round, p_seed);
        }
        self.advance_seed(plain);
        block
    }

    /// Decrypt one block and advance the chaining seed.
    pub fn decrypt_block(&mut self, encoded: &[u8; BLOCK_LEN]) -> [u8; BLOCK_LEN] {
        let p_seed = self.p_seed();
        let mut block = self.decode_round(encoded, SBOX_COUNT - 1, p_seed);
        for round in (0..SBOX_COUNT - 1).rev() {
            block = self.decode_round(&block, round, p_seed);
        }
        self.advance_seed(&block);
        block
    }

    // seed[i] <- seed[i] XOR plain[i], with 0x00 forced to 0x01 so the
    // stored seed never contains a zero byte. Both sides apply this to the
    // plaintext block, keeping the chains in lockstep.
    fn advance_seed(&mut self, plain: &[u8; BLOCK_LEN]) {
        for (s, &p) in self.seed.0.iter_mut().zip(plain) {
            *s ^= p;
            if *s == 0 {
                *s = 1;
            }
        }
    }
}
