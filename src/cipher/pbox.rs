//! Keyed bit permutation over 256-byte blocks.

/// Number of bit positions shuffled by one [`Pbox`].
pub const PBOX_BITS: usize = 2048;

/// A keyed permutation of the 2048 bit positions of a 256-byte block.
///
/// The tables are built with the same rotating-cursor scatter as
/// [`Sbox`](crate::cipher::sbox::Sbox), scaled to 2048 slots. A scalar
/// `p_seed` rotates every source bit position before the table lookup on
/// encode and is subtracted after the lookup on decode; the two directions
/// apply the offset on opposite sides of the table, and both must do so for
/// decode to invert encode.
pub struct Pbox {
    encode_map: [u16; PBOX_BITS],
    decode_map: [u16; PBOX_BITS],
}

impl Pbox {
    /// Build the permutation tables from 2048 key bytes.
    pub fn new(key: &[u8; PBOX_BITS]) -> Self {
        let mut encode_map = [0u16; PBOX_BITS];
        let mut filled = [false; PBOX_BITS];
        let mut index = 0usize;
        for i in 0..PBOX_BITS {
            let max_empty = PBOX_BITS - i;
            let target = 1 + key[i] as usize % max_empty;
            let mut empty = 0usize;
            loop {
                if !filled[index] {
                    empty += 1;
                }
                if empty < target {
                    index = (index + 1) % PBOX_BITS;
                } else {
                    break;
                }
            }
            encode_map[index] = i as u16;
            filled[index] = true;
        }

        let mut decode_map = [0u16; PBOX_BITS];
        for (i, &e) in encode_map.iter().enumerate() {
            decode_map[e as usize] = i as u16;
        }

        Self {
            encode_map,
            decode_map,
        }
    }

    /// Scatter the set bits of `block` to their permuted positions.
    pub fn encode(&self, block: &[u8; 256], p_seed: u8) -> [u8; 256] {
        let mut encoded = [0u8; 256];
        for i in 0..256 {
            let base = i * 8 + p_seed as usize;
            for b in 0..8 {
                if block[i] & (1 << b) != 0 {
                    let dst = self.encode_map[(base + b) % PBOX_BITS] as usize;
                    encoded[dst / 8] |= 1 << (dst % 8);
                }
            }
        }
        encoded
    }

    /// Gather the set bits of `block` back to their original positions.
    pub fn decode(&self, block: &[u8; 256], p_seed: u8) -> [u8; 256] {
        let mut decoded = [0u8; 256];
        for i in 0..256 {
            for b in 0..8 {
                if block[i] & (1 << b) != 0 {
                    // p_seed comes off after the lookup here, mirroring where
                    // encode added it on.
                    let src = self.decode_map[i * 8 + b] as usize;
                    let dst = (src + PBOX_BITS - p_seed as usize) % PBOX_BITS;
                    decoded[dst / 8] |= 1 << (dst % 8);
                }
            }
        }
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::test_key_bytes;

    #[test]
    fn decode_inverts_encode_for_every_p_seed() {
        let key = test_key_bytes::<PBOX_BITS>(0x9e37);
        let pbox = Pbox::new(&key);
        let block = test_key_bytes::<256>(0x1234);
        for p_seed in 0..=255u8 {
            let encoded = pbox.encode(&block, p_seed);
            assert_eq!(pbox.decode(&encoded, p_seed), block);
        }
    }

    #[test]
    fn permutation_moves_most_bytes() {
        let key = test_key_bytes::<PBOX_BITS>(0x7f4a);
        let pbox = Pbox::new(&key);
        let block = test_key_bytes::<256>(0x00ff);
        let encoded = pbox.encode(&block, 42);
        let same = block
            .iter()
            .zip(encoded.iter())
            .filter(|(a, b)| a == b)
            .count();
        assert!(same < 26, "{same} bytes unchanged");
    }

    #[test]
    fn bit_population_is_preserved() {
        let key = test_key_bytes::<PBOX_BITS>(0x0bad);
        let pbox = Pbox::new(&key);
        let block = test_key_bytes::<256>(0x4242);
        let encoded = pbox.encode(&block, 7);
        let ones_in = block.iter().map(|b| b.count_ones()).sum::<u32>();
        let ones_out = encoded.iter().map(|b| b.count_ones()).sum::<u32>();
        assert_eq!(ones_in, ones_out);
    }
}
