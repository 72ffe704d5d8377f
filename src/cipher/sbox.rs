//! Keyed byte substitution.

/// A keyed permutation of the byte values `0..=255`.
///
/// Construction scatters each value `i` into the table by walking a rotating
/// cursor over the ring of slots: the key byte `key[i]` selects how many
/// still-empty slots to pass before placing `i`. The walk resumes from the
/// slot of the previous placement, so every key byte influences all later
/// placements.
pub struct Sbox {
    encode_map: [u8; 256],
    decode_map: [u8; 256],
}

impl Sbox {
    /// Build the substitution tables from 256 key bytes.
    pub fn new(key: &[u8; 256]) -> Self {
        let mut encode_map = [0u8; 256];
        let mut filled = [false; 256];
        let mut index = 0usize;
        for i in 0..256 {
            let max_empty = 256 - i;
            let target = 1 + key[i] as usize % max_empty;
            let mut empty = 0usize;
            // The cursor must not advance past the slot on which the count
            // reaches its target; the next value starts scanning there.
            loop {
                if !filled[index] {
                    empty += 1;
                }
                if empty < target {
                    index = (index + 1) % 256;
                } else {
                    break;
                }
            }
            encode_map[index] = i as u8;
            filled[index] = true;
        }

        let mut decode_map = [0u8; 256];
        for (i, &e) in encode_map.iter().enumerate() {
            decode_map[e as usize] = i as u8;
        }

        Self {
            encode_map,
            decode_map,
        }
    }

    /// Substitute one byte.
    #[inline]
    pub fn encode(&self, plain: u8) -> u8 {
        self.encode_map[plain as usize]
    }

    /// Invert one substituted byte.
    #[inline]
    pub fn decode(&self, encoded: u8) -> u8 {
        self.decode_map[encoded as usize]
    }
}
