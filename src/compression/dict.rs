//! LZW-style dictionary codec.
//!
//! ## Codeword stream
//!
//! While the dictionary is still growing, every dictionary miss emits a
//! three-byte record - the 16-bit big-endian code of the longest matched
//! prefix followed by the literal byte that extended it - and registers the
//! extended string as the next code. Once the dictionary is full, a miss
//! emits just the two-byte code and the literal byte starts the next match.
//! Closing the stream flushes any pending prefix as a bare two-byte code.
//!
//! The decoder mirrors the same growth rule, so record boundaries are
//! implicit: three-byte records until the dictionary fills, two-byte records
//! after. A two-byte remainder at end of stream while still growing is the
//! compressor's closing record.
//!
//! ## Dictionary representation
//!
//! Strings are never stored. Each code above 255 is an arena entry holding
//! its parent code and final byte; codes `0..=255` are the one-byte roots.
//! The compressor additionally keeps a `(parent, byte) -> code` map for the
//! forward direction, and the decoder rebuilds a string by walking parent
//! links into a scratch buffer and reversing.

use std::collections::HashMap;

use crate::{Error, Result};

/// Total number of codes; the dictionary freezes once they are assigned.
pub const MAX_DICT_SIZE: usize = 1 << 16;

// Codes 0..=255 are implicit single-byte roots; arena index i describes code
// 256 + i.
#[derive(Clone, Copy)]
struct Entry {
    parent: u16,
    byte: u8,
}

/// Streaming compressor.
pub struct Compressor {
    dict: HashMap<(u16, u8), u16>,
    size: usize,
    // Code of the longest prefix matched so far; `None` between matches.
    current: Option<u16>,
}

impl Compressor {
    pub fn new() -> Self {
        Self {
            dict: HashMap::new(),
            size: 256,
            current: None,
        }
    }

    /// Feed input bytes, appending any completed codewords to `out`.
    pub fn write(&mut self, data: &[u8], out: &mut Vec<u8>) {
        for &b in data {
            let Some(cur) = self.current else {
                // A single byte is always a dictionary root.
                self.current = Some(b as u16);
                continue;
            };
            if let Some(&code) = self.dict.get(&(cur, b)) {
                self.current = Some(code);
            } else if self.size < MAX_DICT_SIZE {
                self.dict.insert((cur, b), self.size as u16);
                self.size += 1;
                out.extend_from_slice(&cur.to_be_bytes());
                out.push(b);
                self.current = None;
            } else {
                out.extend_from_slice(&cur.to_be_bytes());
                self.current = Some(b as u16);
            }
        }
    }

    /// Flush the pending prefix, if any, as a bare two-byte code.
    pub fn finish(self, out: &mut Vec<u8>) {
        if let Some(cur) = self.current {
            out.extend_from_slice(&cur.to_be_bytes());
        }
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Streaming decompressor.
pub struct Decompressor {
    entries: Vec<Entry>,
    // Bytes of a record split across `write` calls (at most two).
    pending: Vec<u8>,
    scratch: Vec<u8>,
}

impl Decompressor {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            pending: Vec::new(),
            scratch: Vec::new(),
        }
    }

    fn size(&self) -> usize {
        256 + self.entries.len()
    }

    /// Feed codeword bytes, appending decoded plaintext to `out`.
    ///
    /// Returns [`Error::Parse`] if a codeword references an entry that was
    /// never registered (a corrupt or mis-keyed stream).
    pub fn write(&mut self, data: &[u8], out: &mut Vec<u8>) -> Result<()> {
        self.pending.extend_from_slice(data);
        let mut pos = 0;
        loop {
            let growing = self.size() < MAX_DICT_SIZE;
            let need = if growing { 3 } else { 2 };
            if self.pending.len() - pos < need {
                break;
            }
            let code = u16::from_be_bytes([self.pending[pos], self.pending[pos + 1]]);
            self.expand(code, out)?;
            if growing {
                let lit = self.pending[pos + 2];
                out.push(lit);
                self.entries.push(Entry { parent: code, byte: lit });
            }
            pos += need;
        }
        self.pending.drain(..pos);
        Ok(())
    }

    /// Consume the compressor's closing record.
    ///
    /// While the dictionary is still growing that record is a bare two-byte
    /// code; any other remainder means the stream was truncated.
    pub fn finish(mut self, out: &mut Vec<u8>) -> Result<()> {
        match self.pending.len() {
            0 => Ok(()),
            2 => {
                let code = u16::from_be_bytes([self.pending[0], self.pending[1]]);
                self.expand(code, out)
            }
            _ => Err(Error::UnexpectedEof),
        }
    }

    // Append the byte string for `code` to `out` by walking parent links.
    fn expand(&mut self, code: u16, out: &mut Vec<u8>) -> Result<()> {
        if code as usize >= self.size() {
            return Err(Error::Parse("codeword references an unregistered entry"));
        }
        self.scratch.clear();
        let mut c = code;
        while c >= 256 {
            let e = self.entries[c as usize - 256];
            self.scratch.push(e.byte);
            c = e.parent;
        }
        self.scratch.push(c as u8);
        out.extend(self.scratch.iter().rev());
        Ok(())
    }
}

impl Default for Decompressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Compress a whole buffer in one call.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut c = Compressor::new();
    c.write(data, &mut out);
    c.finish(&mut out);
    out
}

/// Decompress a whole buffer in one call.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut d = Decompressor::new();
    d.write(data, &mut out)?;
    d.finish(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg_bytes(len: usize, salt: u64) -> Vec<u8> {
        let mut state = salt.wrapping_mul(0x9e3779b97f4a7c15) | 1;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as u8
            })
            .collect()
    }

    #[test]
    fn empty_input_round_trips_to_empty() {
        assert!(compress(&[]).is_empty());
        assert!(decompress(&[]).unwrap().is_empty());
    }

    #[test]
    fn single_byte_is_one_bare_code() {
        let compressed = compress(b"a");
        assert_eq!(compressed, [0, b'a']);
        assert_eq!(decompress(&compressed).unwrap(), b"a");
    }

    #[test]
    fn repeated_pair_uses_the_closing_record() {
        // "abab": one registering record, then the registered code flushed
        // bare at close.
        let compressed = compress(b"abab");
        assert_eq!(compressed, [0, b'a', b'b', 0x01, 0x00]);
        assert_eq!(decompress(&compressed).unwrap(), b"abab");
    }

    #[test]
    fn runs_compress_below_input_size() {
        let data = vec![0u8; 10_000];
        let compressed = compress(&data);
        assert!(compressed.len() < data.len() / 10);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn dictionary_grows_past_the_roots() {
        let mut c = Compressor::new();
        let mut out = Vec::new();
        let data: Vec<u8> = (0..600u32).flat_map(|i| [0x00, 0xFF, (i % 7) as u8]).collect();
        c.write(&data, &mut out);
        assert!(c.size > 256, "dictionary stayed at its roots");
    }

    #[test]
    fn round_trips_across_the_dictionary_full_boundary() {
        // Pseudo-random input creates a new dictionary entry every few
        // bytes; half a megabyte comfortably exhausts the code space.
        let data = lcg_bytes(512 * 1024, 0xc0de);
        let mut c = Compressor::new();
        let mut compressed = Vec::new();
        c.write(&data, &mut compressed);
        assert_eq!(c.size, MAX_DICT_SIZE, "dictionary never froze");
        c.finish(&mut compressed);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn split_writes_match_one_shot_compression() {
        let data = lcg_bytes(4096, 42);
        let whole = compress(&data);

        let mut c = Compressor::new();
        let mut split = Vec::new();
        for chunk in data.chunks(17) {
            c.write(chunk, &mut split);
        }
        c.finish(&mut split);
        assert_eq!(split, whole);

        // Decoding in odd-sized slices exercises the pending-record buffer.
        let mut d = Decompressor::new();
        let mut plain = Vec::new();
        for chunk in whole.chunks(5) {
            d.write(chunk, &mut plain).unwrap();
        }
        d.finish(&mut plain).unwrap();
        assert_eq!(plain, data);
    }

    #[test]
    fn unregistered_code_is_a_parse_error() {
        // Code 0x0200 was never assigned.
        assert!(matches!(
            decompress(&[0x02, 0x00, b'x']),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn lone_trailing_byte_is_an_eof_error() {
        assert!(matches!(decompress(&[0x00]), Err(Error::UnexpectedEof)));
    }
}
