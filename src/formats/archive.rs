//! Archive reader and writer.
//!
//! ## Layout
//! ```text
//! [0x00] Mode                           (1 byte: 0x00 file, 0x01 folder)
//!
//! Single file (mode 0x00) - one payload stream:
//! [0x001] CompressedLength N            (u64 BE)
//! [0x009] Initial cipher seed           (256 bytes)
//! [0x109] Ciphertext                    (N rounded up to a 256 multiple)
//!
//! Folder (mode 0x01) - per-file records until EOF:
//! [0x00] NameLength L                   (1 byte, 1..=255)
//! [0x01] Relative path                  (L bytes, UTF-8, '/'-separated)
//! [...]  Payload stream as above
//! ```
//!
//! Every payload is independently compressed with
//! [`crate::compression::dict`] and then encrypted; the length field records
//! the **compressed** size. End-of-archive for folders is a clean EOF
//! exactly where the next name-length byte would start - EOF anywhere else
//! is [`Error::UnexpectedEof`].
//!
//! ## Decode-side hardening
//! Folder entries come from untrusted archives, so paths are rejected if
//! absolute or containing `.`/`..`/empty segments (or a backslash) before
//! they reach the host's [`TreeWriter`].

use std::io::{Read, Write};

use rand::Rng;

use crate::cipher::Cipher;
use crate::compression::dict::{Compressor, Decompressor};
use crate::progress::{NoProgress, Progress};
use crate::tree::{TreeReader, TreeWriter};
use crate::utils::{bytesv, opt_u8, u8 as read_u8};
use crate::{Error, Result};

/// Mode byte for a single-file archive.
pub const MODE_FILE: u8 = 0x00;
/// Mode byte for a folder archive.
pub const MODE_FOLDER: u8 = 0x01;

/// What an archive contains, per its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One file.
    File,
    /// A folder tree of per-file records.
    Folder,
}

/// Read and validate the mode byte.
pub fn read_mode<R: Read>(r: &mut R) -> Result<Mode> {
    match read_u8(r)? {
        MODE_FILE => Ok(Mode::File),
        MODE_FOLDER => Ok(Mode::Folder),
        m => Err(Error::BadMode(m)),
    }
}

/// Encode one file as a complete single-file archive.
pub fn encode_file<R: Read, W: Write, G: Rng>(
    cipher: &mut Cipher,
    input: &mut R,
    out: &mut W,
    rng: &mut G,
    progress: &mut dyn Progress,
) -> Result<()> {
    out.write_all(&[MODE_FILE])?;
    let payload = compress_stream(input)?;
    cipher.encode_payload(&payload, out, rng, progress)
}

/// Decode a complete single-file archive (mode byte included) to `out`.
pub fn decode_file<R: Read, W: Write>(
    cipher: &mut Cipher,
    r: &mut R,
    out: &mut W,
    progress: &mut dyn Progress,
) -> Result<()> {
    match read_mode(r)? {
        Mode::File => decode_file_body(cipher, r, out, progress),
        Mode::Folder => Err(Error::Parse("expected a single-file archive")),
    }
}

/// Decode a single-file archive whose mode byte has already been consumed.
pub fn decode_file_body<R: Read, W: Write>(
    cipher: &mut Cipher,
    r: &mut R,
    out: &mut W,
    progress: &mut dyn Progress,
) -> Result<()> {
    let payload = cipher.decode_payload(r, progress)?;
    let plain = decompress_payload(&payload)?;
    out.write_all(&plain)?;
    Ok(())
}

/// Encode a whole tree as a folder archive.
///
/// Files are archived in the order the [`TreeReader`] lists them. `progress`
/// is reported in plaintext bytes across the whole tree.
pub fn encode_folder<T: TreeReader, W: Write, G: Rng>(
    cipher: &mut Cipher,
    tree: &mut T,
    out: &mut W,
    rng: &mut G,
    progress: &mut dyn Progress,
) -> Result<()> {
    out.write_all(&[MODE_FOLDER])?;
    let entries = tree.entries()?;
    let total: u64 = entries.iter().map(|e| e.size).sum();
    let mut done = 0u64;
    for entry in &entries {
        let name = entry.path.as_bytes();
        if name.is_empty() {
            return Err(Error::Parse("empty file name"));
        }
        if name.len() > 255 {
            return Err(Error::NameTooLong(name.len()));
        }
        out.write_all(&[name.len() as u8])?;
        out.write_all(name)?;

        let payload = compress_stream(&mut tree.open(&entry.path)?)?;
        cipher.encode_payload(&payload, out, rng, &mut NoProgress)?;

        done += entry.size;
        progress.report(done, total);
    }
    Ok(())
}

/// Decode a folder archive whose mode byte has already been consumed,
/// creating every file through `tree`.
pub fn decode_folder<R: Read, T: TreeWriter>(
    cipher: &mut Cipher,
    r: &mut R,
    tree: &mut T,
    progress: &mut dyn Progress,
) -> Result<()> {
    loop {
        // Clean EOF here is the end of the archive.
        let Some(name_len) = opt_u8(r)? else {
            return Ok(());
        };
        if name_len == 0 {
            return Err(Error::Parse("zero-length file name"));
        }
        let name = String::from_utf8(bytesv(r, name_len as usize)?)
            .map_err(|_| Error::Parse("file name is not valid UTF-8"))?;
        check_entry_path(&name)?;

        let payload = cipher.decode_payload(r, progress)?;
        let plain = decompress_payload(&payload)?;
        tree.create(&name)?.write_all(&plain)?;
    }
}

// Compress the whole of `input` into an in-memory payload.
fn compress_stream<R: Read>(input: &mut R) -> Result<Vec<u8>> {
    let mut compressor = Compressor::new();
    let mut payload = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => compressor.write(&buf[..n], &mut payload),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    compressor.finish(&mut payload);
    Ok(payload)
}

fn decompress_payload(payload: &[u8]) -> Result<Vec<u8>> {
    let mut plain = Vec::new();
    let mut decompressor = Decompressor::new();
    decompressor.write(payload, &mut plain)?;
    decompressor.finish(&mut plain)?;
    Ok(plain)
}

// Reject anything that could name a file outside the output root.
fn check_entry_path(path: &str) -> Result<()> {
    let escapes = path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if escapes {
        return Err(Error::PathTraversal(path.to_string()));
    }
    Ok(())
}
