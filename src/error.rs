//! Library-wide error and result types.

use std::fmt;
use std::io;

/// Result alias used throughout edoc.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Error messages are kept intentionally terse; callers that need richer
/// context should wrap `Error` in their own type.
#[derive(Debug)]
pub enum Error {
    /// The archive's first byte is neither `0x00` (single file) nor `0x01`
    /// (folder).
    BadMode(u8),
    /// The stream ended before all expected bytes could be read.
    UnexpectedEof,
    /// A decoded folder entry names a path that could escape the output
    /// root (absolute, or containing `.`/`..` segments).
    PathTraversal(String),
    /// A file's archive-relative path does not fit the one-byte name-length
    /// field (the value is the offending byte length).
    NameTooLong(usize),
    /// A structural constraint was violated (message describes which one).
    Parse(&'static str),
    /// An underlying I/O operation failed.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadMode(m) => write!(f, "unknown archive mode byte: {m:#04x}"),
            Error::UnexpectedEof => write!(f, "unexpected end of archive"),
            Error::PathTraversal(p) => write!(f, "entry path escapes the output root: {p}"),
            Error::NameTooLong(n) => write!(f, "file name too long for archive: {n} bytes"),
            Error::Parse(s) => write!(f, "parse error: {s}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Error::Io(e) = self {
            Some(e)
        } else {
            None
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
