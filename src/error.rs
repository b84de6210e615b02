//! Error taxonomy for kvdb.
//!
//! Every failure is detected before the destination file is touched and reaches the
//! command layer as a distinct variant. `NothingToDo` is not an error: see
//! [`crate::db::Outcome`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a byte stream is not a valid store file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Stream ended inside a length prefix or a key/value body
    /// (a length prefix pointing past the end lands here too).
    #[error("truncated {what} at offset {offset}: need {needed} bytes, {available} left")]
    Truncated {
        offset: usize,
        what: &'static str,
        needed: usize,
        available: usize,
    },

    /// The same key appears twice in one file.
    #[error("duplicate key at offset {offset} ({} B)", .key.len())]
    DuplicateKey { offset: usize, key: Vec<u8> },
}

#[derive(Error, Debug)]
pub enum KvError {
    #[error("database at {} does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read database at {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write to database at {}: {source}", .path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("database at {} is not valid: {source}", .path.display())]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("database at {} already exists", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("database at {} doesn't contain key {:?}", .path.display(), String::from_utf8_lossy(.key))]
    MissingKey { path: PathBuf, key: Vec<u8> },

    /// Keys present in both merged stores with different values (ascending).
    #[error("{} key(s) have contradicting values", .keys.len())]
    Contradiction { keys: Vec<Vec<u8>> },

    /// A key or value does not fit into the u32 length prefix.
    #[error("record field of {len} B does not fit into a u32 length prefix")]
    RecordTooLarge { len: usize },
}

pub type Result<T> = std::result::Result<T, KvError>;
