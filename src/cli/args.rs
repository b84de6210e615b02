//! Argument helpers: KEY VALUE lists and destination placeholders.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::store::Store;

/// Destination placeholder: "same as the first database".
pub const SAME_AS_FIRST: &str = "!";
/// Merge output placeholder: "same as the second database".
pub const SAME_AS_SECOND: &str = "!!";

/// Arguments that clap accepted but that make no sense together.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Turn `k1 v1 k2 v2 ...` into a store.
/// Repeating a pair collapses; repeating a key with another value is a usage error.
pub fn parse_pairs(args: &[String]) -> Result<Store, UsageError> {
    if args.len() % 2 != 0 {
        return Err(UsageError(format!(
            "expected KEY VALUE pairs, got {} argument(s); value for key \"{}\" is missing",
            args.len(),
            args[args.len() - 1]
        )));
    }
    let pairs = args
        .chunks_exact(2)
        .map(|kv| (kv[0].as_bytes().to_vec(), kv[1].as_bytes().to_vec()));
    Store::from_pairs(pairs).map_err(|c| {
        UsageError(format!(
            "contradicting arguments: key \"{}\" is given values \"{}\" and \"{}\"",
            String::from_utf8_lossy(&c.key),
            String::from_utf8_lossy(&c.first),
            String::from_utf8_lossy(&c.second)
        ))
    })
}

/// `!` means "write back to the first database".
pub fn resolve_dest(first: &Path, dest: &str) -> PathBuf {
    if dest == SAME_AS_FIRST {
        first.to_path_buf()
    } else {
        PathBuf::from(dest)
    }
}

/// `!` means the first database, `!!` the second one.
pub fn resolve_merge_out(db1: &Path, db2: &Path, out: &str) -> PathBuf {
    match out {
        SAME_AS_FIRST => db1.to_path_buf(),
        SAME_AS_SECOND => db2.to_path_buf(),
        other => PathBuf::from(other),
    }
}
