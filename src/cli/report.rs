//! User-facing messages and exit codes.
//!
//! Exit codes:
//! 0 success (including "nothing to do"), 1 other failure, 2 usage,
//! 3 not found, 4 unreadable, 5 unwritable, 6 invalid format,
//! 7 already exists, 8 missing key, 9 contradiction.

use std::path::Path;

use super::args::UsageError;
use crate::error::KvError;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;
pub const EXIT_UNREADABLE: i32 = 4;
pub const EXIT_UNWRITABLE: i32 = 5;
pub const EXIT_INVALID: i32 = 6;
pub const EXIT_ALREADY_EXISTS: i32 = 7;
pub const EXIT_MISSING_KEY: i32 = 8;
pub const EXIT_CONTRADICTION: i32 = 9;

pub const NOTHING_TO_DO: &str = "Nothing to do.";

fn quoted(p: &Path) -> String {
    format!("\"{}\"", p.display())
}

fn lossy(b: &[u8]) -> String {
    String::from_utf8_lossy(b).into_owned()
}

pub fn exit_code(e: &KvError) -> i32 {
    match e {
        KvError::NotFound { .. } => EXIT_NOT_FOUND,
        KvError::Unreadable { .. } => EXIT_UNREADABLE,
        KvError::Unwritable { .. } | KvError::RecordTooLarge { .. } => EXIT_UNWRITABLE,
        KvError::InvalidFormat { .. } => EXIT_INVALID,
        KvError::AlreadyExists { .. } => EXIT_ALREADY_EXISTS,
        KvError::MissingKey { .. } => EXIT_MISSING_KEY,
        KvError::Contradiction { .. } => EXIT_CONTRADICTION,
    }
}

pub fn message(e: &KvError) -> String {
    match e {
        KvError::NotFound { path } => format!("Database at {} does not exist!", quoted(path)),
        KvError::Unreadable { path, .. } => format!("Cannot read database at {}!", quoted(path)),
        KvError::Unwritable { path, .. } => {
            format!("Cannot write to database at {}!", quoted(path))
        }
        KvError::InvalidFormat { path, .. } => {
            format!("Database at {} is not valid!", quoted(path))
        }
        KvError::AlreadyExists { path } => format!(
            "Database at {} already exists! Use -o or --overwrite to allow overwriting the database.",
            quoted(path)
        ),
        KvError::MissingKey { path, key } => format!(
            "Database at {} doesn't contain the key \"{}\"!",
            quoted(path),
            lossy(key)
        ),
        KvError::Contradiction { keys } => {
            let list: Vec<String> = keys.iter().map(|k| format!("\"{}\"", lossy(k))).collect();
            format!(
                "Databases contradict each other on {} key(s): {}. Use -o or --overwrite to let the second database win.",
                keys.len(),
                list.join(", ")
            )
        }
        KvError::RecordTooLarge { len } => {
            format!("Record of {} bytes is too large to be stored!", len)
        }
    }
}

/// Message and exit code for any failure coming out of a command.
pub fn describe_failure(e: &anyhow::Error) -> (String, i32) {
    if let Some(kv) = e.downcast_ref::<KvError>() {
        return (message(kv), exit_code(kv));
    }
    if let Some(u) = e.downcast_ref::<UsageError>() {
        return (
            format!("Incorrect arguments: {}. Please use -h or --help option to see help message.", u),
            EXIT_USAGE,
        );
    }
    (format!("error: {:#}", e), EXIT_FAILURE)
}

pub fn written_line(n: usize, dest: &Path) -> String {
    format!("Successfully written {} records to database at {}.", n, quoted(dest))
}

pub fn omitted_line(n: usize) -> String {
    format!("{} records were omitted, as database already contains their keys.", n)
}

pub fn overwritten_line(n: usize) -> String {
    format!("{} of those records overwrote the data.", n)
}

pub fn deleted_line(n: usize, dest: &Path) -> String {
    format!("Deleted {} records, result saved to database at {}.", n, quoted(dest))
}

pub fn copied_line(n: usize, from: &Path, to: &Path) -> String {
    format!(
        "Copied {} records from database at {} to {}.",
        n,
        quoted(from),
        quoted(to)
    )
}

pub fn merged_line(added: usize, overwritten: usize, out: &Path) -> String {
    format!(
        "Merged databases into {}: {} records added, {} records overwritten.",
        quoted(out),
        added,
        overwritten
    )
}
