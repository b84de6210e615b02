//! File-level store operations.
//!
//! Each call is a single-shot transaction: load source(s) fully, validate, transform via
//! [`crate::ops`], then rewrite the destination. Any failure happens before the destination
//! is opened, so the destination is either untouched or fully rewritten.

use log::debug;
use std::path::Path;

use crate::config::KvConfig;
use crate::error::{KvError, Result};
use crate::fileio::{exists, load, load_or_empty, same_path, save};
use crate::ops::{self, AddStats, CopyStats, CreateStats, DeleteStats, MergeStats};
use crate::store::Store;

/// Result of a write operation that may legitimately do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T> {
    Applied(T),
    /// Empty delta with source == destination; no file was touched.
    NothingToDo,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(t) => Some(t),
            Outcome::NothingToDo => None,
        }
    }
}

/// Values of `keys` in request order. Fails with `MissingKey` on the first absent key,
/// before anything is returned.
pub fn read_keys<K: AsRef<[u8]>>(path: &Path, keys: &[K]) -> Result<Vec<Vec<u8>>> {
    let store = load(path)?;
    let vals = ops::read_strict(&store, keys).map_err(|key| KvError::MissingKey {
        path: path.to_path_buf(),
        key,
    })?;
    Ok(vals.into_iter().map(|v| v.to_vec()).collect())
}

/// (key, value) for the keys that exist, request order, duplicates preserved.
pub fn read_found_keys<K: AsRef<[u8]>>(path: &Path, keys: &[K]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    let store = load(path)?;
    Ok(ops::read_found(&store, keys)
        .into_iter()
        .map(|(k, v)| (k.to_vec(), v.to_vec()))
        .collect())
}

/// Write `data` as the whole content of `path`.
pub fn create(path: &Path, data: &Store, overwrite: bool, cfg: &KvConfig) -> Result<CreateStats> {
    let replaced = exists(path);
    if replaced && !overwrite {
        return Err(KvError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    save(path, data, cfg)?;
    debug!(
        "create {}: written={} replaced={}",
        path.display(),
        data.len(),
        replaced
    );
    Ok(CreateStats {
        written: data.len(),
        replaced,
    })
}

/// Add `data` to the store at `original` and save the result to `dest`.
///
/// When `dest` is `original`, a missing original starts out empty; otherwise it must exist.
pub fn add(
    original: &Path,
    dest: &Path,
    data: &Store,
    overwrite: bool,
    cfg: &KvConfig,
) -> Result<Outcome<AddStats>> {
    let in_place = same_path(original, dest);
    if data.is_empty() && in_place {
        return Ok(Outcome::NothingToDo);
    }

    let existing = if in_place {
        load_or_empty(original)?
    } else {
        load(original)?
    };
    let (result, st) = ops::add_records(existing, data, overwrite);
    save(dest, &result, cfg)?;
    debug!(
        "add {} -> {}: written={} omitted={} overwritten={}",
        original.display(),
        dest.display(),
        st.written,
        st.omitted,
        st.overwritten
    );
    Ok(Outcome::Applied(st))
}

/// Delete `keys` from the store at `original` and save the result to `dest`.
pub fn delete<K: AsRef<[u8]>>(
    original: &Path,
    dest: &Path,
    keys: &[K],
    cfg: &KvConfig,
) -> Result<Outcome<DeleteStats>> {
    if keys.is_empty() && same_path(original, dest) {
        return Ok(Outcome::NothingToDo);
    }

    let store = load(original)?;
    let (result, st) = ops::delete_keys(store, keys);
    save(dest, &result, cfg)?;
    debug!(
        "delete {} -> {}: deleted={}",
        original.display(),
        dest.display(),
        st.deleted
    );
    Ok(Outcome::Applied(st))
}

/// Copy the store at `from` to `to`. The source is decoded, so an invalid source is rejected.
pub fn copy(from: &Path, to: &Path, cfg: &KvConfig) -> Result<Outcome<CopyStats>> {
    if same_path(from, to) {
        return Ok(Outcome::NothingToDo);
    }
    let store = load(from)?;
    save(to, &store, cfg)?;
    debug!("copy {} -> {}: {} record(s)", from.display(), to.display(), store.len());
    Ok(Outcome::Applied(CopyStats {
        records: store.len(),
    }))
}

/// Merge `db1` and `db2` into `out`; `db2` wins on shared keys when `overwrite` is set.
/// Without `overwrite`, disagreeing shared keys fail with `Contradiction` and nothing is written.
pub fn merge(
    db1: &Path,
    db2: &Path,
    out: &Path,
    overwrite: bool,
    cfg: &KvConfig,
) -> Result<MergeStats> {
    let s1 = load(db1)?;
    let s2 = load(db2)?;
    let (result, st) =
        ops::merge_stores(s1, &s2, overwrite).map_err(|keys| KvError::Contradiction { keys })?;
    save(out, &result, cfg)?;
    debug!(
        "merge {} + {} -> {}: added={} overwritten={}",
        db1.display(),
        db2.display(),
        out.display(),
        st.added,
        st.overwritten
    );
    Ok(st)
}
