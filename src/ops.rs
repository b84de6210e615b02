//! Pure store transforms: (input store(s), params) -> (result store, stats) or a typed failure.
//!
//! Nothing here touches the filesystem or prints. File-level transactions live in
//! [`crate::db`] and call into these.

use serde::Serialize;

use crate::store::Store;

/// Statistics of [`add_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AddStats {
    /// Keys that were absent and got inserted.
    pub written: usize,
    /// Keys already present and kept as is (overwrite=false).
    pub omitted: usize,
    /// Keys already present whose value was replaced (overwrite=true).
    pub overwritten: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteStats {
    pub deleted: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CopyStats {
    pub records: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Keys taken from the second store that the first did not have.
    pub added: usize,
    /// Keys whose value changed because the second store won.
    pub overwritten: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreateStats {
    pub written: usize,
    /// Whether an existing destination got replaced.
    pub replaced: bool,
}

/// Strict read: values in request order, duplicates preserved.
/// All keys are checked first; on a miss the first absent key (request order) is returned
/// and no values are produced.
pub fn read_strict<'a, K: AsRef<[u8]>>(
    store: &'a Store,
    keys: &[K],
) -> Result<Vec<&'a [u8]>, Vec<u8>> {
    let mut out = Vec::with_capacity(keys.len());
    for k in keys {
        match store.get(k.as_ref()) {
            Some(v) => out.push(v),
            None => return Err(k.as_ref().to_vec()),
        }
    }
    Ok(out)
}

/// Lenient read: (key, value) for keys that exist, request order, duplicates preserved.
pub fn read_found<'a, 'k, K: AsRef<[u8]>>(
    store: &'a Store,
    keys: &'k [K],
) -> Vec<(&'k [u8], &'a [u8])> {
    keys.iter()
        .filter_map(|k| store.get(k.as_ref()).map(|v| (k.as_ref(), v)))
        .collect()
}

/// Add `data` on top of `existing`.
/// - absent key: written;
/// - present, !overwrite: omitted, existing value kept;
/// - present, overwrite: overwritten, new value adopted.
pub fn add_records(mut existing: Store, data: &Store, overwrite: bool) -> (Store, AddStats) {
    let mut st = AddStats::default();
    for (k, v) in data.iter() {
        if !existing.contains_key(k) {
            existing.insert(k.to_vec(), v.to_vec());
            st.written += 1;
        } else if overwrite {
            existing.insert(k.to_vec(), v.to_vec());
            st.overwritten += 1;
        } else {
            st.omitted += 1;
        }
    }
    (existing, st)
}

/// Remove `keys` from `original`. Repeats count once, absent keys are ignored.
pub fn delete_keys<K: AsRef<[u8]>>(mut original: Store, keys: &[K]) -> (Store, DeleteStats) {
    let mut st = DeleteStats::default();
    for k in keys {
        if original.remove(k.as_ref()).is_some() {
            st.deleted += 1;
        }
    }
    (original, st)
}

/// Keys present in both stores with different values, ascending.
pub fn contradictions(db1: &Store, db2: &Store) -> Vec<Vec<u8>> {
    db2.iter()
        .filter(|(k, v)| matches!(db1.get(k), Some(old) if old != *v))
        .map(|(k, _)| k.to_vec())
        .collect()
}

/// Union of two stores, `db2` winning on shared keys.
/// Without `overwrite` any disagreeing key is an error carrying all such keys.
/// Equal values on shared keys never conflict.
pub fn merge_stores(
    db1: Store,
    db2: &Store,
    overwrite: bool,
) -> Result<(Store, MergeStats), Vec<Vec<u8>>> {
    if !overwrite {
        let common = contradictions(&db1, db2);
        if !common.is_empty() {
            return Err(common);
        }
    }

    let mut out = db1;
    let mut st = MergeStats::default();
    for (k, v) in db2.iter() {
        match out.get(k) {
            None => st.added += 1,
            Some(old) if old != v => st.overwritten += 1,
            Some(_) => continue,
        }
        out.insert(k.to_vec(), v.to_vec());
    }
    Ok((out, st))
}
