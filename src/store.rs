//! In-memory store: unique byte-string keys mapped to byte-string values.
//!
//! Lives for one command invocation only (decoded, transformed, encoded, dropped).
//! Backed by a BTreeMap so the on-disk record order is deterministic.

use std::collections::btree_map::{self, BTreeMap};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

/// A key given twice with different values while building a store from pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictingPair {
    pub key: Vec<u8>,
    pub first: Vec<u8>,
    pub second: Vec<u8>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from (key, value) pairs.
    /// An exact repeat of a pair collapses; the same key with another value is rejected.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConflictingPair>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Vec<u8>>,
        V: Into<Vec<u8>>,
    {
        let mut map: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
        for (k, v) in pairs {
            let (k, v) = (k.into(), v.into());
            match map.entry(k) {
                btree_map::Entry::Vacant(e) => {
                    e.insert(v);
                }
                btree_map::Entry::Occupied(e) => {
                    if *e.get() != v {
                        return Err(ConflictingPair {
                            key: e.key().clone(),
                            first: e.get().clone(),
                            second: v,
                        });
                    }
                }
            }
        }
        Ok(Self { map })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.map.get(key).map(|v| v.as_slice())
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    /// Insert or replace. Returns the previous value, if any.
    pub fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) -> Option<Vec<u8>> {
        self.map.insert(key, value)
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        self.map.remove(key)
    }

    /// Records in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.map.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.map.keys().map(|k| k.as_slice())
    }
}

impl IntoIterator for Store {
    type Item = (Vec<u8>, Vec<u8>);
    type IntoIter = btree_map::IntoIter<Vec<u8>, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_collapses_exact_repeats() {
        let s = Store::from_pairs([("k1", "v1"), ("k2", "v1"), ("k1", "v1")]).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(b"k1"), Some(&b"v1"[..]));
        assert_eq!(s.get(b"k2"), Some(&b"v1"[..]));
    }

    #[test]
    fn from_pairs_rejects_contradicting_values() {
        let err = Store::from_pairs([("k1", "v1"), ("k1", "v2")]).unwrap_err();
        assert_eq!(err.key, b"k1");
        assert_eq!(err.first, b"v1");
        assert_eq!(err.second, b"v2");
    }

    #[test]
    fn iteration_is_key_ordered() {
        let s = Store::from_pairs([("b", "2"), ("", "0"), ("a", "1")]).unwrap();
        let keys: Vec<&[u8]> = s.keys().collect();
        assert_eq!(keys, vec![&b""[..], &b"a"[..], &b"b"[..]]);
    }
}
