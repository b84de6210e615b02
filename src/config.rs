//! Configuration for kvdb write paths.
//!
//! - Single place for tunables; `KvConfig::from_env()` reads the KVDB_* env vars.
//! - Builder-style `with_*` setters for library users and tests.
//!
//! Defaults:
//! - atomic_write = true (tmp + rename, destination is either fully old or fully new)
//! - fsync = false
//! - create_parents = true (missing parent directories of the destination are created)

use std::fmt;

#[derive(Clone, Debug)]
pub struct KvConfig {
    /// Rewrite the destination through `<dest>.tmp` + rename.
    /// Env: KVDB_ATOMIC_WRITE (default true)
    pub atomic_write: bool,

    /// `sync_all` the written file (and, for atomic writes, the parent dir on unix).
    /// Env: KVDB_FSYNC (default false)
    pub fsync: bool,

    /// Create missing parent directories of the destination.
    /// Env: KVDB_CREATE_PARENTS (default true)
    pub create_parents: bool,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            atomic_write: true,
            fsync: false,
            create_parents: true,
        }
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| parse_flag(&v))
}

impl KvConfig {
    /// Defaults overridden by env. Unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(on) = env_flag("KVDB_ATOMIC_WRITE") {
            cfg.atomic_write = on;
        }
        if let Some(on) = env_flag("KVDB_FSYNC") {
            cfg.fsync = on;
        }
        if let Some(on) = env_flag("KVDB_CREATE_PARENTS") {
            cfg.create_parents = on;
        }
        cfg
    }

    pub fn with_atomic_write(mut self, on: bool) -> Self {
        self.atomic_write = on;
        self
    }

    pub fn with_fsync(mut self, on: bool) -> Self {
        self.fsync = on;
        self
    }

    pub fn with_create_parents(mut self, on: bool) -> Self {
        self.create_parents = on;
        self
    }
}

impl fmt::Display for KvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KvConfig {{ atomic_write: {}, fsync: {}, create_parents: {} }}",
            self.atomic_write, self.fsync, self.create_parents
        )
    }
}
