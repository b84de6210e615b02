// src/fileio.rs — whole-file load/save of a store
//
// Политика:
// - Загрузка читает файл целиком и декодирует; NotFound отделяется от прочих ошибок чтения.
// - Запись по умолчанию атомарная: уникальный <dest>.<pid>-<nanos>-<n>.tmp (create_new) + rename,
//   затем fsync каталога (если включён fsync). Чужие файлы рядом с назначением не трогаются.
// - Если назначение — symlink, пишем в его цель, а не заменяем ссылку.
// - Источник всегда полностью в памяти до открытия назначения, поэтому src == dst безопасно.

use log::{debug, warn};
use std::ffi::OsString;
#[cfg(unix)]
use std::fs::File;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec;
use crate::config::KvConfig;
use crate::error::{KvError, Result};
use crate::store::Store;

#[cfg(unix)]
fn fsync_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

const TMP_ATTEMPTS: u32 = 16;

/// `<dest>.<pid>-<nanos>-<seq>.tmp`, unique per call within the process.
fn tmp_path(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name: OsString = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{}-{}-{}.tmp", std::process::id(), nanos, seq));
    path.with_file_name(name)
}

/// Symlinked destinations are written through to their target.
fn resolve_dest(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(m) if m.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(target) => target,
            // dangling link: replace the link itself
            Err(_) => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Read and decode the store at `path`.
pub fn load(path: &Path) -> Result<Store> {
    let buf = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => KvError::NotFound {
            path: path.to_path_buf(),
        },
        _ => KvError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    let store = codec::decode(&buf).map_err(|e| KvError::InvalidFormat {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("load {}: {} B, {} record(s)", path.display(), buf.len(), store.len());
    Ok(store)
}

/// Like [`load`], but a missing file is an empty store.
pub fn load_or_empty(path: &Path) -> Result<Store> {
    match load(path) {
        Err(KvError::NotFound { .. }) => {
            debug!("load {}: absent, starting empty", path.display());
            Ok(Store::new())
        }
        other => other,
    }
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Lexically equal, or the same file once both are canonicalized.
pub fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

/// Encode `store` and replace the whole content of `path`.
pub fn save(path: &Path, store: &Store, cfg: &KvConfig) -> Result<()> {
    let bytes = codec::encode(store)?;
    let unwritable = |e: io::Error| KvError::Unwritable {
        path: path.to_path_buf(),
        source: e,
    };

    if cfg.create_parents {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(unwritable)?;
            }
        }
    }

    if cfg.atomic_write {
        write_atomic(path, &bytes, cfg.fsync).map_err(unwritable)?;
    } else {
        write_direct(path, &bytes, cfg.fsync).map_err(unwritable)?;
    }
    debug!(
        "save {}: {} B, {} record(s), atomic={}",
        path.display(),
        bytes.len(),
        store.len(),
        cfg.atomic_write
    );
    Ok(())
}

fn write_direct(path: &Path, bytes: &[u8], fsync: bool) -> io::Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(bytes)?;
    if fsync {
        f.sync_all()?;
    }
    Ok(())
}

/// Create a fresh tmp file next to `path`; never opens an existing file.
fn create_tmp(path: &Path) -> io::Result<(PathBuf, fs::File)> {
    let mut last = None;
    for _ in 0..TMP_ATTEMPTS {
        let tmp = tmp_path(path);
        match OpenOptions::new().write(true).create_new(true).open(&tmp) {
            Ok(f) => return Ok((tmp, f)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => last = Some(e),
            Err(e) => return Err(e),
        }
    }
    Err(last.unwrap_or_else(|| io::Error::from(io::ErrorKind::AlreadyExists)))
}

fn fill_tmp(mut f: fs::File, bytes: &[u8], fsync: bool) -> io::Result<()> {
    f.write_all(bytes)?;
    if fsync {
        f.sync_all()?;
    }
    Ok(())
}

fn write_atomic(dest: &Path, bytes: &[u8], fsync: bool) -> io::Result<()> {
    let path = resolve_dest(dest);
    let path = path.as_path();
    let (tmp, f) = create_tmp(path)?;

    let res = fill_tmp(f, bytes, fsync).and_then(|_| fs::rename(&tmp, path));
    if let Err(e) = res {
        if let Err(rm) = fs::remove_file(&tmp) {
            if rm.kind() != io::ErrorKind::NotFound {
                warn!("remove {}: {}", tmp.display(), rm);
            }
        }
        return Err(e);
    }

    if fsync {
        if let Err(e) = fsync_dir(path) {
            warn!("fsync dir of {}: {}", path.display(), e);
        }
    }
    Ok(())
}
