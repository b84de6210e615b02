use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use kvdb::cli::{self, report};
use kvdb::fileio::load;
use kvdb::{KvConfig, Store};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let root = std::env::temp_dir().join(format!("kvdbtest-cli-{prefix}-{pid}-{t}-{id}"));
    fs::create_dir_all(&root).unwrap();
    root
}

/// Run the command layer with a captured sink; returns (exit code, output).
fn kvdb(args: &[&str]) -> (i32, String) {
    let mut sink: Vec<u8> = Vec::new();
    let argv = std::iter::once("kvdb").chain(args.iter().copied());
    let code = cli::run(argv, &KvConfig::default(), &mut sink);
    (code, String::from_utf8(sink).unwrap())
}

fn p(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn create_then_read() -> Result<()> {
    let root = unique_root("create-read");
    let db = root.join("db.db");

    let (code, out) = kvdb(&["create", p(&db), "foo", "bar", "", "empty", "zero", "0"]);
    assert_eq!(code, report::EXIT_OK, "{}", out);
    assert!(out.contains("Successfully written 3 records"));

    let (code, out) = kvdb(&["read", p(&db), "foo", "zero", "foo", ""]);
    assert_eq!(code, report::EXIT_OK);
    assert_eq!(out, "bar\n0\nbar\nempty\n");

    let (code, out) = kvdb(&["create", p(&db), "x", "y"]);
    assert_eq!(code, report::EXIT_ALREADY_EXISTS);
    assert!(out.contains("already exists"));

    let (code, _) = kvdb(&["create", "-o", p(&db), "x", "y"]);
    assert_eq!(code, report::EXIT_OK);
    assert_eq!(load(&db)?, Store::from_pairs([("x", "y")]).unwrap());

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn strict_read_prints_nothing_on_missing_key() -> Result<()> {
    let root = unique_root("read-missing");
    let db = root.join("db.db");
    kvdb(&["c", p(&db), "a", "1", "b", "2"]);

    let (code, out) = kvdb(&["r", p(&db), "a", "missing", "b"]);
    assert_eq!(code, report::EXIT_MISSING_KEY);
    assert_eq!(
        out,
        format!("Database at \"{}\" doesn't contain the key \"missing\"!\n", db.display())
    );

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn read_found_prints_key_value_lines() -> Result<()> {
    let root = unique_root("read-found");
    let db = root.join("db.db");
    kvdb(&["create", p(&db), "2", "two", "4", "four", "5", "five"]);

    let (code, out) = kvdb(&["read-found", p(&db), "1", "2", "1", "3", "4", "5"]);
    assert_eq!(code, report::EXIT_OK);
    assert_eq!(out, "2\ntwo\n4\nfour\n5\nfive\n");

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn add_reports_written_and_omitted() -> Result<()> {
    let root = unique_root("add");
    let db = root.join("db.db");
    kvdb(&["create", p(&db), "1", "1", "2", "2"]);

    let (code, out) = kvdb(&["add", p(&db), "!", "1", "3", "3", "3"]);
    assert_eq!(code, report::EXIT_OK);
    assert!(out.contains("Successfully written 1 records"), "{}", out);
    assert!(out.contains("1 records were omitted"), "{}", out);
    assert_eq!(
        load(&db)?,
        Store::from_pairs([("1", "1"), ("2", "2"), ("3", "3")]).unwrap()
    );

    let (code, out) = kvdb(&["add", p(&db), "!"]);
    assert_eq!(code, report::EXIT_OK);
    assert_eq!(out, "Nothing to do.\n");

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn add_json_output() -> Result<()> {
    let root = unique_root("add-json");
    let db = root.join("db.db");
    kvdb(&["create", p(&db), "1", "1"]);

    let (code, out) = kvdb(&["add", "-o", "--json", p(&db), "!", "1", "2", "9", "9"]);
    assert_eq!(code, report::EXIT_OK);
    let v: serde_json::Value = serde_json::from_str(out.trim())?;
    assert_eq!(v["op"], "add");
    assert_eq!(v["stats"]["written"], 1);
    assert_eq!(v["stats"]["overwritten"], 1);
    assert_eq!(v["stats"]["omitted"], 0);

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn contradicting_arguments_are_usage_errors() -> Result<()> {
    let root = unique_root("usage");
    let db = root.join("db.db");

    let (code, _) = kvdb(&["create", p(&db), "k", "v1", "k", "v2"]);
    assert_eq!(code, report::EXIT_USAGE);
    assert!(!db.exists());

    let (code, _) = kvdb(&["create", p(&db), "k", "v", "dangling"]);
    assert_eq!(code, report::EXIT_USAGE);

    let (code, _) = kvdb(&["create", p(&db), "k", "v", "k", "v"]);
    assert_eq!(code, report::EXIT_OK);

    let (code, _) = kvdb(&["merge", p(&db), p(&db)]);
    assert_eq!(code, report::EXIT_USAGE);

    let (code, _) = kvdb(&[]);
    assert_eq!(code, report::EXIT_USAGE);

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn delete_copy_merge_flow() -> Result<()> {
    let root = unique_root("flow");
    let a = root.join("a.db");
    let b = root.join("b.db");
    let out = root.join("out.db");

    kvdb(&["create", p(&a), "1", "2", "2", "1", "3", "3"]);
    let (code, msg) = kvdb(&["delete", p(&a), p(&b), "1", "1", "x"]);
    assert_eq!(code, report::EXIT_OK);
    assert!(msg.contains("Deleted 1 records"), "{}", msg);

    let (code, _) = kvdb(&["cp", p(&b), "!"]);
    assert_eq!(code, report::EXIT_OK);

    kvdb(&["add", "-o", p(&b), "!", "3", "30"]);
    let (code, msg) = kvdb(&["merge", p(&a), p(&b), p(&out)]);
    assert_eq!(code, report::EXIT_CONTRADICTION);
    assert!(msg.contains("\"3\""), "{}", msg);
    assert!(!out.exists());

    let (code, _) = kvdb(&["merge", "-o", p(&a), p(&b), "!!"]);
    assert_eq!(code, report::EXIT_OK);
    assert_eq!(
        load(&b)?,
        Store::from_pairs([("1", "2"), ("2", "1"), ("3", "30")]).unwrap()
    );

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn invalid_and_missing_databases_have_own_codes() -> Result<()> {
    let root = unique_root("codes");
    let bad = root.join("bad.db");
    fs::write(&bad, [1u8, 0, 0, 0, b'k'])?;

    let (code, out) = kvdb(&["read", p(&bad), "k"]);
    assert_eq!(code, report::EXIT_INVALID);
    assert!(out.contains("is not valid"));

    let (code, out) = kvdb(&["read", p(&root.join("none.db"))]);
    assert_eq!(code, report::EXIT_NOT_FOUND);
    assert!(out.contains("does not exist"));

    let (code, out) = kvdb(&["read", p(&root), "k"]);
    assert_eq!(code, report::EXIT_UNREADABLE);
    assert!(out.contains("Cannot read database"), "{}", out);

    fs::remove_dir_all(&root)?;
    Ok(())
}
