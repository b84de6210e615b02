use anyhow::Result;
use serde_json::json;
use std::io::Write;
use std::path::Path;

use crate::config::KvConfig;
use crate::db::{self, Outcome};

use super::args::parse_pairs;
use super::report;

/// Raw bytes of `line`, then a newline.
fn write_line(out: &mut dyn Write, line: &[u8]) -> Result<()> {
    out.write_all(line)?;
    out.write_all(b"\n")?;
    Ok(())
}

fn write_nothing_to_do(out: &mut dyn Write, op: &str, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", json!({ "op": op, "nothing_to_do": true }))?;
    } else {
        writeln!(out, "{}", report::NOTHING_TO_DO)?;
    }
    Ok(())
}

/// Values, one per line. Nothing is printed if any key is missing.
pub fn cmd_read(out: &mut dyn Write, path: &Path, keys: &[String]) -> Result<()> {
    let vals = db::read_keys(path, keys)?;
    for v in &vals {
        write_line(out, v)?;
    }
    Ok(())
}

/// Key line then value line, for every requested key that exists.
pub fn cmd_read_found(out: &mut dyn Write, path: &Path, keys: &[String]) -> Result<()> {
    for (k, v) in db::read_found_keys(path, keys)? {
        write_line(out, &k)?;
        write_line(out, &v)?;
    }
    Ok(())
}

pub fn cmd_create(
    out: &mut dyn Write,
    cfg: &KvConfig,
    path: &Path,
    pairs: &[String],
    overwrite: bool,
    json: bool,
) -> Result<()> {
    let data = parse_pairs(pairs)?;
    let st = db::create(path, &data, overwrite, cfg)?;
    if json {
        writeln!(
            out,
            "{}",
            json!({ "op": "create", "dest": path.display().to_string(), "stats": st })
        )?;
    } else {
        writeln!(out, "{}", report::written_line(st.written, path))?;
    }
    Ok(())
}

pub fn cmd_add(
    out: &mut dyn Write,
    cfg: &KvConfig,
    original: &Path,
    dest: &Path,
    pairs: &[String],
    overwrite: bool,
    json: bool,
) -> Result<()> {
    let data = parse_pairs(pairs)?;
    let st = match db::add(original, dest, &data, overwrite, cfg)? {
        Outcome::Applied(st) => st,
        Outcome::NothingToDo => return write_nothing_to_do(out, "add", json),
    };

    if json {
        writeln!(
            out,
            "{}",
            json!({ "op": "add", "dest": dest.display().to_string(), "stats": st })
        )?;
        return Ok(());
    }

    // -o: overwritten records are reported as part of the written ones
    let total = st.written + st.overwritten;
    writeln!(out, "{}", report::written_line(total, dest))?;
    if st.overwritten > 0 {
        writeln!(out, "{}", report::overwritten_line(st.overwritten))?;
    }
    if st.omitted > 0 {
        writeln!(out, "{}", report::omitted_line(st.omitted))?;
    }
    Ok(())
}

pub fn cmd_delete(
    out: &mut dyn Write,
    cfg: &KvConfig,
    original: &Path,
    dest: &Path,
    keys: &[String],
    json: bool,
) -> Result<()> {
    let st = match db::delete(original, dest, keys, cfg)? {
        Outcome::Applied(st) => st,
        Outcome::NothingToDo => return write_nothing_to_do(out, "delete", json),
    };
    if json {
        writeln!(
            out,
            "{}",
            json!({ "op": "delete", "dest": dest.display().to_string(), "stats": st })
        )?;
    } else {
        writeln!(out, "{}", report::deleted_line(st.deleted, dest))?;
    }
    Ok(())
}

pub fn cmd_copy(out: &mut dyn Write, cfg: &KvConfig, from: &Path, to: &Path, json: bool) -> Result<()> {
    let st = match db::copy(from, to, cfg)? {
        Outcome::Applied(st) => st,
        Outcome::NothingToDo => return write_nothing_to_do(out, "copy", json),
    };
    if json {
        writeln!(
            out,
            "{}",
            json!({ "op": "copy", "dest": to.display().to_string(), "stats": st })
        )?;
    } else {
        writeln!(out, "{}", report::copied_line(st.records, from, to))?;
    }
    Ok(())
}

pub fn cmd_merge(
    out: &mut dyn Write,
    cfg: &KvConfig,
    db1: &Path,
    db2: &Path,
    dest: &Path,
    overwrite: bool,
    json: bool,
) -> Result<()> {
    let st = db::merge(db1, db2, dest, overwrite, cfg)?;
    if json {
        writeln!(
            out,
            "{}",
            json!({ "op": "merge", "dest": dest.display().to_string(), "stats": st })
        )?;
    } else {
        writeln!(out, "{}", report::merged_line(st.added, st.overwritten, dest))?;
    }
    Ok(())
}
