use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use crate::config::KvConfig;

pub mod args;
pub mod db_cli;
pub mod report;

#[derive(Parser, Debug)]
#[command(
    name = "kvdb",
    version,
    about = "Simple console key-value database stored in a single file",
    arg_required_else_help = true,
    after_help = "In add, delete and copy DB2 can be replaced with \"!\" to write the result back to DB1.\n\
                  In merge OUT can be \"!\" (DB1) or \"!!\" (DB2)."
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print values of the given keys, one per line (fails if any key is absent)
    #[command(visible_alias = "r")]
    Read {
        db: PathBuf,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        keys: Vec<String>,
    },
    /// Print key and value lines for the given keys that exist
    #[command(visible_alias = "rf")]
    ReadFound {
        db: PathBuf,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        keys: Vec<String>,
    },
    /// Create a new database with the given KEY VALUE pairs
    #[command(visible_alias = "c")]
    Create {
        /// Replace an already existing database
        #[arg(short, long, default_value_t = false)]
        overwrite: bool,
        /// JSON output
        #[arg(long, default_value_t = false)]
        json: bool,
        db: PathBuf,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        pairs: Vec<String>,
    },
    /// Add KEY VALUE pairs to DB1 and save the result to DB2
    ///
    /// Records whose keys are already present in DB1 are omitted unless --overwrite is set.
    #[command(visible_alias = "a")]
    Add {
        /// New values replace existing ones
        #[arg(short, long, default_value_t = false)]
        overwrite: bool,
        #[arg(long, default_value_t = false)]
        json: bool,
        db1: PathBuf,
        db2: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        pairs: Vec<String>,
    },
    /// Delete keys from DB1 and save the result to DB2
    #[command(visible_alias = "d")]
    Delete {
        #[arg(long, default_value_t = false)]
        json: bool,
        db1: PathBuf,
        db2: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        keys: Vec<String>,
    },
    /// Copy DB1 to DB2
    #[command(visible_alias = "cp")]
    Copy {
        #[arg(long, default_value_t = false)]
        json: bool,
        db1: PathBuf,
        db2: String,
    },
    /// Merge DB1 and DB2 into OUT
    ///
    /// Shared keys with different values are an error unless --overwrite is set,
    /// in which case DB2 wins.
    #[command(visible_alias = "m")]
    Merge {
        #[arg(short, long, default_value_t = false)]
        overwrite: bool,
        #[arg(long, default_value_t = false)]
        json: bool,
        db1: PathBuf,
        db2: PathBuf,
        out: String,
    },
}

/// Entry point used by the binary: env config, process args, stdout.
pub fn main_exit_code() -> i32 {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = run(std::env::args_os(), &KvConfig::from_env(), &mut out);
    let _ = out.flush();
    code
}

/// Parse `args` (program name first), execute, write all user-facing output to `out`,
/// and return the exit code. Never exits the process.
pub fn run<I, T>(args: I, cfg: &KvConfig, out: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(c) => c,
        Err(e) => {
            let _ = write!(out, "{}", e.render());
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => report::EXIT_OK,
                _ => report::EXIT_USAGE,
            };
        }
    };

    match execute(cli.cmd, cfg, out) {
        Ok(()) => report::EXIT_OK,
        Err(e) => {
            let (msg, code) = report::describe_failure(&e);
            let _ = writeln!(out, "{}", msg);
            code
        }
    }
}

fn execute(cmd: Cmd, cfg: &KvConfig, out: &mut dyn Write) -> Result<()> {
    match cmd {
        Cmd::Read { db, keys } => db_cli::cmd_read(out, &db, &keys),
        Cmd::ReadFound { db, keys } => db_cli::cmd_read_found(out, &db, &keys),
        Cmd::Create {
            overwrite,
            json,
            db,
            pairs,
        } => db_cli::cmd_create(out, cfg, &db, &pairs, overwrite, json),
        Cmd::Add {
            overwrite,
            json,
            db1,
            db2,
            pairs,
        } => {
            let dest = args::resolve_dest(&db1, &db2);
            db_cli::cmd_add(out, cfg, &db1, &dest, &pairs, overwrite, json)
        }
        Cmd::Delete {
            json,
            db1,
            db2,
            keys,
        } => {
            let dest = args::resolve_dest(&db1, &db2);
            db_cli::cmd_delete(out, cfg, &db1, &dest, &keys, json)
        }
        Cmd::Copy { json, db1, db2 } => {
            let dest = args::resolve_dest(&db1, &db2);
            db_cli::cmd_copy(out, cfg, &db1, &dest, json)
        }
        Cmd::Merge {
            overwrite,
            json,
            db1,
            db2,
            out: out_db,
        } => {
            let dest = args::resolve_merge_out(&db1, &db2, &out_db);
            db_cli::cmd_merge(out, cfg, &db1, &db2, &dest, overwrite, json)
        }
    }
}
