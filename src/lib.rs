// Формат и алгоритмы
pub mod codec;  // src/codec.rs: u32le-prefixed key/value records
pub mod store;  // src/store.rs: in-memory mapping
pub mod ops;    // src/ops.rs: pure add/delete/merge/read transforms

// Файловый слой
pub mod fileio; // src/fileio.rs: load/save, atomic rewrite
pub mod db;     // src/db.rs: read/create/add/delete/copy/merge transactions

pub mod config;
pub mod error;

// Командный слой (clap), вывод в явный sink
pub mod cli;    // src/cli.rs + src/cli/{args,db_cli,report}.rs

// Удобные реэкспорты
pub use config::KvConfig;
pub use db::Outcome;
pub use error::{DecodeError, KvError};
pub use ops::{AddStats, CopyStats, CreateStats, DeleteStats, MergeStats};
pub use store::Store;
