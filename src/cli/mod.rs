//! CLI subcommand implementations for the `rowdb` binary.
//!
//! Argument parsing uses clap derive macros, with the top-level
//! [`app::Cli`] struct and [`app::Commands`] enum defined in [`app`].
//! Each subcommand module follows the same pattern: an `Options` struct
//! holding the parsed arguments and a
//! `pub fn execute(opts, writer) -> Result<(), RowdbError>` entry point.
//! The `writer: &mut dyn Write` parameter allows output to be captured
//! in tests or redirected to a file via the global `--output` flag.
//!
//! | Command | Module | Purpose |
//! |---------|--------|---------|
//! | `rowdb init` | [`init`] | Format the boot page and bootstrap the system catalog |
//! | `rowdb create-table` | [`create_table`] | Register a user table and its columns in the catalog |
//! | `rowdb insert` | [`insert`] | Insert one row into a named table |
//! | `rowdb scan` | [`scan`] | Print every row of a table (text or `--json`) |
//! | `rowdb info` | [`info`] | Show boot page fields and a catalog summary |
//!
//! Every subcommand reads the same configuration file (`rowdb.conf` by
//! default, `--config` to override), stands up a buffer manager on it,
//! does its work, and flushes before exiting. All user-visible output
//! happens here; the engine itself only emits `tracing` diagnostics.

pub mod app;
pub mod create_table;
pub mod info;
pub mod init;
pub mod insert;
pub mod scan;

/// Write a line to the given writer, converting io::Error to RowdbError.
macro_rules! wprintln {
    ($w:expr) => {
        writeln!($w).map_err(|e| $crate::RowdbError::Io(e.to_string()))
    };
    ($w:expr, $($arg:tt)*) => {
        writeln!($w, $($arg)*).map_err(|e| $crate::RowdbError::Io(e.to_string()))
    };
}

pub(crate) use wprintln;

use crate::engine::bufmgr::BufferManager;
use crate::engine::config::Config;
use crate::RowdbError;

/// Read the configuration file and stand up a buffer manager on it.
pub(crate) fn open_manager(config_path: &str) -> Result<(Config, BufferManager), RowdbError> {
    let config = Config::from_file(config_path)?;
    let buf = BufferManager::new(&config);
    Ok((config, buf))
}
