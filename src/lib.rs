//! Row-oriented heap storage engine.
//!
//! The `rowdb` crate implements the storage core of a small relational
//! database: a single heap file of fixed-size slotted pages, an in-memory
//! page cache with pin-based eviction, and a self-describing catalog
//! (`_tables`, `_columns`, `_sequences`) stored in the same paged heap as
//! user data.
//!
//! # Quick example
//!
//! ```no_run
//! use rowdb::engine::access;
//! use rowdb::engine::bufmgr::BufferManager;
//! use rowdb::engine::config::Config;
//! use rowdb::engine::datum::{DataType, Datum};
//! use rowdb::engine::record::Column;
//! use rowdb::engine::{bootstrap, catalog};
//!
//! let config = Config::new("people.rdb", 4096, 16);
//! let mut buf = BufferManager::new(&config);
//!
//! // Create the boot page and system catalog on first run.
//! bootstrap::initdb(&mut buf).unwrap();
//!
//! // Register a user table and insert a row.
//! let columns = vec![
//!     Column::new("person_id", DataType::Int, 0, 4, true),
//!     Column::new("name", DataType::VarChar, 1, 20, false),
//! ];
//! catalog::create_table(&mut buf, "person", &columns).unwrap();
//!
//! let td = access::load_table_desc(&mut buf, "person").unwrap().unwrap();
//! access::insert(
//!     &mut buf,
//!     &td,
//!     &[Some(Datum::Int(1)), Some(Datum::VarChar("Ada".into()))],
//! )
//! .unwrap();
//!
//! for row in access::fullscan(&mut buf, &td).unwrap() {
//!     println!("{:?}", row);
//! }
//! buf.flush_all().unwrap();
//! ```
//!
//! # Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`engine::config`] | Configuration file reader and the immutable [`Config`](engine::config::Config) snapshot |
//! | [`engine::constants`] | On-disk layout constants (page header, record header, boot page) |
//! | [`engine::datum`] | Typed column values and the data-type enumeration |
//! | [`engine::record`] | Row serialization: fixed/variable columns and the null bitmap |
//! | [`engine::page`] | Slotted-page layout and the page insert primitive |
//! | [`engine::file`] | File registry: file-id to OS handle mapping, page-id allocation |
//! | [`engine::pool`] | Page frames and raw page I/O |
//! | [`engine::descriptor`] | Per-frame metadata: tag, pin/use counters, dirty/valid flags |
//! | [`engine::bufmgr`] | The buffer manager: lookup, load, pin, evict, allocate, split |
//! | [`engine::boot`] | Boot page (page 1): version and page-size fields |
//! | [`engine::catalog`] | System tables: scans, point updates, sequences, table creation |
//! | [`engine::bootstrap`] | `initdb`: boot page and catalog bootstrap |
//! | [`engine::access`] | Full scan and insert over a named user table |
//!
//! # CLI
//!
//! The `rowdb` binary (feature `cli`, on by default) drives the engine from
//! the command line: `rowdb init`, `rowdb create-table`, `rowdb insert`,
//! `rowdb scan`, and `rowdb info`. All subcommands read the same
//! configuration file (`rowdb.conf` by default, `--config` to override).

#[cfg(feature = "cli")]
pub mod cli;
pub mod engine;

use thiserror::Error;

/// Errors returned by `rowdb` operations.
#[derive(Error, Debug)]
pub enum RowdbError {
    /// The configuration file is missing, unreadable, or invalid.
    #[error("config error: {0}")]
    Config(String),

    /// An I/O error occurred (file open, read, seek, or write failure).
    #[error("I/O error: {0}")]
    Io(String),

    /// Malformed on-disk data or an inconsistent in-memory structure.
    #[error("parse error: {0}")]
    Parse(String),

    /// A page read moved fewer than `page_size` bytes. Reads past the end
    /// of the file land here: pages come into existence only through the
    /// buffer manager's allocate path, never lazily on read.
    #[error("short read on page {page_id} of file {file_id}: {got} of {expected} bytes")]
    ShortRead {
        file_id: u32,
        page_id: u32,
        got: usize,
        expected: usize,
    },

    /// A page write moved fewer than `page_size` bytes.
    #[error("short write on page {page_id} of file {file_id}: {got} of {expected} bytes")]
    ShortWrite {
        file_id: u32,
        page_id: u32,
        got: usize,
        expected: usize,
    },

    /// Eviction found no unpinned frame to reclaim.
    #[error("no evictable frame: all {0} buffer frames are pinned")]
    NoVictim(usize),

    /// `page_split` was invoked on a page that is not the tail of its chain.
    #[error("cannot split page {0}: it is not the last page of its chain")]
    SplitUnsupported(u32),

    /// The record decoder met a data-type code it does not recognize.
    #[error("unknown data type code: {0}")]
    UnknownDataType(u8),

    /// No backing file is registered for the given file id.
    #[error("unknown file id: {0}")]
    UnknownFileId(u32),

    /// Page id 0 is the "no page" sentinel and is never addressable.
    #[error("page id {0} is not addressable")]
    BadPageId(u32),

    /// `create_table` was asked to create a table that already exists.
    #[error("table {0} already exists")]
    DuplicateTable(String),

    /// An operation required a table that has no catalog entry.
    #[error("no catalog entry for table {0}")]
    TableNotFound(String),
}
