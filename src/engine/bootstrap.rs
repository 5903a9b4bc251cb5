//! Database bootstrap.
//!
//! `initdb` turns an empty data file into a working database: it formats
//! the boot page (page 1), seeds `_tables` on page 2, then describes all
//! three system tables in `_columns` and registers the built-in
//! `sys_object_id` sequence. Every bootstrap row carries a hand-assigned
//! object id; ids 1–23 are reserved for the bootstrap set, and the
//! sequence starts handing out ids at 24.
//!
//! Running `initdb` against an already-initialized file is a no-op: a
//! nonzero major version on the boot page means there is nothing to do.

use tracing::{debug, info};

use crate::engine::boot::{self, BootPage};
use crate::engine::bufmgr::BufferManager;
use crate::engine::catalog::{
    self, ColumnEntry, SequenceEntry, TableEntry, COLUMNS, SEQUENCES, TABLES,
};
use crate::engine::constants::{BOOT_PAGE_ID, SYSTABLE_FIRST_PAGE_ID};
use crate::engine::datum::DataType;
use crate::engine::descriptor::BufferTag;
use crate::engine::file::FileId;
use crate::engine::page;
use crate::engine::record::build_record;
use crate::RowdbError;

/// The bootstrap `_columns` rows: `(object_id, table_id, name,
/// data_type, max_length, colnum)`. All bootstrap columns except
/// `precision` and `scale` values are NOT NULL.
const BOOTSTRAP_COLUMNS: &[(i64, i64, &str, DataType, i16, u8)] = &[
    (4, 1, "object_id", DataType::BigInt, 8, 0),
    (5, 1, "name", DataType::VarChar, 50, 1),
    (6, 1, "type", DataType::Char, 1, 2),
    (7, 1, "first_page_id", DataType::Int, 4, 3),
    (8, 1, "last_page_id", DataType::Int, 4, 4),
    (9, 2, "object_id", DataType::BigInt, 8, 0),
    (10, 2, "table_id", DataType::BigInt, 8, 1),
    (11, 2, "name", DataType::VarChar, 50, 2),
    (12, 2, "data_type", DataType::TinyInt, 1, 3),
    (13, 2, "max_length", DataType::SmallInt, 2, 4),
    (14, 2, "precision", DataType::TinyInt, 1, 5),
    (15, 2, "scale", DataType::TinyInt, 1, 6),
    (16, 2, "colnum", DataType::TinyInt, 1, 7),
    (17, 2, "is_not_null", DataType::Bool, 1, 8),
    (18, 3, "object_id", DataType::BigInt, 8, 0),
    (19, 3, "name", DataType::VarChar, 50, 1),
    (20, 3, "column_id", DataType::BigInt, 8, 2),
    (21, 3, "next_value", DataType::BigInt, 8, 3),
    (22, 3, "increment", DataType::BigInt, 8, 4),
];

/// Object id of the built-in `sys_object_id` sequence.
const OBJECT_ID_SEQUENCE_ID: i64 = 23;
/// First object id available to user objects.
const FIRST_USER_OBJECT_ID: i64 = 24;

/// Initialize the boot page and system catalog if the data file does not
/// already contain them. Returns `true` when a fresh bootstrap ran and
/// `false` when the file was already initialized.
pub fn initdb(buf: &mut BufferManager) -> Result<bool, RowdbError> {
    let boot_tag = BufferTag::new(FileId::Data, BOOT_PAGE_ID);

    match buf.request(boot_tag) {
        Ok(frame) => {
            let major = BootPage::parse(buf.page(frame)).map_or(0, |b| b.major_version);
            if major > 0 {
                buf.release(frame);
                debug!("data file already initialized, skipping bootstrap");
                return Ok(false);
            }
            // The page exists but was never formatted (all zeroes).
            format_and_flush(buf, frame, boot_tag)?;
        }
        Err(RowdbError::ShortRead { .. }) => {
            let frame = buf.allocate(FileId::Data)?;
            let page_id = page::page_id(buf.page(frame));
            if page_id != BOOT_PAGE_ID {
                buf.release(frame);
                return Err(RowdbError::Parse(format!(
                    "data file is not empty: first allocation returned page {}",
                    page_id
                )));
            }
            format_and_flush(buf, frame, boot_tag)?;
        }
        Err(e) => return Err(e),
    }

    info!("bootstrapping system catalog");
    init_tables(buf)?;
    init_columns(buf)?;
    init_sequences(buf)?;
    Ok(true)
}

/// Format the boot page in the given pinned frame and write it through.
/// `flush_page` drops the frame from the cache, which also surrenders
/// the pin taken by the caller.
fn format_and_flush(
    buf: &mut BufferManager,
    frame: usize,
    boot_tag: BufferTag,
) -> Result<(), RowdbError> {
    let page_size = buf.config().page_size as u16;
    boot::format_boot_page(buf.page_mut(frame), page_size);
    buf.mark_dirty(frame);
    buf.flush_page(boot_tag)
}

fn init_tables(buf: &mut BufferManager) -> Result<(), RowdbError> {
    // The `_tables` row describes the very table that stores it, so the
    // first page cannot come from the ordinary insert path: allocate it
    // by hand at the fixed catalog position and place the row directly.
    let desc = catalog::tables_descriptor();
    let entry = TableEntry {
        object_id: 1,
        name: TABLES.to_string(),
        kind: "s".to_string(),
        first_page_id: SYSTABLE_FIRST_PAGE_ID as i32,
        last_page_id: SYSTABLE_FIRST_PAGE_ID as i32,
    };
    let record = build_record(&desc, &entry.to_values());

    let frame = buf.allocate(FileId::Data)?;
    let page_id = page::page_id(buf.page(frame));
    if page_id != SYSTABLE_FIRST_PAGE_ID {
        buf.release(frame);
        return Err(RowdbError::Parse(format!(
            "expected {} to land on page {}, got page {}",
            TABLES, SYSTABLE_FIRST_PAGE_ID, page_id
        )));
    }
    page::init_data_page(buf.page_mut(frame));
    if !page::insert(buf.page_mut(frame), &record) {
        buf.release(frame);
        return Err(RowdbError::Parse(
            "bootstrap row does not fit on an empty page".to_string(),
        ));
    }
    buf.mark_dirty(frame);
    buf.release(frame);

    // The remaining catalog tables go through the ordinary insert path,
    // which can now find `_tables`.
    catalog::insert_table_entry(
        buf,
        &TableEntry {
            object_id: 2,
            name: COLUMNS.to_string(),
            kind: "s".to_string(),
            first_page_id: 0,
            last_page_id: 0,
        },
    )?;
    catalog::insert_table_entry(
        buf,
        &TableEntry {
            object_id: 3,
            name: SEQUENCES.to_string(),
            kind: "s".to_string(),
            first_page_id: 0,
            last_page_id: 0,
        },
    )
}

fn init_columns(buf: &mut BufferManager) -> Result<(), RowdbError> {
    for &(object_id, table_id, name, data_type, max_length, colnum) in BOOTSTRAP_COLUMNS {
        catalog::insert_column_entry(
            buf,
            &ColumnEntry {
                object_id,
                table_id,
                name: name.to_string(),
                data_type,
                max_length,
                precision: None,
                scale: None,
                colnum,
                not_null: true,
            },
        )?;
    }
    Ok(())
}

fn init_sequences(buf: &mut BufferManager) -> Result<(), RowdbError> {
    catalog::insert_sequence_entry(
        buf,
        &SequenceEntry {
            object_id: OBJECT_ID_SEQUENCE_ID,
            name: catalog::OBJECT_ID_SEQUENCE.to_string(),
            kind: "s".to_string(),
            column_id: None,
            next_value: FIRST_USER_OBJECT_ID,
            increment: 1,
        },
    )
}
