//! The system catalog.
//!
//! Three reserved tables describe everything else and are stored as
//! ordinary data pages using the same record format as user data:
//!
//! - `_tables(object_id, name, type, first_page_id, last_page_id)` —
//!   one row per table, `type` `'s'` for system and `'u'` for user
//!   tables. The page-id columns root each table's page chain.
//! - `_columns(object_id, table_id, name, data_type, max_length,
//!   precision, scale, colnum, is_not_null)` — one row per column.
//! - `_sequences(object_id, name, type, column_id, next_value,
//!   increment)` — monotonic counters; the built-in `sys_object_id`
//!   sequence hands out catalog object ids.
//!
//! Each table's [`RecordDescriptor`] is produced by a static function
//! here, and the same column metadata is written into `_columns` during
//! bootstrap, so a reader could rediscover the schema from disk.
//!
//! Lookups are full scans with a case-sensitive linear name match, and
//! the two `_tables` page-id columns are updated in place through
//! [`compute_offset_to_column`]. Both are fine at catalog scale.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use tracing::debug;

use crate::engine::bufmgr::BufferManager;
use crate::engine::constants::{PAGE_HEADER_SIZE, SLOT_SIZE, SYSTABLE_FIRST_PAGE_ID};
use crate::engine::datum::{DataType, Datum};
use crate::engine::descriptor::BufferTag;
use crate::engine::file::FileId;
use crate::engine::page;
use crate::engine::record::{
    build_record, compute_offset_to_column, defill_record, Column, RecordDescriptor,
};
use crate::RowdbError;

/// Name of the tables catalog.
pub const TABLES: &str = "_tables";
/// Name of the columns catalog.
pub const COLUMNS: &str = "_columns";
/// Name of the sequences catalog.
pub const SEQUENCES: &str = "_sequences";
/// The built-in sequence that hands out catalog object ids.
pub const OBJECT_ID_SEQUENCE: &str = "sys_object_id";

// ── Static record descriptors ───────────────────────────────────────

/// Descriptor for `_tables`.
pub fn tables_descriptor() -> RecordDescriptor {
    RecordDescriptor::new(vec![
        Column::new("object_id", DataType::BigInt, 0, 8, true),
        Column::new("name", DataType::VarChar, 1, 50, true),
        Column::new("type", DataType::Char, 2, 1, true),
        Column::new("first_page_id", DataType::Int, 3, 4, true),
        Column::new("last_page_id", DataType::Int, 4, 4, true),
    ])
}

/// Descriptor for `_columns`.
pub fn columns_descriptor() -> RecordDescriptor {
    RecordDescriptor::new(vec![
        Column::new("object_id", DataType::BigInt, 0, 8, true),
        Column::new("table_id", DataType::BigInt, 1, 8, true),
        Column::new("name", DataType::VarChar, 2, 50, true),
        Column::new("data_type", DataType::TinyInt, 3, 1, true),
        Column::new("max_length", DataType::SmallInt, 4, 2, true),
        Column::new("precision", DataType::TinyInt, 5, 1, false),
        Column::new("scale", DataType::TinyInt, 6, 1, false),
        Column::new("colnum", DataType::TinyInt, 7, 1, true),
        Column::new("is_not_null", DataType::Bool, 8, 1, true),
    ])
}

/// Descriptor for `_sequences`.
pub fn sequences_descriptor() -> RecordDescriptor {
    RecordDescriptor::new(vec![
        Column::new("object_id", DataType::BigInt, 0, 8, true),
        Column::new("name", DataType::VarChar, 1, 50, true),
        Column::new("type", DataType::Char, 2, 1, true),
        Column::new("column_id", DataType::BigInt, 3, 8, false),
        Column::new("next_value", DataType::BigInt, 4, 8, true),
        Column::new("increment", DataType::BigInt, 5, 8, true),
    ])
}

// ── Typed catalog rows ──────────────────────────────────────────────

/// One `_tables` row.
#[derive(Debug, Clone, Serialize)]
pub struct TableEntry {
    pub object_id: i64,
    pub name: String,
    /// `"s"` for system tables, `"u"` for user tables.
    pub kind: String,
    pub first_page_id: i32,
    pub last_page_id: i32,
}

impl TableEntry {
    pub(crate) fn to_values(&self) -> Vec<Option<Datum>> {
        vec![
            Some(Datum::BigInt(self.object_id)),
            Some(Datum::VarChar(self.name.clone())),
            Some(Datum::Char(self.kind.clone())),
            Some(Datum::Int(self.first_page_id)),
            Some(Datum::Int(self.last_page_id)),
        ]
    }

    fn from_row(row: &[Option<Datum>]) -> Result<Self, RowdbError> {
        Ok(TableEntry {
            object_id: row_i64(row, 0)?,
            name: row_str(row, 1)?,
            kind: row_str(row, 2)?,
            first_page_id: row_i32(row, 3)?,
            last_page_id: row_i32(row, 4)?,
        })
    }
}

/// One `_columns` row.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnEntry {
    pub object_id: i64,
    pub table_id: i64,
    pub name: String,
    pub data_type: DataType,
    pub max_length: i16,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub colnum: u8,
    pub not_null: bool,
}

impl ColumnEntry {
    pub(crate) fn to_values(&self) -> Vec<Option<Datum>> {
        vec![
            Some(Datum::BigInt(self.object_id)),
            Some(Datum::BigInt(self.table_id)),
            Some(Datum::VarChar(self.name.clone())),
            Some(Datum::TinyInt(self.data_type.code())),
            Some(Datum::SmallInt(self.max_length)),
            self.precision.map(Datum::TinyInt),
            self.scale.map(Datum::TinyInt),
            Some(Datum::TinyInt(self.colnum)),
            Some(Datum::Bool(self.not_null)),
        ]
    }

    fn from_row(row: &[Option<Datum>]) -> Result<Self, RowdbError> {
        Ok(ColumnEntry {
            object_id: row_i64(row, 0)?,
            table_id: row_i64(row, 1)?,
            name: row_str(row, 2)?,
            data_type: DataType::from_code(row_u8(row, 3)?)?,
            max_length: row_i16(row, 4)?,
            precision: row_opt_u8(row, 5)?,
            scale: row_opt_u8(row, 6)?,
            colnum: row_u8(row, 7)?,
            not_null: row_bool(row, 8)?,
        })
    }

    /// Rebuild the in-memory [`Column`] this row describes.
    pub fn to_column(&self) -> Column {
        Column::new(
            self.name.clone(),
            self.data_type,
            self.colnum as usize,
            self.max_length as usize,
            self.not_null,
        )
    }
}

/// One `_sequences` row.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceEntry {
    pub object_id: i64,
    pub name: String,
    /// `"s"` for system sequences, `"u"` for user-created ones.
    pub kind: String,
    /// The column this sequence feeds, if any.
    pub column_id: Option<i64>,
    pub next_value: i64,
    pub increment: i64,
}

impl SequenceEntry {
    pub(crate) fn to_values(&self) -> Vec<Option<Datum>> {
        vec![
            Some(Datum::BigInt(self.object_id)),
            Some(Datum::VarChar(self.name.clone())),
            Some(Datum::Char(self.kind.clone())),
            self.column_id.map(Datum::BigInt),
            Some(Datum::BigInt(self.next_value)),
            Some(Datum::BigInt(self.increment)),
        ]
    }

    fn from_row(row: &[Option<Datum>]) -> Result<Self, RowdbError> {
        Ok(SequenceEntry {
            object_id: row_i64(row, 0)?,
            name: row_str(row, 1)?,
            kind: row_str(row, 2)?,
            column_id: match row.get(3).and_then(|v| v.as_ref()) {
                Some(d) => Some(d.as_i64().ok_or_else(|| shape_err(3, d))?),
                None => None,
            },
            next_value: row_i64(row, 4)?,
            increment: row_i64(row, 5)?,
        })
    }
}

// ── Row extraction helpers ──────────────────────────────────────────

fn shape_err(colnum: usize, got: &Datum) -> RowdbError {
    RowdbError::Parse(format!(
        "catalog row column {} has unexpected shape: {:?}",
        colnum, got
    ))
}

fn missing_err(colnum: usize) -> RowdbError {
    RowdbError::Parse(format!("catalog row column {} is unexpectedly null", colnum))
}

fn row_datum(row: &[Option<Datum>], i: usize) -> Result<&Datum, RowdbError> {
    row.get(i)
        .and_then(|v| v.as_ref())
        .ok_or_else(|| missing_err(i))
}

fn row_i64(row: &[Option<Datum>], i: usize) -> Result<i64, RowdbError> {
    let d = row_datum(row, i)?;
    d.as_i64().ok_or_else(|| shape_err(i, d))
}

fn row_i32(row: &[Option<Datum>], i: usize) -> Result<i32, RowdbError> {
    Ok(row_i64(row, i)? as i32)
}

fn row_i16(row: &[Option<Datum>], i: usize) -> Result<i16, RowdbError> {
    Ok(row_i64(row, i)? as i16)
}

fn row_u8(row: &[Option<Datum>], i: usize) -> Result<u8, RowdbError> {
    Ok(row_i64(row, i)? as u8)
}

fn row_opt_u8(row: &[Option<Datum>], i: usize) -> Result<Option<u8>, RowdbError> {
    match row.get(i).and_then(|v| v.as_ref()) {
        Some(d) => Ok(Some(d.as_i64().ok_or_else(|| shape_err(i, d))? as u8)),
        None => Ok(None),
    }
}

fn row_bool(row: &[Option<Datum>], i: usize) -> Result<bool, RowdbError> {
    let d = row_datum(row, i)?;
    d.as_bool().ok_or_else(|| shape_err(i, d))
}

fn row_str(row: &[Option<Datum>], i: usize) -> Result<String, RowdbError> {
    let d = row_datum(row, i)?;
    d.as_str()
        .map(str::to_string)
        .ok_or_else(|| shape_err(i, d))
}

// ── Scans ───────────────────────────────────────────────────────────

/// Walk a page chain from `first_page_id`, deserializing every record
/// with `desc`. Records come back in slot order per page and pages in
/// `nextPageId` order, so insertion order overall.
pub(crate) fn chain_scan(
    buf: &mut BufferManager,
    desc: &RecordDescriptor,
    first_page_id: u32,
) -> Result<Vec<Vec<Option<Datum>>>, RowdbError> {
    let mut rows = Vec::new();
    let mut page_id = first_page_id;

    while page_id != 0 {
        let frame = buf.request(BufferTag::new(FileId::Data, page_id))?;

        let mut decode_err = None;
        let next;
        {
            let pg = buf.page(frame);
            for i in 0..page::num_records(pg) as usize {
                match defill_record(desc, page::record_bytes(pg, i)) {
                    Ok(row) => rows.push(row),
                    Err(e) => {
                        decode_err = Some(e);
                        break;
                    }
                }
            }
            next = page::next_page_id(pg);
        }

        buf.release(frame);
        if let Some(e) = decode_err {
            return Err(e);
        }
        page_id = next;
    }

    Ok(rows)
}

/// All `_tables` rows.
pub fn scan_tables(buf: &mut BufferManager) -> Result<Vec<TableEntry>, RowdbError> {
    chain_scan(buf, &tables_descriptor(), SYSTABLE_FIRST_PAGE_ID)?
        .iter()
        .map(|row| TableEntry::from_row(row))
        .collect()
}

/// All `_columns` rows.
pub fn scan_columns(buf: &mut BufferManager) -> Result<Vec<ColumnEntry>, RowdbError> {
    let Some(first) = table_first_page_id(buf, COLUMNS)? else {
        return Ok(Vec::new());
    };
    if first <= 0 {
        return Ok(Vec::new());
    }
    chain_scan(buf, &columns_descriptor(), first as u32)?
        .iter()
        .map(|row| ColumnEntry::from_row(row))
        .collect()
}

/// All `_sequences` rows.
pub fn scan_sequences(buf: &mut BufferManager) -> Result<Vec<SequenceEntry>, RowdbError> {
    let Some(first) = table_first_page_id(buf, SEQUENCES)? else {
        return Ok(Vec::new());
    };
    if first <= 0 {
        return Ok(Vec::new());
    }
    chain_scan(buf, &sequences_descriptor(), first as u32)?
        .iter()
        .map(|row| SequenceEntry::from_row(row))
        .collect()
}

// ── Lookups ─────────────────────────────────────────────────────────

/// A table's object id, or `None` when the name is not in the catalog.
pub fn table_object_id(buf: &mut BufferManager, name: &str) -> Result<Option<i64>, RowdbError> {
    Ok(scan_tables(buf)?
        .into_iter()
        .find(|t| t.name == name)
        .map(|t| t.object_id))
}

/// A table's `first_page_id`.
pub fn table_first_page_id(
    buf: &mut BufferManager,
    name: &str,
) -> Result<Option<i32>, RowdbError> {
    Ok(scan_tables(buf)?
        .into_iter()
        .find(|t| t.name == name)
        .map(|t| t.first_page_id))
}

/// A table's `last_page_id`.
pub fn table_last_page_id(
    buf: &mut BufferManager,
    name: &str,
) -> Result<Option<i32>, RowdbError> {
    Ok(scan_tables(buf)?
        .into_iter()
        .find(|t| t.name == name)
        .map(|t| t.last_page_id))
}

pub fn table_exists(buf: &mut BufferManager, name: &str) -> Result<bool, RowdbError> {
    Ok(table_object_id(buf, name)?.is_some())
}

// ── Point updates ───────────────────────────────────────────────────

/// Overwrite a fixed-width `_tables` column in place for the row whose
/// `name` matches. Returns whether a row was found.
fn update_tables_field(
    buf: &mut BufferManager,
    name: &str,
    colnum: usize,
    value: i32,
) -> Result<bool, RowdbError> {
    let desc = tables_descriptor();
    let mut page_id = SYSTABLE_FIRST_PAGE_ID;

    while page_id != 0 {
        let frame = buf.request(BufferTag::new(FileId::Data, page_id))?;

        let mut target = None;
        let mut walk_err = None;
        let next;
        {
            let pg = buf.page(frame);
            for i in 0..page::num_records(pg) as usize {
                let rec = page::record_bytes(pg, i);
                let row = match defill_record(&desc, rec) {
                    Ok(row) => row,
                    Err(e) => {
                        walk_err = Some(e);
                        break;
                    }
                };
                if row.get(1).and_then(|v| v.as_ref()).and_then(Datum::as_str) == Some(name) {
                    match compute_offset_to_column(&desc, rec, colnum) {
                        Some(off) => {
                            let (rec_off, _) = page::slot(pg, i);
                            target = Some(rec_off as usize + off);
                        }
                        None => {
                            walk_err = Some(RowdbError::Parse(format!(
                                "column {} of {} is not updatable in place",
                                colnum, TABLES
                            )));
                        }
                    }
                    break;
                }
            }
            next = page::next_page_id(pg);
        }

        if let Some(e) = walk_err {
            buf.release(frame);
            return Err(e);
        }
        if let Some(at) = target {
            LittleEndian::write_i32(&mut buf.page_mut(frame)[at..], value);
            buf.mark_dirty(frame);
            buf.release(frame);
            return Ok(true);
        }
        buf.release(frame);
        page_id = next;
    }

    Ok(false)
}

/// Point-update `_tables.first_page_id` for `name`.
pub fn set_table_first_page_id(
    buf: &mut BufferManager,
    name: &str,
    first_page_id: i32,
) -> Result<bool, RowdbError> {
    update_tables_field(buf, name, 3, first_page_id)
}

/// Point-update `_tables.last_page_id` for `name`.
pub fn set_table_last_page_id(
    buf: &mut BufferManager,
    name: &str,
    last_page_id: i32,
) -> Result<bool, RowdbError> {
    update_tables_field(buf, name, 4, last_page_id)
}

// ── Sequences ───────────────────────────────────────────────────────

/// Claim the current value of a sequence and advance it in place by its
/// increment. `None` when no sequence has that name.
pub fn next_sequence_value(
    buf: &mut BufferManager,
    name: &str,
) -> Result<Option<i64>, RowdbError> {
    let Some(first) = table_first_page_id(buf, SEQUENCES)? else {
        return Ok(None);
    };
    if first <= 0 {
        return Ok(None);
    }

    let desc = sequences_descriptor();
    let mut page_id = first as u32;

    while page_id != 0 {
        let frame = buf.request(BufferTag::new(FileId::Data, page_id))?;

        let mut target = None;
        let mut walk_err = None;
        let next;
        {
            let pg = buf.page(frame);
            for i in 0..page::num_records(pg) as usize {
                let rec = page::record_bytes(pg, i);
                let row = match defill_record(&desc, rec) {
                    Ok(row) => row,
                    Err(e) => {
                        walk_err = Some(e);
                        break;
                    }
                };
                if row.get(1).and_then(|v| v.as_ref()).and_then(Datum::as_str) == Some(name) {
                    match (
                        row_i64(&row, 4),
                        row_i64(&row, 5),
                        compute_offset_to_column(&desc, rec, 4),
                    ) {
                        (Ok(value), Ok(increment), Some(off)) => {
                            let (rec_off, _) = page::slot(pg, i);
                            target = Some((rec_off as usize + off, value, increment));
                        }
                        (Err(e), _, _) | (_, Err(e), _) => walk_err = Some(e),
                        (_, _, None) => {
                            walk_err = Some(RowdbError::Parse(format!(
                                "sequence {} has no in-place next_value slot",
                                name
                            )))
                        }
                    }
                    break;
                }
            }
            next = page::next_page_id(pg);
        }

        if let Some(e) = walk_err {
            buf.release(frame);
            return Err(e);
        }
        if let Some((at, value, increment)) = target {
            LittleEndian::write_i64(&mut buf.page_mut(frame)[at..], value + increment);
            buf.mark_dirty(frame);
            buf.release(frame);
            debug!(sequence = name, value, "claimed sequence value");
            return Ok(Some(value));
        }
        buf.release(frame);
        page_id = next;
    }

    Ok(None)
}

// ── Inserts ─────────────────────────────────────────────────────────

/// Append a serialized record to the page chain of the named table.
///
/// The uniform insertion pattern: pin the table's last page and try a
/// page insert; allocate and register a first page when the table has
/// none; on overflow split the tail, record the new `last_page_id`, and
/// retry on the fresh page.
pub(crate) fn chain_insert(
    buf: &mut BufferManager,
    table_name: &str,
    record: &[u8],
) -> Result<(), RowdbError> {
    let capacity = buf.config().page_size - PAGE_HEADER_SIZE - SLOT_SIZE;
    if record.len() > capacity {
        return Err(RowdbError::Parse(format!(
            "record of {} bytes exceeds page capacity of {} bytes",
            record.len(),
            capacity
        )));
    }

    let last = table_last_page_id(buf, table_name)?
        .ok_or_else(|| RowdbError::TableNotFound(table_name.to_string()))?;

    let mut frame = if last <= 0 {
        // First row ever: start the table's page chain and root it in
        // `_tables`.
        let frame = buf.allocate(FileId::Data)?;
        page::init_data_page(buf.page_mut(frame));
        buf.mark_dirty(frame);
        let page_id = page::page_id(buf.page(frame)) as i32;
        if let Err(e) = set_table_first_page_id(buf, table_name, page_id)
            .and_then(|_| set_table_last_page_id(buf, table_name, page_id))
        {
            buf.release(frame);
            return Err(e);
        }
        frame
    } else {
        buf.request(BufferTag::new(FileId::Data, last as u32))?
    };

    loop {
        if page::insert(buf.page_mut(frame), record) {
            buf.mark_dirty(frame);
            buf.release(frame);
            return Ok(());
        }

        let next = page::next_page_id(buf.page(frame));
        if next == 0 {
            let new_frame = match buf.page_split(frame) {
                Ok(f) => f,
                Err(e) => {
                    buf.release(frame);
                    return Err(e);
                }
            };
            let new_page_id = page::page_id(buf.page(new_frame)) as i32;
            if let Err(e) = set_table_last_page_id(buf, table_name, new_page_id) {
                buf.release(new_frame);
                return Err(e);
            }
            frame = new_frame;
        } else {
            // The `_tables` entry lagged behind the true tail; walk
            // forward to it.
            let old = frame;
            match buf.request(BufferTag::new(FileId::Data, next)) {
                Ok(f) => {
                    buf.release(old);
                    frame = f;
                }
                Err(e) => {
                    buf.release(old);
                    return Err(e);
                }
            }
        }
    }
}

/// Insert a `_tables` row.
pub fn insert_table_entry(
    buf: &mut BufferManager,
    entry: &TableEntry,
) -> Result<(), RowdbError> {
    let record = build_record(&tables_descriptor(), &entry.to_values());
    chain_insert(buf, TABLES, &record)
}

/// Insert a `_columns` row.
pub fn insert_column_entry(
    buf: &mut BufferManager,
    entry: &ColumnEntry,
) -> Result<(), RowdbError> {
    let record = build_record(&columns_descriptor(), &entry.to_values());
    chain_insert(buf, COLUMNS, &record)
}

/// Insert a `_sequences` row.
pub fn insert_sequence_entry(
    buf: &mut BufferManager,
    entry: &SequenceEntry,
) -> Result<(), RowdbError> {
    let record = build_record(&sequences_descriptor(), &entry.to_values());
    chain_insert(buf, SEQUENCES, &record)
}

// ── Table creation ──────────────────────────────────────────────────

/// Register a user table: one `_tables` row plus one `_columns` row per
/// column, with object ids drawn from `sys_object_id`. Returns the new
/// table's object id.
pub fn create_table(
    buf: &mut BufferManager,
    name: &str,
    columns: &[Column],
) -> Result<i64, RowdbError> {
    if table_exists(buf, name)? {
        return Err(RowdbError::DuplicateTable(name.to_string()));
    }

    let object_id = claim_object_id(buf)?;
    insert_table_entry(
        buf,
        &TableEntry {
            object_id,
            name: name.to_string(),
            kind: "u".to_string(),
            first_page_id: 0,
            last_page_id: 0,
        },
    )?;

    for column in columns {
        let column_id = claim_object_id(buf)?;
        insert_column_entry(
            buf,
            &ColumnEntry {
                object_id: column_id,
                table_id: object_id,
                name: column.name.clone(),
                data_type: column.data_type,
                max_length: column.max_len as i16,
                // No floating-point types yet, so nothing carries
                // precision or scale.
                precision: None,
                scale: None,
                colnum: column.colnum as u8,
                not_null: column.not_null,
            },
        )?;
    }

    debug!(table = name, object_id, "created table");
    Ok(object_id)
}

/// The columns of a named table, in `colnum` order. `None` when the
/// table is not in the catalog.
pub fn table_columns(
    buf: &mut BufferManager,
    name: &str,
) -> Result<Option<Vec<Column>>, RowdbError> {
    let Some(object_id) = table_object_id(buf, name)? else {
        return Ok(None);
    };
    let mut entries: Vec<ColumnEntry> = scan_columns(buf)?
        .into_iter()
        .filter(|c| c.table_id == object_id)
        .collect();
    entries.sort_by_key(|c| c.colnum);
    Ok(Some(entries.iter().map(ColumnEntry::to_column).collect()))
}

fn claim_object_id(buf: &mut BufferManager) -> Result<i64, RowdbError> {
    next_sequence_value(buf, OBJECT_ID_SEQUENCE)?.ok_or_else(|| {
        RowdbError::Parse(format!(
            "the {} sequence is missing; was initdb run?",
            OBJECT_ID_SEQUENCE
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_shapes() {
        let tables = tables_descriptor();
        assert_eq!(tables.ncols(), 5);
        assert_eq!(tables.nfixed(), 4);
        assert!(!tables.has_nullable());

        let columns = columns_descriptor();
        assert_eq!(columns.ncols(), 9);
        assert_eq!(columns.nfixed(), 8);
        assert!(columns.has_nullable());
        assert_eq!(columns.null_bitmap_len(), 2);

        let sequences = sequences_descriptor();
        assert_eq!(sequences.ncols(), 6);
        assert_eq!(sequences.nfixed(), 5);
        assert!(sequences.has_nullable());
    }

    #[test]
    fn test_table_entry_round_trip() {
        let desc = tables_descriptor();
        let entry = TableEntry {
            object_id: 1,
            name: "_tables".to_string(),
            kind: "s".to_string(),
            first_page_id: 2,
            last_page_id: 2,
        };
        let record = build_record(&desc, &entry.to_values());
        let row = defill_record(&desc, &record).unwrap();
        let back = TableEntry::from_row(&row).unwrap();
        assert_eq!(back.object_id, 1);
        assert_eq!(back.name, "_tables");
        assert_eq!(back.kind, "s");
        assert_eq!(back.first_page_id, 2);
        assert_eq!(back.last_page_id, 2);
    }

    #[test]
    fn test_column_entry_round_trip_with_null_precision() {
        let desc = columns_descriptor();
        let entry = ColumnEntry {
            object_id: 9,
            table_id: 2,
            name: "object_id".to_string(),
            data_type: DataType::BigInt,
            max_length: 8,
            precision: None,
            scale: None,
            colnum: 0,
            not_null: true,
        };
        let record = build_record(&desc, &entry.to_values());
        let row = defill_record(&desc, &record).unwrap();
        let back = ColumnEntry::from_row(&row).unwrap();
        assert_eq!(back.data_type, DataType::BigInt);
        assert_eq!(back.precision, None);
        assert_eq!(back.scale, None);
        assert!(back.not_null);
    }

    #[test]
    fn test_sequence_entry_round_trip_with_null_column() {
        let desc = sequences_descriptor();
        let entry = SequenceEntry {
            object_id: 23,
            name: "sys_object_id".to_string(),
            kind: "s".to_string(),
            column_id: None,
            next_value: 24,
            increment: 1,
        };
        let record = build_record(&desc, &entry.to_values());
        let row = defill_record(&desc, &record).unwrap();
        let back = SequenceEntry::from_row(&row).unwrap();
        assert_eq!(back.column_id, None);
        assert_eq!(back.next_value, 24);
        assert_eq!(back.increment, 1);
    }
}
