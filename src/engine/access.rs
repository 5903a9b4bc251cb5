//! Table access.
//!
//! Full scan and insert over a named user table. Both operations resolve
//! the table's page chain through `_tables` and move rows with the same
//! machinery the catalog uses on itself: the chain walk for reads, and
//! the allocate-or-split insert discipline for writes.

use crate::engine::bufmgr::BufferManager;
use crate::engine::catalog;
use crate::engine::datum::Datum;
use crate::engine::record::{build_record, RecordDescriptor};
use crate::RowdbError;

/// A named table and the shape of its rows.
#[derive(Debug, Clone)]
pub struct TableDesc {
    pub name: String,
    pub desc: RecordDescriptor,
}

impl TableDesc {
    pub fn new<S: Into<String>>(name: S, desc: RecordDescriptor) -> Self {
        TableDesc {
            name: name.into(),
            desc,
        }
    }
}

/// Build a [`TableDesc`] for a named table from its `_columns` rows.
/// `None` when the table is not in the catalog.
pub fn load_table_desc(
    buf: &mut BufferManager,
    name: &str,
) -> Result<Option<TableDesc>, RowdbError> {
    Ok(catalog::table_columns(buf, name)?
        .map(|columns| TableDesc::new(name, RecordDescriptor::new(columns))))
}

/// Read every row of the table, in insertion order (slot order within a
/// page, pages in `nextPageId` order from `first_page_id`).
pub fn fullscan(
    buf: &mut BufferManager,
    td: &TableDesc,
) -> Result<Vec<Vec<Option<Datum>>>, RowdbError> {
    let first = catalog::table_first_page_id(buf, &td.name)?
        .ok_or_else(|| RowdbError::TableNotFound(td.name.clone()))?;
    if first <= 0 {
        // Registered but never written.
        return Ok(Vec::new());
    }
    catalog::chain_scan(buf, &td.desc, first as u32)
}

/// Append one row to the table. Values are indexed by `colnum`, nulls as
/// `None`. Overflowing the tail page splits the chain and retries on the
/// fresh page.
pub fn insert(
    buf: &mut BufferManager,
    td: &TableDesc,
    values: &[Option<Datum>],
) -> Result<(), RowdbError> {
    let record = build_record(&td.desc, values);
    catalog::chain_insert(buf, &td.name, &record)
}
