//! Slotted-page layout and the page insert primitive.
//!
//! Every data page starts with a packed 20-byte header ([`PageHeader`]),
//! after which records grow from low addresses toward high ones while the
//! slot array grows from the last byte of the page backward. Each slot is
//! 4 bytes: the record's byte offset and its length. Slot index 0 is the
//! slot at the highest address, which belongs to the first record placed
//! on the page, so iterating slots `0..num_records` yields records in
//! insertion order.
//!
//! ```text
//! +--------+-------------------+----------+-------------------+
//! | HEADER | RECORDS (grow ->) | freeData | (<- grows) SLOTS  |
//! +--------+-------------------+----------+-------------------+
//! ```
//!
//! `freeData` is the contiguous gap between the last record and the first
//! slot; `freeBytes` is the total free count (they only diverge once
//! deletion and compaction exist). There is no delete or compact
//! operation yet.
//!
//! Page operations work directly on a page-sized byte slice owned by the
//! buffer pool; nothing here allocates.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::engine::constants::*;

/// Parsed copy of the 20-byte page header.
#[derive(Debug, Clone, Serialize)]
pub struct PageHeader {
    /// One-based page id, numbered sequentially through the file.
    pub page_id: u32,
    /// 0 = data page, 1 = index page.
    pub page_type: u8,
    /// Level within a B+tree index; 0 for heap pages.
    pub index_level: u8,
    /// Previous page of this object's chain, 0 if none.
    pub prev_page_id: u32,
    /// Next page of this object's chain, 0 if none.
    pub next_page_id: u32,
    /// Count of slot-array entries.
    pub num_records: u16,
    /// Total free bytes on the page.
    pub free_bytes: u16,
    /// Contiguous free bytes between the last record and the slot array.
    pub free_data: u16,
}

impl PageHeader {
    /// Parse the header from a page buffer.
    ///
    /// The slice must be at least `PAGE_HEADER_SIZE` (20) bytes.
    pub fn parse(page: &[u8]) -> Option<Self> {
        if page.len() < PAGE_HEADER_SIZE {
            return None;
        }
        Some(PageHeader {
            page_id: LittleEndian::read_u32(&page[PAGE_ID..]),
            page_type: page[PAGE_TYPE],
            index_level: page[PAGE_INDEX_LEVEL],
            prev_page_id: LittleEndian::read_u32(&page[PAGE_PREV..]),
            next_page_id: LittleEndian::read_u32(&page[PAGE_NEXT..]),
            num_records: LittleEndian::read_u16(&page[PAGE_NUM_RECORDS..]),
            free_bytes: LittleEndian::read_u16(&page[PAGE_FREE_BYTES..]),
            free_data: LittleEndian::read_u16(&page[PAGE_FREE_DATA..]),
        })
    }
}

/// Stamp a zeroed frame as an empty data page. The page id is set
/// separately (the buffer manager writes it at allocation time).
pub fn init_data_page(page: &mut [u8]) {
    let free = (page.len() - PAGE_HEADER_SIZE) as u16;
    page[PAGE_TYPE] = PAGE_TYPE_DATA;
    page[PAGE_INDEX_LEVEL] = 0;
    LittleEndian::write_u16(&mut page[PAGE_NUM_RECORDS..], 0);
    LittleEndian::write_u16(&mut page[PAGE_FREE_BYTES..], free);
    LittleEndian::write_u16(&mut page[PAGE_FREE_DATA..], free);
}

pub fn page_id(page: &[u8]) -> u32 {
    LittleEndian::read_u32(&page[PAGE_ID..])
}

pub fn set_page_id(page: &mut [u8], id: u32) {
    LittleEndian::write_u32(&mut page[PAGE_ID..], id);
}

pub fn prev_page_id(page: &[u8]) -> u32 {
    LittleEndian::read_u32(&page[PAGE_PREV..])
}

pub fn set_prev_page_id(page: &mut [u8], id: u32) {
    LittleEndian::write_u32(&mut page[PAGE_PREV..], id);
}

pub fn next_page_id(page: &[u8]) -> u32 {
    LittleEndian::read_u32(&page[PAGE_NEXT..])
}

pub fn set_next_page_id(page: &mut [u8], id: u32) {
    LittleEndian::write_u32(&mut page[PAGE_NEXT..], id);
}

pub fn num_records(page: &[u8]) -> u16 {
    LittleEndian::read_u16(&page[PAGE_NUM_RECORDS..])
}

pub fn free_bytes(page: &[u8]) -> u16 {
    LittleEndian::read_u16(&page[PAGE_FREE_BYTES..])
}

pub fn free_data(page: &[u8]) -> u16 {
    LittleEndian::read_u16(&page[PAGE_FREE_DATA..])
}

/// Append a record to the page.
///
/// Requires `record.len() + 4` contiguous free bytes (record plus a new
/// slot); returns `false` without touching the page when they are not
/// available. On success the record lands immediately after the current
/// last record, a new slot is prepended to the slot array, and the header
/// counts are updated.
pub fn insert(page: &mut [u8], record: &[u8]) -> bool {
    let page_size = page.len();
    let required = record.len() + SLOT_SIZE;
    if (free_data(page) as usize) < required {
        return false;
    }

    let nrecords = num_records(page) as usize;
    let slot_array = nrecords * SLOT_SIZE;
    let offset = page_size - slot_array - free_data(page) as usize;

    page[offset..offset + record.len()].copy_from_slice(record);

    let slot_at = page_size - slot_array - SLOT_SIZE;
    LittleEndian::write_u16(&mut page[slot_at..], offset as u16);
    LittleEndian::write_u16(&mut page[slot_at + 2..], record.len() as u16);

    let new_free_data = page_size - (slot_array + SLOT_SIZE) - (offset + record.len());
    LittleEndian::write_u16(&mut page[PAGE_NUM_RECORDS..], (nrecords + 1) as u16);
    let remaining = free_bytes(page) - required as u16;
    LittleEndian::write_u16(&mut page[PAGE_FREE_BYTES..], remaining);
    LittleEndian::write_u16(&mut page[PAGE_FREE_DATA..], new_free_data as u16);

    true
}

/// The `(offset, length)` pair of slot `i`. Slot 0 is the oldest record.
pub fn slot(page: &[u8], i: usize) -> (u16, u16) {
    let at = page.len() - SLOT_SIZE * (i + 1);
    (
        LittleEndian::read_u16(&page[at..]),
        LittleEndian::read_u16(&page[at + 2..]),
    )
}

/// The raw bytes of record `i` in slot order.
pub fn record_bytes(page: &[u8], i: usize) -> &[u8] {
    let (offset, length) = slot(page, i);
    &page[offset as usize..(offset + length) as usize]
}
