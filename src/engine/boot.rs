//! The boot page.
//!
//! Page 1 of the data file carries the engine version and the page size
//! the file was created with. It has no page header and no records, just
//! the four fields below at fixed byte positions, with the rest of the
//! page zeroed:
//!
//! | Offset | Size | Field |
//! |--------|------|----------------|
//! | 0      | 2    | major\_version |
//! | 2      | 4    | minor\_version |
//! | 6      | 4    | patch\_num     |
//! | 10     | 2    | page\_size     |
//!
//! A zero major version means the file has never been initialized; that
//! is how `initdb` decides whether to run.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::engine::bufmgr::BufferManager;
use crate::engine::constants::*;
use crate::engine::descriptor::BufferTag;
use crate::engine::file::FileId;
use crate::RowdbError;

/// Parsed copy of the boot page fields.
#[derive(Debug, Clone, Serialize)]
pub struct BootPage {
    pub major_version: u16,
    pub minor_version: u32,
    pub patch_num: u32,
    pub page_size: u16,
}

impl BootPage {
    /// Parse the boot fields from a page buffer.
    pub fn parse(page: &[u8]) -> Option<Self> {
        if page.len() < BOOT_PAGE_SIZE + 2 {
            return None;
        }
        Some(BootPage {
            major_version: LittleEndian::read_u16(&page[BOOT_MAJOR_VERSION..]),
            minor_version: LittleEndian::read_u32(&page[BOOT_MINOR_VERSION..]),
            patch_num: LittleEndian::read_u32(&page[BOOT_PATCH_NUM..]),
            page_size: LittleEndian::read_u16(&page[BOOT_PAGE_SIZE..]),
        })
    }
}

/// Zero a frame and write the boot fields into it. Only `initdb` calls
/// this; rewriting the boot page of a live database would orphan every
/// page behind it.
pub fn format_boot_page(page: &mut [u8], page_size: u16) {
    page.fill(0);
    LittleEndian::write_u16(&mut page[BOOT_MAJOR_VERSION..], MAJOR_VERSION);
    LittleEndian::write_u32(&mut page[BOOT_MINOR_VERSION..], MINOR_VERSION);
    LittleEndian::write_u32(&mut page[BOOT_PATCH_NUM..], PATCH_NUM);
    LittleEndian::write_u16(&mut page[BOOT_PAGE_SIZE..], page_size);
}

/// Read the boot page through the buffer manager.
pub fn read_boot_page(buf: &mut BufferManager) -> Result<BootPage, RowdbError> {
    let tag = BufferTag::new(FileId::Data, BOOT_PAGE_ID);
    let frame = buf.request(tag)?;
    let parsed = BootPage::parse(buf.page(frame));
    buf.release(frame);
    parsed.ok_or_else(|| RowdbError::Parse("boot page shorter than its field map".to_string()))
}
