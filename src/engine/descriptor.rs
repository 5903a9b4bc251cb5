//! Buffer descriptors.
//!
//! Each frame of the buffer pool is described, index for index, by one
//! [`BufferDesc`]: which page the frame holds ([`BufferTag`]), how many
//! borrowers have it pinned, how often it has been used, and whether its
//! contents differ from disk. An empty descriptor holds no tag.
//!
//! Descriptors never point at frames; they pair with them by position in
//! [`DescriptorTable`], which also owns the two lookup scans (by tag and
//! for an empty slot).

use crate::engine::file::FileId;

/// `(fileId, pageId)`: the identity of one on-disk page. At most one
/// descriptor in the table carries a given tag at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferTag {
    pub file_id: FileId,
    pub page_id: u32,
}

impl BufferTag {
    pub fn new(file_id: FileId, page_id: u32) -> Self {
        BufferTag { file_id, page_id }
    }
}

/// Metadata for one buffer frame.
#[derive(Debug)]
pub struct BufferDesc {
    tag: Option<BufferTag>,
    pin_count: u32,
    use_count: u32,
    dirty: bool,
    valid: bool,
}

impl BufferDesc {
    fn new() -> Self {
        BufferDesc {
            tag: None,
            pin_count: 0,
            use_count: 0,
            dirty: false,
            valid: true,
        }
    }

    pub fn tag(&self) -> Option<BufferTag> {
        self.tag
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    pub fn use_count(&self) -> u32 {
        self.use_count
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// False while an I/O is in flight on the frame.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_unused(&self) -> bool {
        self.tag.is_none()
    }

    pub fn pin(&mut self) {
        self.pin_count += 1;
        self.use_count += 1;
    }

    /// Drop one pin. Clamped at zero: an unmatched release must not wrap
    /// the counter and wedge the frame as permanently pinned.
    pub fn unpin(&mut self) {
        self.pin_count = self.pin_count.saturating_sub(1);
    }

    pub fn set_tag(&mut self, tag: BufferTag) {
        self.tag = Some(tag);
    }

    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn start_io(&mut self) {
        self.valid = false;
    }

    pub fn end_io(&mut self) {
        self.valid = true;
    }

    /// Clear the descriptor after its frame has been flushed out.
    pub fn reset(&mut self) {
        self.tag = None;
        self.pin_count = 0;
        self.use_count = 0;
        self.dirty = false;
    }
}

/// The descriptor array, parallel to the buffer pool's frames.
pub struct DescriptorTable {
    descriptors: Vec<BufferDesc>,
}

impl DescriptorTable {
    pub fn new(size: usize) -> Self {
        DescriptorTable {
            descriptors: (0..size).map(|_| BufferDesc::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, frame: usize) -> &BufferDesc {
        &self.descriptors[frame]
    }

    pub fn get_mut(&mut self, frame: usize) -> &mut BufferDesc {
        &mut self.descriptors[frame]
    }

    /// Linear scan for the frame holding `tag`.
    pub fn find_by_tag(&self, tag: BufferTag) -> Option<usize> {
        self.descriptors.iter().position(|d| d.tag == Some(tag))
    }

    /// Linear scan for an unused descriptor. The winner is immediately
    /// marked invalid, claiming it for the caller's upcoming I/O.
    pub fn find_empty(&mut self) -> Option<usize> {
        let frame = self.descriptors.iter().position(|d| d.is_unused())?;
        self.descriptors[frame].start_io();
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(page_id: u32) -> BufferTag {
        BufferTag::new(FileId::Data, page_id)
    }

    #[test]
    fn test_new_table_is_all_unused() {
        let table = DescriptorTable::new(4);
        assert_eq!(table.len(), 4);
        assert!((0..4).all(|i| table.get(i).is_unused()));
        assert!((0..4).all(|i| table.get(i).is_valid()));
    }

    #[test]
    fn test_pin_bumps_both_counters() {
        let mut table = DescriptorTable::new(1);
        let desc = table.get_mut(0);
        desc.pin();
        desc.pin();
        assert_eq!(desc.pin_count(), 2);
        assert_eq!(desc.use_count(), 2);

        desc.unpin();
        assert_eq!(desc.pin_count(), 1);
        // use_count keeps history.
        assert_eq!(desc.use_count(), 2);
    }

    #[test]
    fn test_unpin_clamps_at_zero() {
        let mut table = DescriptorTable::new(1);
        let desc = table.get_mut(0);
        desc.unpin();
        assert_eq!(desc.pin_count(), 0);
    }

    #[test]
    fn test_find_by_tag() {
        let mut table = DescriptorTable::new(3);
        table.get_mut(1).set_tag(tag(42));
        assert_eq!(table.find_by_tag(tag(42)), Some(1));
        assert_eq!(table.find_by_tag(tag(43)), None);
    }

    #[test]
    fn test_find_empty_claims_descriptor() {
        let mut table = DescriptorTable::new(2);
        table.get_mut(0).set_tag(tag(1));

        let frame = table.find_empty().unwrap();
        assert_eq!(frame, 1);
        // Claimed: marked invalid so nobody else grabs it mid-I/O.
        assert!(!table.get(1).is_valid());

        table.get_mut(1).set_tag(tag(2));
        assert_eq!(table.find_empty(), None);
    }

    #[test]
    fn test_reset_clears_everything_but_validity() {
        let mut table = DescriptorTable::new(1);
        let desc = table.get_mut(0);
        desc.set_tag(tag(9));
        desc.pin();
        desc.set_dirty();
        desc.reset();

        assert!(desc.is_unused());
        assert_eq!(desc.pin_count(), 0);
        assert_eq!(desc.use_count(), 0);
        assert!(!desc.is_dirty());
    }
}
