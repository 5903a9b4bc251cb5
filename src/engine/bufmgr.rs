//! The buffer manager.
//!
//! Front door for every page access. `request` hands out a pinned frame
//! index for a [`BufferTag`], loading the page from disk into an empty or
//! evicted frame on a cache miss; `release` drops the pin. `allocate`
//! claims a brand-new page id from the file registry and stamps a zeroed
//! frame with it; `page_split` grows a page chain by one page at its
//! tail.
//!
//! Every `request`/`allocate` must be paired with exactly one `release`
//! on every exit path; a frame with a nonzero pin count is never evicted.
//! Eviction is first-fit-unpinned and always writes the victim frame
//! back, dirty or not; dirty-only flushing is a future optimization.

use tracing::debug;

use crate::engine::config::Config;
use crate::engine::descriptor::{BufferDesc, BufferTag, DescriptorTable};
use crate::engine::file::{FileId, FileRegistry};
use crate::engine::page;
use crate::engine::pool::BufferPool;
use crate::RowdbError;

/// Owns the buffer pool, the descriptor table, and the file registry.
pub struct BufferManager {
    config: Config,
    registry: FileRegistry,
    pool: BufferPool,
    descriptors: DescriptorTable,
}

impl BufferManager {
    pub fn new(config: &Config) -> Self {
        BufferManager {
            config: config.clone(),
            registry: FileRegistry::new(config),
            pool: BufferPool::new(config.bufpool_size, config.page_size),
            descriptors: DescriptorTable::new(config.bufpool_size),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Borrow the page held by a pinned frame.
    pub fn page(&self, frame: usize) -> &[u8] {
        self.pool.frame(frame)
    }

    /// Mutably borrow the page held by a pinned frame. Callers that
    /// change page bytes must also [`mark_dirty`](Self::mark_dirty).
    pub fn page_mut(&mut self, frame: usize) -> &mut [u8] {
        self.pool.frame_mut(frame)
    }

    pub fn descriptor(&self, frame: usize) -> &BufferDesc {
        self.descriptors.get(frame)
    }

    pub fn mark_dirty(&mut self, frame: usize) {
        self.descriptors.get_mut(frame).set_dirty();
    }

    /// Pin and return the frame holding `tag`, loading the page from disk
    /// if it is not cached. The caller must `release` the frame.
    pub fn request(&mut self, tag: BufferTag) -> Result<usize, RowdbError> {
        if tag.page_id == 0 {
            return Err(RowdbError::BadPageId(0));
        }

        if let Some(frame) = self.descriptors.find_by_tag(tag) {
            self.descriptors.get_mut(frame).pin();
            return Ok(frame);
        }

        let frame = self.take_frame()?;
        if let Err(e) = self.pool.read(&mut self.registry, frame, tag) {
            // Surrender the claimed frame so the failed request leaves no
            // trace in the pool.
            let desc = self.descriptors.get_mut(frame);
            desc.reset();
            desc.end_io();
            return Err(e);
        }

        let desc = self.descriptors.get_mut(frame);
        desc.set_tag(tag);
        desc.end_io();
        desc.pin();
        debug!(page_id = tag.page_id, frame, "loaded page");
        Ok(frame)
    }

    /// Unpin a frame previously returned by `request`, `allocate`, or
    /// `page_split`.
    pub fn release(&mut self, frame: usize) {
        self.descriptors.get_mut(frame).unpin();
    }

    /// Claim the next page id of `file_id`, stamp it into a zeroed frame,
    /// and return the frame pinned. The page reaches disk when the frame
    /// is flushed or evicted.
    pub fn allocate(&mut self, file_id: FileId) -> Result<usize, RowdbError> {
        let page_id = self.registry.allocate_new_page_id(file_id)?;
        let frame = self.take_frame()?;

        self.pool.zero_frame(frame);
        page::set_page_id(self.pool.frame_mut(frame), page_id);

        let desc = self.descriptors.get_mut(frame);
        desc.set_tag(BufferTag::new(file_id, page_id));
        desc.end_io();
        desc.pin();
        desc.set_dirty();
        debug!(page_id, frame, "allocated new page");
        Ok(frame)
    }

    /// Append a fresh page to the tail of a chain.
    ///
    /// `frame` must hold the chain's last page (`nextPageId == 0`) and be
    /// pinned by the caller. On success the old page points at the new
    /// one and vice versa, the old frame's pin is released, and the new
    /// frame is returned pinned. A non-tail page fails with
    /// `SplitUnsupported` and mutates nothing.
    pub fn page_split(&mut self, frame: usize) -> Result<usize, RowdbError> {
        let old_tag = self.descriptors.get(frame).tag().ok_or_else(|| {
            RowdbError::Parse("page split on an empty buffer frame".to_string())
        })?;
        if page::next_page_id(self.pool.frame(frame)) != 0 {
            return Err(RowdbError::SplitUnsupported(old_tag.page_id));
        }

        let new_frame = self.allocate(old_tag.file_id)?;
        let new_page_id = page::page_id(self.pool.frame(new_frame));

        page::init_data_page(self.pool.frame_mut(new_frame));
        page::set_prev_page_id(self.pool.frame_mut(new_frame), old_tag.page_id);
        page::set_next_page_id(self.pool.frame_mut(frame), new_page_id);
        self.descriptors.get_mut(frame).set_dirty();

        self.release(frame);
        debug!(
            old_page_id = old_tag.page_id,
            new_page_id, "split chain tail"
        );
        Ok(new_frame)
    }

    /// Write the page named by `tag` back to disk, if cached, and drop it
    /// from the cache (the descriptor is reset after a successful write).
    pub fn flush_page(&mut self, tag: BufferTag) -> Result<(), RowdbError> {
        if let Some(frame) = self.descriptors.find_by_tag(tag) {
            self.pool.flush(&mut self.registry, &self.descriptors, frame)?;
            self.descriptors.get_mut(frame).reset();
        }
        Ok(())
    }

    /// Write every cached page back to disk. Unlike [`flush_page`](Self::flush_page)
    /// this keeps all descriptors intact, so the cache stays warm.
    pub fn flush_all(&mut self) -> Result<(), RowdbError> {
        for frame in 0..self.descriptors.len() {
            self.pool.flush(&mut self.registry, &self.descriptors, frame)?;
        }
        Ok(())
    }

    /// An empty frame, or an evicted one.
    fn take_frame(&mut self) -> Result<usize, RowdbError> {
        if let Some(frame) = self.descriptors.find_empty() {
            return Ok(frame);
        }
        self.evict()
    }

    /// First-fit-unpinned eviction: flush the victim unconditionally,
    /// reset its descriptor, and hand the claimed frame to the caller.
    fn evict(&mut self) -> Result<usize, RowdbError> {
        let frame = (0..self.descriptors.len())
            .find(|&i| self.descriptors.get(i).pin_count() == 0)
            .ok_or(RowdbError::NoVictim(self.descriptors.len()))?;

        if let Some(tag) = self.descriptors.get(frame).tag() {
            debug!(page_id = tag.page_id, frame, "evicting page");
        }
        self.descriptors.get_mut(frame).start_io();
        self.pool.flush(&mut self.registry, &self.descriptors, frame)?;
        self.descriptors.get_mut(frame).reset();
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PAGE_SIZE: usize = 128;

    fn manager(dir: &TempDir, bufpool_size: usize) -> BufferManager {
        let config = Config::new(dir.path().join("data.rdb"), PAGE_SIZE, bufpool_size);
        BufferManager::new(&config)
    }

    fn tag(page_id: u32) -> BufferTag {
        BufferTag::new(FileId::Data, page_id)
    }

    #[test]
    fn test_request_page_zero_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 2);
        assert!(matches!(buf.request(tag(0)), Err(RowdbError::BadPageId(0))));
    }

    #[test]
    fn test_request_missing_page_leaves_no_trace() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 2);
        assert!(matches!(
            buf.request(tag(1)),
            Err(RowdbError::ShortRead { .. })
        ));
        assert!(buf.descriptor(0).is_unused());
        assert!(buf.descriptor(0).is_valid());
        assert_eq!(buf.descriptor(0).pin_count(), 0);
    }

    #[test]
    fn test_allocate_then_request_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 2);

        let frame = buf.allocate(FileId::Data).unwrap();
        assert_eq!(page::page_id(buf.page(frame)), 1);
        assert_eq!(buf.descriptor(frame).pin_count(), 1);
        buf.page_mut(frame)[100] = 0x77;
        buf.mark_dirty(frame);
        buf.release(frame);
        buf.flush_all().unwrap();

        // A request for the same tag hits the cache without I/O.
        let again = buf.request(tag(1)).unwrap();
        assert_eq!(again, frame);
        assert_eq!(buf.page(again)[100], 0x77);
        buf.release(again);
    }

    #[test]
    fn test_pin_returns_to_prior_value_and_use_count_grows() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 2);

        let frame = buf.allocate(FileId::Data).unwrap();
        buf.release(frame);

        let pins_before = buf.descriptor(frame).pin_count();
        let uses_before = buf.descriptor(frame).use_count();
        let frame = buf.request(tag(1)).unwrap();
        buf.release(frame);
        assert_eq!(buf.descriptor(frame).pin_count(), pins_before);
        assert!(buf.descriptor(frame).use_count() > uses_before);
    }

    #[test]
    fn test_allocation_advances_page_ids() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 4);

        let a = buf.allocate(FileId::Data).unwrap();
        let b = buf.allocate(FileId::Data).unwrap();
        assert_eq!(page::page_id(buf.page(a)), 1);
        assert_eq!(page::page_id(buf.page(b)), 2);
        // Only the returned frame holds the new page id.
        assert_eq!(
            (0..4)
                .filter(|&i| buf.descriptor(i).tag() == Some(tag(2)))
                .count(),
            1
        );
        buf.release(a);
        buf.release(b);
    }

    #[test]
    fn test_single_frame_eviction_cycle() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 1);

        // Page 1 occupies the only frame, gets written, then unpinned.
        let frame = buf.allocate(FileId::Data).unwrap();
        buf.page_mut(frame)[50] = 0xAA;
        buf.mark_dirty(frame);
        buf.release(frame);
        assert_eq!(buf.descriptor(0).pin_count(), 0);

        // Allocating page 2 must evict page 1, flushing it first.
        let frame = buf.allocate(FileId::Data).unwrap();
        assert_eq!(frame, 0);
        assert_eq!(buf.descriptor(0).tag(), Some(tag(2)));
        buf.release(frame);

        // Page 1 comes back from disk with its byte intact.
        let frame = buf.request(tag(1)).unwrap();
        assert_eq!(frame, 0);
        assert_eq!(buf.page(frame)[50], 0xAA);
        assert_eq!(buf.descriptor(0).pin_count(), 1);
        buf.release(frame);
    }

    #[test]
    fn test_no_victim_when_everything_is_pinned() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 1);

        let frame = buf.allocate(FileId::Data).unwrap();
        assert!(matches!(
            buf.allocate(FileId::Data),
            Err(RowdbError::NoVictim(1))
        ));
        buf.release(frame);
    }

    #[test]
    fn test_page_split_links_the_chain() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 4);

        let old = buf.allocate(FileId::Data).unwrap();
        page::init_data_page(buf.page_mut(old));

        let new = buf.page_split(old).unwrap();
        let new_id = page::page_id(buf.page(new));
        assert_eq!(new_id, 2);
        assert_eq!(page::prev_page_id(buf.page(new)), 1);
        assert_eq!(page::next_page_id(buf.page(new)), 0);
        // Old frame was unpinned by the split; its header points forward.
        assert_eq!(buf.descriptor(old).pin_count(), 0);
        assert_eq!(page::next_page_id(buf.page(old)), 2);
        assert_eq!(buf.descriptor(new).pin_count(), 1);
        buf.release(new);
    }

    #[test]
    fn test_page_split_refuses_non_tail_pages() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 4);

        let frame = buf.allocate(FileId::Data).unwrap();
        page::init_data_page(buf.page_mut(frame));
        page::set_next_page_id(buf.page_mut(frame), 9);
        let snapshot = buf.page(frame).to_vec();

        assert!(matches!(
            buf.page_split(frame),
            Err(RowdbError::SplitUnsupported(1))
        ));
        // No header field moved.
        assert_eq!(buf.page(frame), &snapshot[..]);
        buf.release(frame);
    }

    #[test]
    fn test_flush_page_drops_the_cache_entry() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 2);

        let frame = buf.allocate(FileId::Data).unwrap();
        buf.page_mut(frame)[42] = 0x42;
        buf.mark_dirty(frame);
        buf.flush_page(tag(1)).unwrap();
        assert!(buf.descriptor(frame).is_unused());

        // The page is gone from the cache but present on disk.
        let frame = buf.request(tag(1)).unwrap();
        assert_eq!(buf.page(frame)[42], 0x42);
        buf.release(frame);
    }

    #[test]
    fn test_flush_all_keeps_descriptors() {
        let dir = TempDir::new().unwrap();
        let mut buf = manager(&dir, 2);

        let frame = buf.allocate(FileId::Data).unwrap();
        buf.release(frame);
        buf.flush_all().unwrap();
        assert_eq!(buf.descriptor(frame).tag(), Some(tag(1)));
    }
}
