//! The buffer pool.
//!
//! A fixed array of page-sized frames, owned here and borrowed out by
//! index. The pool knows nothing about eviction or pinning (that is the
//! descriptor table's business); it only moves whole pages between frames
//! and the files in a [`FileRegistry`].

use tracing::trace;

use crate::engine::descriptor::{BufferTag, DescriptorTable};
use crate::engine::file::FileRegistry;
use crate::RowdbError;

/// `size` page frames, paired index for index with the descriptor table.
pub struct BufferPool {
    frames: Vec<Box<[u8]>>,
}

impl BufferPool {
    pub fn new(size: usize, page_size: usize) -> Self {
        BufferPool {
            frames: (0..size)
                .map(|_| vec![0u8; page_size].into_boxed_slice())
                .collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, i: usize) -> &[u8] {
        &self.frames[i]
    }

    pub fn frame_mut(&mut self, i: usize) -> &mut [u8] {
        &mut self.frames[i]
    }

    pub fn zero_frame(&mut self, i: usize) {
        self.frames[i].fill(0);
    }

    /// Read the page named by `tag` from disk into frame `frame`.
    pub fn read(
        &mut self,
        registry: &mut FileRegistry,
        frame: usize,
        tag: BufferTag,
    ) -> Result<(), RowdbError> {
        trace!(page_id = tag.page_id, frame, "reading page into frame");
        registry
            .handle(tag.file_id)?
            .read_page(tag.page_id, &mut self.frames[frame])
    }

    /// Write frame `frame` back to disk. The destination comes from the
    /// frame's descriptor tag, not from the caller; a frame without a tag
    /// has nowhere to go and nothing to say, so it is skipped.
    pub fn flush(
        &self,
        registry: &mut FileRegistry,
        descriptors: &DescriptorTable,
        frame: usize,
    ) -> Result<(), RowdbError> {
        let Some(tag) = descriptors.get(frame).tag() else {
            return Ok(());
        };
        trace!(page_id = tag.page_id, frame, "flushing frame");
        registry
            .handle(tag.file_id)?
            .write_page(tag.page_id, &self.frames[frame])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::Config;
    use crate::engine::file::FileId;
    use tempfile::TempDir;

    const PAGE_SIZE: usize = 128;

    fn setup(dir: &TempDir) -> (BufferPool, FileRegistry, DescriptorTable) {
        let config = Config::new(dir.path().join("data.rdb"), PAGE_SIZE, 2);
        (
            BufferPool::new(2, PAGE_SIZE),
            FileRegistry::new(&config),
            DescriptorTable::new(2),
        )
    }

    #[test]
    fn test_flush_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let (mut pool, mut registry, mut descriptors) = setup(&dir);
        let tag = BufferTag::new(FileId::Data, 1);

        pool.frame_mut(0).fill(0xC3);
        descriptors.get_mut(0).set_tag(tag);
        pool.flush(&mut registry, &descriptors, 0).unwrap();

        pool.read(&mut registry, 1, tag).unwrap();
        assert_eq!(pool.frame(1), pool.frame(0));
    }

    #[test]
    fn test_read_missing_page_is_short_read() {
        let dir = TempDir::new().unwrap();
        let (mut pool, mut registry, _) = setup(&dir);
        let err = pool
            .read(&mut registry, 0, BufferTag::new(FileId::Data, 5))
            .unwrap_err();
        assert!(matches!(err, RowdbError::ShortRead { page_id: 5, .. }));
    }

    #[test]
    fn test_flush_of_untagged_frame_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let (mut pool, mut registry, descriptors) = setup(&dir);
        pool.frame_mut(0).fill(0xEE);
        pool.flush(&mut registry, &descriptors, 0).unwrap();
        // Nothing was written: the data file was never even created at
        // page 1's length.
        assert_eq!(registry.next_page_id(FileId::Data).unwrap(), 1);
    }

    #[test]
    fn test_zero_frame() {
        let dir = TempDir::new().unwrap();
        let (mut pool, _, _) = setup(&dir);
        pool.frame_mut(0).fill(0xFF);
        pool.zero_frame(0);
        assert!(pool.frame(0).iter().all(|&b| b == 0));
    }
}
