//! Byte-range reads, writes and truncation against an inode's block links.
//!
//! A request covers `[start, start + len)` of the file's logical byte
//! space. The range is split into a partial head block, fully covered
//! middle blocks and a partial tail block; writes allocate missing data
//! blocks (and the indirect block, once the range crosses the direct
//! region) zero-filled before any byte is copied.

use crate::config::*;
use crate::error::{FsError, Result};
use crate::inode::Inode;
use crate::FileSystem;

impl FileSystem {
    /// Loads the indirect link extension if the inode has one on disk and it
    /// is not in memory yet.
    pub(crate) fn ensure_indirect(&mut self, inode: &mut Inode) -> Result<()> {
        if inode.indirect != 0 && !inode.indirect_loaded() {
            let mut block = ZERO_BLOCK;
            self.disk.read(inode.indirect, &mut block)?;
            inode.load_indirect(&block)?;
        }
        Ok(())
    }

    /// Reads `buf.len()` bytes at `start` into `buf`. The whole range must
    /// lie within the file. Returns the number of bytes read; an empty
    /// buffer reads nothing and succeeds.
    pub fn read(&mut self, inode: &mut Inode, buf: &mut [u8], start: usize) -> Result<usize> {
        self.ensure_mounted();
        if buf.is_empty() {
            return Ok(0);
        }
        let end = start + buf.len() - 1;
        if end >= inode.size as usize {
            return Err(FsError::OutOfBounds);
        }
        self.ensure_indirect(inode)?;

        let start_block = start / BLOCK_SIZE;
        let end_block = end / BLOCK_SIZE;
        let mut block = ZERO_BLOCK;
        let mut copied = 0;
        for idx in start_block..=end_block {
            let link = inode.link(idx)?;
            if link == 0 {
                return Err(FsError::DanglingLink);
            }
            self.disk.read(link, &mut block)?;
            let from = if idx == start_block { start % BLOCK_SIZE } else { 0 };
            let to = if idx == end_block { end % BLOCK_SIZE + 1 } else { BLOCK_SIZE };
            buf[copied..copied + (to - from)].copy_from_slice(&block[from..to]);
            copied += to - from;
        }
        Ok(copied)
    }

    /// Writes `buf` at `start`, growing the file as needed up to the
    /// maximum addressable size. Returns the number of bytes written; an
    /// empty buffer writes nothing and succeeds. The inode record (and the
    /// indirect block, when touched) is persisted only if something changed.
    pub fn write(&mut self, inode: &mut Inode, buf: &[u8], start: usize) -> Result<usize> {
        self.ensure_mounted();
        if buf.is_empty() {
            return Ok(0);
        }
        let end = start + buf.len() - 1;
        if end >= MAX_FILE_BLOCKS * BLOCK_SIZE {
            return Err(FsError::FileTooLarge);
        }
        self.ensure_indirect(inode)?;

        let start_block = start / BLOCK_SIZE;
        let end_block = end / BLOCK_SIZE;
        let mut dirty = false;

        // Make sure every covered block index has a backing block before any
        // data moves.
        for idx in start_block..=end_block {
            if idx >= DIRECT_LINKS && inode.indirect == 0 {
                let fresh = self.free.alloc_block()?;
                self.disk.write(fresh, &ZERO_BLOCK)?;
                inode.attach_indirect(fresh);
                dirty = true;
            }
            if inode.link(idx)? == 0 {
                let fresh = self.free.alloc_block()?;
                self.disk.write(fresh, &ZERO_BLOCK)?;
                inode.set_link(idx, fresh)?;
                dirty = true;
            }
        }

        let mut block = ZERO_BLOCK;
        let mut copied = 0;
        for idx in start_block..=end_block {
            let link = inode.link(idx)?;
            let from = if idx == start_block { start % BLOCK_SIZE } else { 0 };
            let to = if idx == end_block { end % BLOCK_SIZE + 1 } else { BLOCK_SIZE };
            if to - from == BLOCK_SIZE {
                block.copy_from_slice(&buf[copied..copied + BLOCK_SIZE]);
            } else {
                self.disk.read(link, &mut block)?;
                block[from..to].copy_from_slice(&buf[copied..copied + (to - from)]);
            }
            self.disk.write(link, &block)?;
            copied += to - from;
        }

        if end + 1 > inode.size as usize {
            inode.size = (end + 1) as u32;
            dirty = true;
        }
        if dirty {
            self.persist_inode(inode)?;
        }
        Ok(copied)
    }

    /// Writes `buf` at the current end of the file.
    pub fn append(&mut self, inode: &mut Inode, buf: &[u8]) -> Result<usize> {
        let at = inode.size as usize;
        self.write(inode, buf, at)
    }

    /// Reads the whole file content.
    pub fn read_to_end(&mut self, inode: &mut Inode) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; inode.size as usize];
        self.read(inode, &mut buf, 0)?;
        Ok(buf)
    }

    /// Shrinks the file to `offset` bytes. Every block past the one holding
    /// the last kept byte goes back to the free pool; the indirect block is
    /// released once the file fits in the direct links again; the kept tail
    /// block is zero-filled from `offset` to its end. `offset` must be 0 or
    /// lie within the file.
    pub fn truncate(&mut self, inode: &mut Inode, offset: usize) -> Result<()> {
        self.ensure_mounted();
        if offset != 0 && offset >= inode.size as usize {
            return Err(FsError::OutOfBounds);
        }
        self.ensure_indirect(inode)?;

        let kept_blocks = offset.div_ceil(BLOCK_SIZE);
        for idx in kept_blocks..MAX_FILE_BLOCKS {
            let link = inode.link(idx)?;
            if link != 0 {
                self.free.release_block(link);
                inode.set_link(idx, 0)?;
            }
        }
        if inode.indirect != 0 && kept_blocks <= DIRECT_LINKS {
            self.free.release_block(inode.indirect);
            inode.detach_indirect();
        }

        if offset > 0 {
            let last = (offset - 1) / BLOCK_SIZE;
            let fill_from = offset - last * BLOCK_SIZE;
            if fill_from < BLOCK_SIZE {
                let link = inode.link(last)?;
                if link == 0 {
                    return Err(FsError::DanglingLink);
                }
                let mut block = ZERO_BLOCK;
                self.disk.read(link, &mut block)?;
                block[fill_from..].fill(0);
                self.disk.write(link, &block)?;
            }
        }

        inode.size = offset as u32;
        self.persist_inode(inode)
    }
}
