//! Free-inode and free-data-block tracking.
//!
//! Nothing about free space is persisted. The queues live only for the
//! duration of a mount and are rebuilt by a full scan of the inode table
//! every time, an fsck in miniature. Reuse order is FIFO: freed numbers go
//! to the back of their queue and allocation pops the front, so a fresh
//! mount hands out inodes in slot order and data blocks in ascending block
//! order.

use std::collections::{HashSet, VecDeque};

use crate::config::*;
use crate::disk::Disk;
use crate::error::{FsError, Result};
use crate::inode::Inode;
use crate::superblock::SuperBlock;

#[derive(Debug, Default)]
pub struct FreeLists {
    inodes: VecDeque<u32>,
    blocks: VecDeque<u32>,
}

impl FreeLists {
    pub fn new() -> Self {
        FreeLists::default()
    }

    /// Seeds the queues for a freshly formatted image: every inode slot and
    /// every block past the inode table is free.
    pub fn seed(sb: &SuperBlock) -> Self {
        FreeLists {
            inodes: (0..sb.inodes).collect(),
            blocks: (sb.inode_blocks..sb.blocks).collect(),
        }
    }

    /// Rebuilds the queues by scanning the whole inode table.
    ///
    /// Invalid slots are free inodes. For valid slots every nonzero link is
    /// busy, as is the indirect block itself; the link walk stops at the
    /// first zero, which marks the unallocated tail. Whatever block in the
    /// data region is left over is free, collected in ascending order.
    pub fn rebuild(disk: &mut Disk, sb: &SuperBlock) -> Result<Self> {
        let mut lists = FreeLists::new();
        let mut busy: HashSet<u32> = HashSet::new();

        let mut block = ZERO_BLOCK;
        let mut indirect_block = ZERO_BLOCK;
        for table_block in 0..sb.inode_blocks {
            disk.read(table_block, &mut block)?;
            for slot in 0..INODES_PER_BLOCK as u32 {
                let number = table_block * INODES_PER_BLOCK as u32 + slot;
                if !Inode::peek_valid(number, &block) {
                    lists.inodes.push_back(number);
                    continue;
                }
                let mut inode = Inode::decode(number, &block);
                if inode.indirect != 0 {
                    busy.insert(inode.indirect);
                    disk.read(inode.indirect, &mut indirect_block)?;
                    inode.load_indirect(&indirect_block)?;
                }
                for idx in 0..MAX_FILE_BLOCKS {
                    let link = inode.link(idx)?;
                    if link == 0 {
                        break;
                    }
                    busy.insert(link);
                }
            }
        }

        for candidate in sb.inode_blocks..sb.blocks {
            if !busy.contains(&candidate) {
                lists.blocks.push_back(candidate);
            }
        }
        log::debug!(
            "free list scan: {} free inodes, {} free data blocks",
            lists.inodes.len(),
            lists.blocks.len()
        );
        Ok(lists)
    }

    pub fn alloc_inode(&mut self) -> Result<u32> {
        self.inodes.pop_front().ok_or(FsError::OutOfInodes)
    }

    pub fn alloc_block(&mut self) -> Result<u32> {
        self.blocks.pop_front().ok_or(FsError::OutOfBlocks)
    }

    pub fn release_inode(&mut self, number: u32) {
        self.inodes.push_back(number);
    }

    pub fn release_block(&mut self, block: u32) {
        self.blocks.push_back(block);
    }

    pub fn free_inodes(&self) -> usize {
        self.inodes.len()
    }

    pub fn free_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn clear(&mut self) {
        self.inodes.clear();
        self.blocks.clear();
    }
}
