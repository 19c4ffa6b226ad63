//! The inode record codec.
//!
//! An inode occupies a fixed 32-byte slot inside the inode-table blocks:
//! a mask (bit 0 = valid, bit 1 = directory, only meaningful when valid),
//! the byte size, [`DIRECT_LINKS`] direct block links and one indirect
//! pointer, all big-endian u32. When the indirect pointer is nonzero,
//! another [`LINKS_PER_INDIRECT`] links live inside the indirect block and
//! must be loaded with [`Inode::load_indirect`] before links past the direct
//! region are touched.

use crate::config::*;
use crate::error::{FsError, Result};

const MASK_VALID: u32 = 1 << 0;
const MASK_DIR: u32 = 1 << 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    /// Positional inode number; not stored in the record itself.
    pub number: u32,
    pub valid: bool,
    pub is_dir: bool,
    pub size: u32,
    pub indirect: u32,
    links: Vec<u32>,
}

impl Inode {
    /// A fresh, zero-sized valid inode. Nothing is persisted here.
    pub fn new(number: u32, is_dir: bool) -> Self {
        Inode {
            number,
            valid: true,
            is_dir,
            size: 0,
            indirect: 0,
            links: vec![0; DIRECT_LINKS],
        }
    }

    /// Which inode-table block holds the record of inode `number`.
    pub fn block_of(number: u32) -> u32 {
        number / INODES_PER_BLOCK as u32
    }

    fn slot(number: u32) -> usize {
        (number as usize % INODES_PER_BLOCK) * INODE_SIZE
    }

    /// Checks only the valid bit of the record, without decoding the rest.
    pub fn peek_valid(number: u32, block: &Block) -> bool {
        let slot = Self::slot(number);
        let mask = u32::from_be_bytes(block[slot..slot + 4].try_into().unwrap());
        mask & MASK_VALID != 0
    }

    /// Decodes the record of inode `number` out of its containing block.
    /// An invalid slot yields a zeroed, invalid inode; the indirect block is
    /// never consulted here.
    pub fn decode(number: u32, block: &Block) -> Self {
        let slot = Self::slot(number);
        let word = |i: usize| {
            let at = slot + i * 4;
            u32::from_be_bytes(block[at..at + 4].try_into().unwrap())
        };
        let mask = word(0);
        let valid = mask & MASK_VALID != 0;
        let is_dir = mask & MASK_DIR != 0;
        if !valid {
            return Inode {
                number,
                valid: false,
                is_dir: false,
                size: 0,
                indirect: 0,
                links: vec![0; DIRECT_LINKS],
            };
        }
        let mut links = vec![0; DIRECT_LINKS];
        for (i, link) in links.iter_mut().enumerate() {
            *link = word(2 + i);
        }
        Inode {
            number,
            valid,
            is_dir,
            size: word(1),
            indirect: word(2 + DIRECT_LINKS),
            links,
        }
    }

    /// Writes the record back into its slot of the containing block. The
    /// indirect extension is serialized separately via [`Inode::store_indirect`].
    pub fn encode(&self, block: &mut Block) {
        let slot = Self::slot(self.number);
        let mut put = |i: usize, v: u32| {
            let at = slot + i * 4;
            block[at..at + 4].copy_from_slice(&v.to_be_bytes());
        };
        let mut mask = 0;
        if self.valid {
            mask |= MASK_VALID;
            if self.is_dir {
                mask |= MASK_DIR;
            }
        }
        put(0, mask);
        put(1, self.size);
        for i in 0..DIRECT_LINKS {
            put(2 + i, self.links[i]);
        }
        put(2 + DIRECT_LINKS, self.indirect);
    }

    /// Whether the extended link array is present in memory.
    pub fn indirect_loaded(&self) -> bool {
        self.links.len() == MAX_FILE_BLOCKS
    }

    /// Appends the links stored in the indirect block to the link array.
    pub fn load_indirect(&mut self, block: &Block) -> Result<()> {
        if self.indirect == 0 {
            return Err(FsError::NoIndirectBlock);
        }
        self.links.resize(MAX_FILE_BLOCKS, 0);
        for i in 0..LINKS_PER_INDIRECT {
            let at = i * 4;
            self.links[DIRECT_LINKS + i] =
                u32::from_be_bytes(block[at..at + 4].try_into().unwrap());
        }
        Ok(())
    }

    /// Serializes the extended links into the indirect block's content.
    pub fn store_indirect(&self, block: &mut Block) -> Result<()> {
        if self.indirect == 0 {
            return Err(FsError::NoIndirectBlock);
        }
        if !self.indirect_loaded() {
            return Err(FsError::IndirectNotLoaded);
        }
        for i in 0..LINKS_PER_INDIRECT {
            let at = i * 4;
            block[at..at + 4].copy_from_slice(&self.links[DIRECT_LINKS + i].to_be_bytes());
        }
        Ok(())
    }

    /// Attaches a freshly allocated, zero-filled indirect block.
    pub(crate) fn attach_indirect(&mut self, block: u32) {
        self.indirect = block;
        self.links.resize(MAX_FILE_BLOCKS, 0);
    }

    /// Detaches the indirect block, dropping the extended links.
    pub(crate) fn detach_indirect(&mut self) {
        self.indirect = 0;
        self.links.truncate(DIRECT_LINKS);
    }

    /// The block link at index `idx`. Links past the direct region read as 0
    /// while no indirect block exists; once one does, the extension must
    /// have been loaded first.
    pub fn link(&self, idx: usize) -> Result<u32> {
        if idx >= MAX_FILE_BLOCKS {
            return Err(FsError::OutOfBounds);
        }
        if idx < DIRECT_LINKS {
            return Ok(self.links[idx]);
        }
        if self.indirect == 0 {
            return Ok(0);
        }
        if !self.indirect_loaded() {
            return Err(FsError::IndirectNotLoaded);
        }
        Ok(self.links[idx])
    }

    pub fn set_link(&mut self, idx: usize, block: u32) -> Result<()> {
        if idx >= MAX_FILE_BLOCKS {
            return Err(FsError::OutOfBounds);
        }
        if idx >= DIRECT_LINKS {
            if self.indirect == 0 {
                return Err(FsError::NoIndirectBlock);
            }
            if !self.indirect_loaded() {
                return Err(FsError::IndirectNotLoaded);
            }
        }
        self.links[idx] = block;
        Ok(())
    }
}
