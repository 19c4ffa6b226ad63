//! The filesystem geometry descriptor stored ahead of block 0.

use crate::config::*;
use crate::disk::Disk;
use crate::error::{FsError, Result};

/// On-disk layout: magic, total blocks, inode blocks and inode count, as
/// four big-endian u32 in that order, 16 bytes total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperBlock {
    pub magic: u32,
    pub blocks: u32,
    pub inode_blocks: u32,
    pub inodes: u32,
}

impl SuperBlock {
    /// Computes the geometry for a `blocks`-sized disk: one inode block per
    /// [`INODE_RATIO`] total blocks (rounded up, capped), the rest data.
    pub fn new(blocks: u32) -> Self {
        let inode_blocks = inode_blocks_for(blocks);
        SuperBlock {
            magic: MAGIC,
            blocks,
            inode_blocks,
            inodes: inode_blocks * INODES_PER_BLOCK as u32,
        }
    }

    /// Reads and validates the superblock. A magic mismatch means the image
    /// was not produced by this filesystem and is rejected outright.
    pub fn read(disk: &mut Disk) -> Result<Self> {
        let mut buf = [0u8; SUPERBLOCK_SIZE];
        disk.read_superblock(&mut buf)?;
        let sb = SuperBlock {
            magic: u32::from_be_bytes(buf[0..4].try_into().unwrap()),
            blocks: u32::from_be_bytes(buf[4..8].try_into().unwrap()),
            inode_blocks: u32::from_be_bytes(buf[8..12].try_into().unwrap()),
            inodes: u32::from_be_bytes(buf[12..16].try_into().unwrap()),
        };
        if sb.magic != MAGIC {
            return Err(FsError::BadMagic);
        }
        Ok(sb)
    }

    pub fn write(&self, disk: &mut Disk) -> Result<()> {
        let mut buf = [0u8; SUPERBLOCK_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_be_bytes());
        buf[4..8].copy_from_slice(&self.blocks.to_be_bytes());
        buf[8..12].copy_from_slice(&self.inode_blocks.to_be_bytes());
        buf[12..16].copy_from_slice(&self.inodes.to_be_bytes());
        disk.write_superblock(&buf)
    }
}

fn inode_blocks_for(blocks: u32) -> u32 {
    let needed = (blocks as usize).div_ceil(INODE_RATIO);
    needed.min(MAX_INODE_BLOCKS) as u32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn geometry() {
        let sb = SuperBlock::new(10);
        assert_eq!(sb.magic, MAGIC);
        assert_eq!(sb.inode_blocks, 1);
        assert_eq!(sb.inodes, 128);

        let sb = SuperBlock::new(101);
        assert_eq!(sb.inode_blocks, 11);
    }

    #[test]
    fn inode_block_cap() {
        let sb = SuperBlock::new(1_000_000);
        assert_eq!(sb.inode_blocks, MAX_INODE_BLOCKS as u32);
    }
}
