pub const MAGIC: u32 = 0xCAFE;

pub const BLOCK_SIZE: usize = 4096;
pub const SUPERBLOCK_SIZE: usize = 16; // 4 x u32, stored before block 0
pub const ROOT_INODE: u32 = 0; // Inode number of the root directory

pub const INODE_SIZE: usize = 32;
pub const INODE_RATIO: usize = 10; // One inode block per INODE_RATIO total blocks
pub const MAX_INODE_BLOCKS: usize = 512;
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE;

pub const DIRECT_LINKS: usize = 5; // Block pointers stored inside the inode itself
pub const LINKS_PER_INDIRECT: usize = BLOCK_SIZE / 4; // u32 pointers per indirect block
pub const MAX_FILE_BLOCKS: usize = DIRECT_LINKS + LINKS_PER_INDIRECT;

pub const DENTRY_SIZE: usize = 128;
pub const FILENAME_SIZE: usize = DENTRY_SIZE - 4; // Name field, zero padded ASCII
pub const SEPARATOR: char = '/';
pub const DOT: &str = ".";
pub const DOTDOT: &str = "..";

pub const CACHE_LIMIT: usize = 1000; // Block cache capacity, in blocks

/// A raw disk block.
pub type Block = [u8; BLOCK_SIZE];

pub const ZERO_BLOCK: Block = [0u8; BLOCK_SIZE];
