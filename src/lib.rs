//! cafefs is a single-host, file-backed block filesystem.
//!
//! A fixed-size disk image is carved into three regions:
//! - Superblock: a 16-byte geometry record ahead of the numbered blocks.
//! - Inode table: packed 32-byte inode records, 128 per block.
//! - Data blocks: file content, directory content and indirect-link blocks.
//!
//! The layers, from bottom to top:
//! 1. Disk: fixed-size block I/O over a backing file, with a bounded
//!    write-back LRU cache. Durability points are eviction and close.
//! 2. Codecs: superblock, inode (direct links plus one indirect block) and
//!    directory entry binary layouts, bit-for-bit fixed.
//! 3. Free lists: free-inode and free-data-block queues, rebuilt from a full
//!    inode-table scan on every mount; nothing is persisted.
//! 4. Range I/O: byte-range read, write and truncate across an inode's
//!    block links, allocating on demand.
//! 5. Directories: flat dentry arrays stored as ordinary file content, with
//!    `.` and `..` as real entries.
//! 6. FileSystem: mount/format/unmount lifecycle, path resolution and the
//!    compound create/delete/move/rename/ls operations.
//!
//! Everything is synchronous and single-threaded; a caller owns the
//! [`FileSystem`] mutably and serializes all access to it.

mod config;
mod dentry;
mod directory;
mod disk;
mod error;
mod file;
mod freelist;
mod fs;
mod inode;
mod path;
mod superblock;

pub use config::*;
pub use dentry::DirEntry;
pub use disk::{Disk, Metrics};
pub use error::{ErrorClass, FsError, Result};
pub use fs::{FileSystem, FsStat};
pub use inode::Inode;
pub use path::host_rel_to_fs_path;
pub use superblock::SuperBlock;
