//! The filesystem orchestrator: lifecycle state machine, inode management
//! and the compound file/directory operations.

use log::info;

use crate::config::*;
use crate::disk::{Disk, Metrics};
use crate::error::{FsError, Result};
use crate::freelist::FreeLists;
use crate::inode::Inode;
use crate::path::split_path;
use crate::superblock::SuperBlock;

/// Free-space statistics of the current mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStat {
    pub free_inodes: usize,
    pub free_data_blocks: usize,
}

/// A mounted (or mountable) filesystem over one [`Disk`].
///
/// The instance moves between two states: unmounted and mounted. `format`
/// and `mount` lead into the mounted machinery, `unmount` flushes and leaves
/// it. Every other operation requires the mounted state; calling one while
/// unmounted is a caller bug and panics. All access is `&mut self`; the
/// filesystem is strictly single-threaded and callers serialize on it.
pub struct FileSystem {
    pub(crate) disk: Disk,
    pub(crate) sb: SuperBlock,
    pub(crate) free: FreeLists,
    pub(crate) mounted: bool,
}

impl FileSystem {
    pub fn new(disk: Disk) -> Self {
        let sb = SuperBlock::new(disk.num_blocks());
        FileSystem {
            disk,
            sb,
            free: FreeLists::new(),
            mounted: false,
        }
    }

    pub(crate) fn ensure_mounted(&self) {
        assert!(self.mounted, "filesystem is not mounted");
    }

    pub fn superblock(&self) -> &SuperBlock {
        &self.sb
    }

    pub fn metrics(&self) -> &Metrics {
        self.disk.metrics()
    }

    pub fn stat(&self) -> FsStat {
        self.ensure_mounted();
        FsStat {
            free_inodes: self.free.free_inodes(),
            free_data_blocks: self.free.free_blocks(),
        }
    }

    /// Recreates the image from scratch: superblock, zeroed inode table and
    /// a root directory whose `.` and `..` both point at itself. Leaves the
    /// filesystem unmounted.
    pub fn format(&mut self) -> Result<()> {
        self.disk.open(true)?;
        self.sb = SuperBlock::new(self.disk.num_blocks());
        self.sb.write(&mut self.disk)?;
        for block in 0..self.sb.inode_blocks {
            self.disk.write(block, &ZERO_BLOCK)?;
        }
        self.free = FreeLists::seed(&self.sb);
        self.mounted = true;

        let number = self.free.alloc_inode()?;
        debug_assert_eq!(number, ROOT_INODE);
        let mut root = Inode::new(number, true);
        self.persist_inode(&root)?;
        self.add_entry(DOT, number, &mut root)?;
        self.add_entry(DOTDOT, number, &mut root)?;

        info!("formatted {} blocks", self.sb.blocks);
        self.unmount()
    }

    /// Reads and validates the superblock, then rebuilds the free lists by
    /// scanning the inode table. A magic mismatch is fatal.
    pub fn mount(&mut self) -> Result<()> {
        assert!(!self.mounted, "filesystem is already mounted");
        self.disk.open(false)?;
        self.sb = SuperBlock::read(&mut self.disk)?;
        self.free = FreeLists::rebuild(&mut self.disk, &self.sb)?;
        self.mounted = true;
        info!("mounted, {} blocks", self.sb.blocks);
        Ok(())
    }

    /// Flushes everything to the backing store and discards the in-memory
    /// free lists.
    pub fn unmount(&mut self) -> Result<()> {
        self.ensure_mounted();
        self.disk.close()?;
        self.free.clear();
        self.mounted = false;
        info!("unmounted");
        Ok(())
    }

    pub fn remount(&mut self) -> Result<()> {
        self.unmount()?;
        self.mount()
    }

    /// Reads the inode record, loading the indirect extension when present.
    pub fn retrieve_inode(&mut self, number: u32) -> Result<Inode> {
        self.ensure_mounted();
        if number >= self.sb.inodes {
            return Err(FsError::OutOfBounds);
        }
        let mut block = ZERO_BLOCK;
        self.disk.read(Inode::block_of(number), &mut block)?;
        let mut inode = Inode::decode(number, &block);
        self.ensure_indirect(&mut inode)?;
        Ok(inode)
    }

    pub fn root(&mut self) -> Result<Inode> {
        self.retrieve_inode(ROOT_INODE)
    }

    /// Allocates and persists a fresh file inode, without linking it into
    /// any directory.
    pub fn create_inode(&mut self) -> Result<Inode> {
        self.alloc_inode_record(false)
    }

    fn alloc_inode_record(&mut self, is_dir: bool) -> Result<Inode> {
        self.ensure_mounted();
        let number = self.free.alloc_inode()?;
        let inode = Inode::new(number, is_dir);
        self.persist_inode(&inode)?;
        Ok(inode)
    }

    /// Writes the inode record back into the table, along with the indirect
    /// block content when one is attached.
    pub(crate) fn persist_inode(&mut self, inode: &Inode) -> Result<()> {
        let table_block = Inode::block_of(inode.number);
        let mut block = ZERO_BLOCK;
        self.disk.read(table_block, &mut block)?;
        inode.encode(&mut block);
        self.disk.write(table_block, &block)?;
        if inode.indirect != 0 && inode.indirect_loaded() {
            let mut indirect_block = ZERO_BLOCK;
            inode.store_indirect(&mut indirect_block)?;
            self.disk.write(inode.indirect, &indirect_block)?;
        }
        Ok(())
    }

    /// Creates a file named `name` under `parent`.
    pub fn create(&mut self, name: &str, parent: &mut Inode) -> Result<Inode> {
        self.link_new_inode(name, parent, false)
    }

    /// Creates a directory named `name` under `parent`, seeding its `.` and
    /// `..` entries.
    pub fn mkdir(&mut self, name: &str, parent: &mut Inode) -> Result<Inode> {
        let mut dir = self.link_new_inode(name, parent, true)?;
        self.add_entry(DOT, dir.number, &mut dir)?;
        self.add_entry(DOTDOT, parent.number, &mut dir)?;
        Ok(dir)
    }

    fn link_new_inode(&mut self, name: &str, parent: &mut Inode, is_dir: bool) -> Result<Inode> {
        self.ensure_mounted();
        if !parent.is_dir {
            return Err(FsError::NotDirectory);
        }
        match self.lookup(name, parent) {
            Ok(_) => return Err(FsError::AlreadyExists),
            Err(FsError::NotFound) => {}
            Err(e) => return Err(e),
        }
        let inode = self.alloc_inode_record(is_dir)?;
        self.add_entry(name, inode.number, parent)?;
        Ok(inode)
    }

    /// Removes `inode` from `parent` and releases everything it held. A
    /// directory must be empty (only `.` and `..` left) to be deleted.
    pub fn delete(&mut self, inode: &mut Inode, parent: &mut Inode) -> Result<()> {
        self.ensure_mounted();
        if inode.is_dir && self.ls(inode)?.len() > 2 {
            return Err(FsError::DirNotEmpty);
        }
        self.remove_entry(inode.number, parent)?;
        self.truncate(inode, 0)?;
        inode.valid = false;
        self.persist_inode(inode)?;
        self.free.release_inode(inode.number);
        Ok(())
    }

    /// Moves `inode` from `src` to `dst`, keeping its name.
    ///
    /// Not atomic: a failure after the removal leaves the entry linked
    /// nowhere (the inode itself stays intact).
    pub fn move_entry(&mut self, inode: &Inode, src: &mut Inode, dst: &mut Inode) -> Result<()> {
        self.ensure_mounted();
        let name = self.remove_entry(inode.number, src)?;
        self.add_entry(&name, inode.number, dst)
    }

    /// `create` addressed by absolute path.
    pub fn create_path(&mut self, path: &str) -> Result<Inode> {
        let (parent, name) = split_path(path)?;
        let mut parent = self.open(parent)?;
        self.create(name, &mut parent)
    }

    /// `mkdir` addressed by absolute path.
    pub fn mkdir_path(&mut self, path: &str) -> Result<Inode> {
        let (parent, name) = split_path(path)?;
        let mut parent = self.open(parent)?;
        self.mkdir(name, &mut parent)
    }

    /// `delete` addressed by absolute path.
    pub fn delete_path(&mut self, path: &str) -> Result<()> {
        let (parent, _) = split_path(path)?;
        let mut inode = self.open(path)?;
        let mut parent = self.open(parent)?;
        self.delete(&mut inode, &mut parent)
    }

    /// `move_entry` addressed by absolute paths: the entry at `path` moves
    /// into the directory at `dst_dir`, keeping its name.
    pub fn move_path(&mut self, path: &str, dst_dir: &str) -> Result<()> {
        let (parent, _) = split_path(path)?;
        let inode = self.open(path)?;
        let mut src = self.open(parent)?;
        let mut dst = self.open(dst_dir)?;
        self.move_entry(&inode, &mut src, &mut dst)
    }

    /// `rename` addressed by absolute path.
    pub fn rename_path(&mut self, new_name: &str, path: &str) -> Result<()> {
        let (parent, _) = split_path(path)?;
        let inode = self.open(path)?;
        let mut dir = self.open(parent)?;
        self.rename(new_name, &inode, &mut dir)
    }
}
