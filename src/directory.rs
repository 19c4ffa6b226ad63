//! Directory content manipulation.
//!
//! A directory's content is read and written through the normal byte-range
//! API; these operations only interpret it as a dentry array. Removal keeps
//! directories hole-free by shifting every later entry one slot left, so
//! on-disk order is always the insertion order of the surviving entries.

use crate::config::*;
use crate::dentry::DirEntry;
use crate::error::{FsError, Result};
use crate::inode::Inode;
use crate::FileSystem;

impl FileSystem {
    /// Reads the full dentry array, enforcing the structural invariant:
    /// the size is a multiple of the dentry size and covers at least the
    /// `.` and `..` entries. A violation means on-disk corruption.
    fn dir_content(&mut self, dir: &mut Inode) -> Result<Vec<u8>> {
        if !dir.is_dir {
            return Err(FsError::NotDirectory);
        }
        let size = dir.size as usize;
        if size % DENTRY_SIZE != 0 || size < 2 * DENTRY_SIZE {
            return Err(FsError::CorruptDirectory);
        }
        self.read_to_end(dir)
    }

    /// Finds `name` in the directory by linear scan. `.` and `..` are
    /// ordinary entries and resolve like any other name.
    pub fn lookup(&mut self, name: &str, dir: &mut Inode) -> Result<u32> {
        self.ensure_mounted();
        let content = self.dir_content(dir)?;
        for chunk in content.chunks_exact(DENTRY_SIZE) {
            let entry = DirEntry::decode(chunk);
            if entry.name_matches(name) {
                return Ok(entry.number);
            }
        }
        Err(FsError::NotFound)
    }

    /// Lists the directory in on-disk order; `.` and `..` come first.
    pub fn ls(&mut self, dir: &mut Inode) -> Result<Vec<(String, u32)>> {
        self.ensure_mounted();
        let content = self.dir_content(dir)?;
        Ok(content
            .chunks_exact(DENTRY_SIZE)
            .map(|chunk| {
                let entry = DirEntry::decode(chunk);
                (entry.name(), entry.number)
            })
            .collect())
    }

    /// Appends one dentry at the end of the directory, extending it by one
    /// slot (which may allocate a new block).
    pub(crate) fn add_entry(&mut self, name: &str, number: u32, dir: &mut Inode) -> Result<()> {
        if !dir.is_dir {
            return Err(FsError::NotDirectory);
        }
        let entry = DirEntry::new(name, number)?;
        let mut buf = [0u8; DENTRY_SIZE];
        entry.encode(&mut buf);
        let at = dir.size as usize;
        self.write(dir, &buf, at)?;
        Ok(())
    }

    /// Removes the dentry pointing at inode `number`, returning its name.
    /// The last entry is dropped by truncation alone; anything else shifts
    /// the tail left by one slot first.
    pub(crate) fn remove_entry(&mut self, number: u32, dir: &mut Inode) -> Result<String> {
        let content = self.dir_content(dir)?;
        let total = content.len() / DENTRY_SIZE;
        let (idx, name) = content
            .chunks_exact(DENTRY_SIZE)
            .enumerate()
            .find_map(|(i, chunk)| {
                let entry = DirEntry::decode(chunk);
                (entry.number == number).then(|| (i, entry.name()))
            })
            .ok_or(FsError::NotFound)?;

        let new_size = (total - 1) * DENTRY_SIZE;
        if idx == total - 1 {
            self.truncate(dir, new_size)?;
        } else {
            let tail = content[(idx + 1) * DENTRY_SIZE..].to_vec();
            self.truncate(dir, new_size)?;
            self.write(dir, &tail, idx * DENTRY_SIZE)?;
        }
        Ok(name)
    }

    /// Rewrites the name field of the dentry pointing at `inode`, in place.
    pub fn rename(&mut self, new_name: &str, inode: &Inode, dir: &mut Inode) -> Result<()> {
        self.ensure_mounted();
        let entry = DirEntry::new(new_name, inode.number)?;
        let content = self.dir_content(dir)?;
        let mut idx = None;
        for (i, chunk) in content.chunks_exact(DENTRY_SIZE).enumerate() {
            let existing = DirEntry::decode(chunk);
            if existing.name_matches(new_name) && existing.number != inode.number {
                return Err(FsError::AlreadyExists);
            }
            if existing.number == inode.number && idx.is_none() {
                idx = Some(i);
            }
        }
        let idx = idx.ok_or(FsError::NotFound)?;
        let mut buf = [0u8; DENTRY_SIZE];
        entry.encode(&mut buf);
        self.write(dir, &buf[..FILENAME_SIZE], idx * DENTRY_SIZE)?;
        Ok(())
    }
}
