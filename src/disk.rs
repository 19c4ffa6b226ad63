//! File-backed block store with a bounded write-back cache.
//!
//! The backing image holds a 16-byte superblock followed by `nblocks`
//! fixed-size blocks. Reads and writes of numbered blocks go through an LRU
//! cache; a write only reaches the image when its entry is evicted or the
//! disk is closed, so `close` is the durability point.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use lru::LruCache;

use crate::config::*;
use crate::error::{FsError, Result};

/// Counters for physical (cache-missing) backing store traffic.
///
/// Owned by the [`Disk`] and reset on every `open`, so callers can meter an
/// operation sequence without global state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub reads: u64,
    pub writes: u64,
    pub cache_hits: u64,
}

pub struct Disk {
    path: PathBuf,
    nblocks: u32,
    file: Option<File>,
    cache: LruCache<u32, Box<Block>>,
    metrics: Metrics,
}

impl Disk {
    pub fn new(path: impl Into<PathBuf>, nblocks: u32) -> Self {
        let capacity = NonZeroUsize::new(CACHE_LIMIT).unwrap();
        Disk {
            path: path.into(),
            nblocks,
            file: None,
            cache: LruCache::new(capacity),
            metrics: Metrics::default(),
        }
    }

    pub fn num_blocks(&self) -> u32 {
        self.nblocks
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Opens the backing image, truncating it first when `recreate` is set.
    /// Resets the metrics counters.
    pub fn open(&mut self, recreate: bool) -> Result<()> {
        self.metrics = Metrics::default();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(recreate)
            .open(&self.path)?;
        self.file = Some(file);
        Ok(())
    }

    /// Flushes every cached block, forces durability and releases the handle.
    pub fn close(&mut self) -> Result<()> {
        while let Some((block, data)) = self.cache.pop_lru() {
            self.write_physical(block, &data)?;
        }
        let file = self.file.take().ok_or(FsError::DiskClosed)?;
        file.sync_all()?;
        Ok(())
    }

    /// Reads the 16-byte superblock region. Bypasses the block cache.
    pub fn read_superblock(&mut self, buf: &mut [u8; SUPERBLOCK_SIZE]) -> Result<()> {
        self.metrics.reads += 1;
        let file = self.file.as_mut().ok_or(FsError::DiskClosed)?;
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(buf)?;
        Ok(())
    }

    /// Writes the 16-byte superblock region. Bypasses the block cache.
    pub fn write_superblock(&mut self, buf: &[u8; SUPERBLOCK_SIZE]) -> Result<()> {
        self.metrics.writes += 1;
        let file = self.file.as_mut().ok_or(FsError::DiskClosed)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(buf)?;
        Ok(())
    }

    /// Reads block `block` into `buf`, from the cache when present.
    pub fn read(&mut self, block: u32, buf: &mut Block) -> Result<()> {
        self.check_block(block)?;
        if let Some(data) = self.cache.get(&block) {
            self.metrics.cache_hits += 1;
            buf.copy_from_slice(&**data);
            return Ok(());
        }
        self.read_physical(block, buf)?;
        self.insert(block, Box::new(*buf))?;
        Ok(())
    }

    /// Writes `buf` as block `block`. The data lands in the cache only; it
    /// becomes durable on eviction or [`Disk::close`].
    pub fn write(&mut self, block: u32, buf: &Block) -> Result<()> {
        self.check_block(block)?;
        self.insert(block, Box::new(*buf))
    }

    fn insert(&mut self, block: u32, data: Box<Block>) -> Result<()> {
        if let Some((evicted, old)) = self.cache.push(block, data) {
            // push returns the previous value for the same key; only a
            // different key means an entry was actually evicted.
            if evicted != block {
                self.write_physical(evicted, &old)?;
            }
        }
        Ok(())
    }

    fn check_block(&self, block: u32) -> Result<()> {
        if block >= self.nblocks {
            return Err(FsError::BlockOutOfRange {
                block,
                total: self.nblocks,
            });
        }
        Ok(())
    }

    fn block_offset(block: u32) -> u64 {
        SUPERBLOCK_SIZE as u64 + block as u64 * BLOCK_SIZE as u64
    }

    fn read_physical(&mut self, block: u32, buf: &mut Block) -> Result<()> {
        self.metrics.reads += 1;
        let file = self.file.as_mut().ok_or(FsError::DiskClosed)?;
        file.seek(SeekFrom::Start(Self::block_offset(block)))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_physical(&mut self, block: u32, buf: &Block) -> Result<()> {
        self.metrics.writes += 1;
        let file = self.file.as_mut().ok_or(FsError::DiskClosed)?;
        file.seek(SeekFrom::Start(Self::block_offset(block)))?;
        file.write_all(buf)?;
        Ok(())
    }
}
