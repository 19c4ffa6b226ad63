//! Block store behavior: cache hits, write-back timing and metrics.

mod common;

use cafefs::{Disk, ErrorClass, FsError, BLOCK_SIZE, ZERO_BLOCK};

#[test]
fn write_and_read_blocks() {
    common::init_logger();
    let blocks = 10;
    let mut disk = Disk::new(common::image_path("disk_rw"), blocks);
    disk.open(true).unwrap();

    let mut buf = ZERO_BLOCK;
    buf[..10].copy_from_slice(b"HelloWorld");
    for block in 0..blocks {
        disk.write(block, &buf).unwrap();
    }
    disk.close().unwrap();
    // Writes stay in the cache until close flushes them in one pass.
    assert_eq!(disk.metrics().reads, 0);
    assert_eq!(disk.metrics().writes, blocks as u64);

    disk.open(false).unwrap();
    let mut read_buf = ZERO_BLOCK;
    for block in 0..blocks {
        disk.read(block, &mut read_buf).unwrap();
        assert_eq!(read_buf, buf);
    }
    disk.close().unwrap();
    assert_eq!(disk.metrics().reads, blocks as u64);
    // Cached blocks were never dirtied, but write-back flushes them anyway.
    assert_eq!(disk.metrics().writes, blocks as u64);
}

#[test]
fn cache_hit_skips_backing_store() {
    common::init_logger();
    let mut disk = Disk::new(common::image_path("disk_cache"), 4);
    disk.open(true).unwrap();

    let mut buf = ZERO_BLOCK;
    buf[0] = 0xAB;
    disk.write(2, &buf).unwrap();

    let mut read_buf = ZERO_BLOCK;
    disk.read(2, &mut read_buf).unwrap();
    disk.read(2, &mut read_buf).unwrap();
    assert_eq!(read_buf[0], 0xAB);
    // The written block never left the cache, so both reads hit.
    assert_eq!(disk.metrics().reads, 0);
    assert_eq!(disk.metrics().cache_hits, 2);
    disk.close().unwrap();
}

#[test]
fn write_visible_before_flush() {
    common::init_logger();
    let mut disk = Disk::new(common::image_path("disk_visible"), 4);
    disk.open(true).unwrap();

    let mut buf = ZERO_BLOCK;
    for (i, b) in buf.iter_mut().enumerate() {
        *b = (i % 251) as u8;
    }
    disk.write(1, &buf).unwrap();
    let mut read_buf = ZERO_BLOCK;
    disk.read(1, &mut read_buf).unwrap();
    assert_eq!(read_buf, buf);
    assert_eq!(read_buf.len(), BLOCK_SIZE);
    disk.close().unwrap();
}

#[test]
fn block_out_of_range() {
    common::init_logger();
    let mut disk = Disk::new(common::image_path("disk_range"), 4);
    disk.open(true).unwrap();

    let err = disk.write(4, &ZERO_BLOCK).unwrap_err();
    assert!(matches!(err, FsError::BlockOutOfRange { block: 4, total: 4 }));
    assert_eq!(err.class(), ErrorClass::Argument);

    let mut buf = ZERO_BLOCK;
    assert!(disk.read(100, &mut buf).is_err());
    disk.close().unwrap();
}

#[test]
fn closed_disk_rejects_io() {
    common::init_logger();
    let mut disk = Disk::new(common::image_path("disk_closed"), 4);
    disk.open(true).unwrap();
    disk.close().unwrap();

    let mut buf = ZERO_BLOCK;
    let err = disk.read(0, &mut buf).unwrap_err();
    assert_eq!(err.class(), ErrorClass::IllegalState);
}
