//! Format, mount and free-space reconstruction.

mod common;

use cafefs::{ErrorClass, FsError, INODES_PER_BLOCK, ROOT_INODE};

#[test]
fn format_geometry_and_free_stat() {
    let blocks = 10;
    let mut fs = common::prepare_fs("format_geometry", blocks);
    let sb = *fs.superblock();
    assert_eq!(sb.blocks, blocks);
    assert_eq!(sb.inode_blocks, 1); // ceil(10 / 10)
    assert_eq!(sb.inodes, INODES_PER_BLOCK as u32);

    // Root holds one inode and one data block.
    let stat = fs.stat();
    assert_eq!(stat.free_inodes, sb.inodes as usize - 1);
    assert_eq!(
        stat.free_data_blocks,
        (sb.blocks - sb.inode_blocks) as usize - 1
    );
    fs.unmount().unwrap();
}

#[test]
fn root_is_its_own_parent() {
    let mut fs = common::prepare_fs("root_parent", 10);
    let mut root = fs.root().unwrap();
    assert!(root.is_dir);
    let listing = fs.ls(&mut root).unwrap();
    assert_eq!(
        listing,
        vec![(".".to_string(), ROOT_INODE), ("..".to_string(), ROOT_INODE)]
    );
    fs.unmount().unwrap();
}

#[test]
fn scan_is_idempotent_across_remount() {
    let mut fs = common::prepare_fs("scan_idempotent", 20);
    let mut root = fs.root().unwrap();
    let mut dir = fs.mkdir("docs", &mut root).unwrap();
    let mut file = fs.create("notes", &mut dir).unwrap();
    fs.write(&mut file, &[7u8; 5000], 0).unwrap();

    let before = fs.stat();
    fs.remount().unwrap();
    assert_eq!(fs.stat(), before);
    fs.remount().unwrap();
    assert_eq!(fs.stat(), before);
    fs.unmount().unwrap();
}

#[test]
fn allocation_order_is_fifo() {
    let mut fs = common::prepare_fs("fifo_order", 20);
    let mut root = fs.root().unwrap();
    let one = fs.mkdir("one", &mut root).unwrap();
    let two = fs.mkdir("two", &mut root).unwrap();
    let three = fs.mkdir("three", &mut root).unwrap();
    // Fresh free lists hand out inode numbers in slot order.
    assert_eq!((one.number, two.number, three.number), (1, 2, 3));

    // A freed number goes to the back of the queue and is reused last.
    let mut two = fs.retrieve_inode(two.number).unwrap();
    fs.delete(&mut two, &mut root).unwrap();
    let four = fs.mkdir("four", &mut root).unwrap();
    assert_eq!(four.number, 4);

    // After a remount the scan reseeds the queues in ascending order, so
    // the gap left by "two" is the first number handed out again.
    fs.remount().unwrap();
    let mut root = fs.root().unwrap();
    let five = fs.mkdir("five", &mut root).unwrap();
    assert_eq!(five.number, 2);
    fs.unmount().unwrap();
}

#[test]
fn mount_rejects_bad_magic() {
    common::init_logger();
    let path = common::image_path("bad_magic");
    let disk = cafefs::Disk::new(&path, 10);
    let mut fs = cafefs::FileSystem::new(disk);
    fs.format().unwrap();

    // Stamp over the magic field directly in the image.
    let mut image = std::fs::read(&path).unwrap();
    image[..4].copy_from_slice(&0xDEAD_BEEFu32.to_be_bytes());
    std::fs::write(&path, &image).unwrap();

    let err = fs.mount().unwrap_err();
    assert!(matches!(err, FsError::BadMagic));
    assert_eq!(err.class(), ErrorClass::BrokenState);
}

#[test]
fn corrupt_directory_size_is_rejected() {
    common::init_logger();
    let path = common::image_path("corrupt_dir");
    let disk = cafefs::Disk::new(&path, 10);
    let mut fs = cafefs::FileSystem::new(disk);
    fs.format().unwrap();

    // Stamp a size that is not a whole number of dentries into the root
    // inode record (first slot of inode-table block 0, second field).
    let mut image = std::fs::read(&path).unwrap();
    let size_at = 16 + 4;
    image[size_at..size_at + 4].copy_from_slice(&100u32.to_be_bytes());
    std::fs::write(&path, &image).unwrap();

    fs.mount().unwrap();
    let mut root = fs.root().unwrap();
    let err = fs.ls(&mut root).unwrap_err();
    assert!(matches!(err, FsError::CorruptDirectory));
    assert_eq!(err.class(), ErrorClass::BrokenState);
    fs.unmount().unwrap();
}

#[test]
fn allocation_exhaustion() {
    let mut fs = common::prepare_fs("exhaustion", 10);
    let mut root = fs.root().unwrap();
    let mut file = fs.create("big", &mut root).unwrap();
    // 10 blocks leave 9 for data; root and the file's content eat them up.
    let chunk = vec![1u8; 4096];
    let mut written = 0;
    let err = loop {
        match fs.write(&mut file, &chunk, written) {
            Ok(n) => written += n,
            Err(e) => break e,
        }
    };
    assert!(matches!(err, FsError::OutOfBlocks));
    assert_eq!(err.class(), ErrorClass::Io);
    fs.unmount().unwrap();
}
