use std::fmt;

/// Which of the four failure classes an error belongs to.
///
/// `Argument` errors are caller-fixable, `Io` errors come from the
/// environment (backing store, exhausted free lists, missing entries),
/// `BrokenState` signals on-disk corruption and is fatal for the affected
/// subtree, `IllegalState` is a misuse of the in-memory API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Argument,
    Io,
    BrokenState,
    IllegalState,
}

#[derive(Debug)]
pub enum FsError {
    // Argument errors
    BlockOutOfRange { block: u32, total: u32 },
    OutOfBounds,
    FileTooLarge,
    BadName,
    NameTooLong,
    AlreadyExists,
    NotDirectory,
    DirNotEmpty,
    // I/O errors
    Io(std::io::Error),
    NotFound,
    OutOfInodes,
    OutOfBlocks,
    // Broken on-disk state
    BadMagic,
    CorruptDirectory,
    DanglingLink,
    // Illegal in-memory state
    IndirectNotLoaded,
    NoIndirectBlock,
    DiskClosed,
}

impl FsError {
    pub fn class(&self) -> ErrorClass {
        use FsError::*;
        match self {
            BlockOutOfRange { .. } | OutOfBounds | FileTooLarge | BadName | NameTooLong
            | AlreadyExists | NotDirectory | DirNotEmpty => ErrorClass::Argument,
            Io(_) | NotFound | OutOfInodes | OutOfBlocks => ErrorClass::Io,
            BadMagic | CorruptDirectory | DanglingLink => ErrorClass::BrokenState,
            IndirectNotLoaded | NoIndirectBlock | DiskClosed => ErrorClass::IllegalState,
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use FsError::*;
        match self {
            BlockOutOfRange { block, total } => {
                write!(f, "block {block} out of range (total {total})")
            }
            OutOfBounds => write!(f, "offset or length out of bounds"),
            FileTooLarge => write!(f, "range exceeds maximum addressable file size"),
            BadName => write!(f, "invalid file name"),
            NameTooLong => write!(f, "file name exceeds the dentry name field"),
            AlreadyExists => write!(f, "entry already exists"),
            NotDirectory => write!(f, "not a directory"),
            DirNotEmpty => write!(f, "directory not empty"),
            Io(e) => write!(f, "disk i/o failure: {e}"),
            NotFound => write!(f, "entry not found"),
            OutOfInodes => write!(f, "no free inodes left"),
            OutOfBlocks => write!(f, "no free data blocks left"),
            BadMagic => write!(f, "superblock magic mismatch"),
            CorruptDirectory => write!(f, "directory content is corrupt"),
            DanglingLink => write!(f, "unallocated block link inside file bounds"),
            IndirectNotLoaded => write!(f, "indirect links used before being loaded"),
            NoIndirectBlock => write!(f, "inode has no indirect block"),
            DiskClosed => write!(f, "disk is not open"),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FsError {
    fn from(e: std::io::Error) -> Self {
        FsError::Io(e)
    }
}

pub type Result<T> = core::result::Result<T, FsError>;
