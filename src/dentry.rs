//! The fixed-size directory entry codec.
//!
//! A dentry is 124 bytes of zero-padded ASCII name followed by the target
//! inode number. Directory content is nothing more than a flat array of
//! these records, read and written through the ordinary byte-range API.

use crate::config::*;
use crate::error::{FsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    name: [u8; FILENAME_SIZE],
    pub number: u32,
}

impl DirEntry {
    /// Builds an entry, validating the name: nonempty ASCII, no path
    /// separator, at most [`FILENAME_SIZE`] bytes.
    pub fn new(name: &str, number: u32) -> Result<Self> {
        if name.is_empty() || !name.is_ascii() || name.contains(SEPARATOR) {
            return Err(FsError::BadName);
        }
        if name.len() > FILENAME_SIZE {
            return Err(FsError::NameTooLong);
        }
        let mut padded = [0u8; FILENAME_SIZE];
        padded[..name.len()].copy_from_slice(name.as_bytes());
        Ok(DirEntry {
            name: padded,
            number,
        })
    }

    pub fn decode(bytes: &[u8]) -> Self {
        let mut name = [0u8; FILENAME_SIZE];
        name.copy_from_slice(&bytes[..FILENAME_SIZE]);
        let number =
            u32::from_be_bytes(bytes[FILENAME_SIZE..DENTRY_SIZE].try_into().unwrap());
        DirEntry { name, number }
    }

    pub fn encode(&self, out: &mut [u8]) {
        out[..FILENAME_SIZE].copy_from_slice(&self.name);
        out[FILENAME_SIZE..DENTRY_SIZE].copy_from_slice(&self.number.to_be_bytes());
    }

    /// The name with its zero padding trimmed.
    pub fn name(&self) -> String {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(FILENAME_SIZE);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    pub fn name_matches(&self, name: &str) -> bool {
        let bytes = name.as_bytes();
        if bytes.len() > FILENAME_SIZE {
            return false;
        }
        self.name[..bytes.len()] == *bytes
            && self.name[bytes.len()..].iter().all(|&b| b == 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip() {
        let entry = DirEntry::new("README.txt", 42).unwrap();
        let mut buf = [0u8; DENTRY_SIZE];
        entry.encode(&mut buf);
        let decoded = DirEntry::decode(&buf);
        assert_eq!(decoded, entry);
        assert_eq!(decoded.name(), "README.txt");
        assert_eq!(decoded.number, 42);
    }

    #[test]
    fn name_validation() {
        assert!(matches!(DirEntry::new("", 0), Err(FsError::BadName)));
        assert!(matches!(DirEntry::new("a/b", 0), Err(FsError::BadName)));
        assert!(matches!(DirEntry::new("caffè", 0), Err(FsError::BadName)));
        let long = "x".repeat(FILENAME_SIZE + 1);
        assert!(matches!(
            DirEntry::new(&long, 0),
            Err(FsError::NameTooLong)
        ));
        let max = "x".repeat(FILENAME_SIZE);
        assert!(DirEntry::new(&max, 0).is_ok());
    }

    #[test]
    fn name_matching() {
        let entry = DirEntry::new("two", 2).unwrap();
        assert!(entry.name_matches("two"));
        assert!(!entry.name_matches("tw"));
        assert!(!entry.name_matches("twos"));
    }
}
