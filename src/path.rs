//! Absolute-path resolution and host-path translation.

use crate::config::*;
use crate::error::{FsError, Result};
use crate::inode::Inode;
use crate::FileSystem;

impl FileSystem {
    /// Resolves an absolute path to its inode, one component lookup at a
    /// time. `.` and `..` are stored dentries and traverse like any other
    /// name (the root's `..` is the root itself); empty components collapse,
    /// so `/` and `//a//b` behave as expected.
    pub fn open(&mut self, path: &str) -> Result<Inode> {
        self.ensure_mounted();
        let mut current = self.root()?;
        for component in path.split(SEPARATOR).filter(|c| !c.is_empty()) {
            if !current.is_dir {
                return Err(FsError::NotDirectory);
            }
            let number = self.lookup(component, &mut current)?;
            current = self.retrieve_inode(number)?;
        }
        Ok(current)
    }
}

/// Splits an absolute path into its parent path and final component.
pub(crate) fn split_path(path: &str) -> Result<(&str, &str)> {
    let trimmed = path.trim_end_matches(SEPARATOR);
    let cut = trimmed.rfind(SEPARATOR).ok_or(FsError::BadName)?;
    let parent = if cut == 0 { "/" } else { &trimmed[..cut] };
    let name = &trimmed[cut + 1..];
    if name.is_empty() {
        return Err(FsError::BadName);
    }
    Ok((parent, name))
}

/// Converts a host-OS relative path into this filesystem's absolute-path
/// syntax. Pure separator substitution; an empty input maps to the root.
pub fn host_rel_to_fs_path(rel: &str) -> String {
    let mut path = String::with_capacity(rel.len() + 1);
    path.push(SEPARATOR);
    for c in rel.chars() {
        path.push(if c == std::path::MAIN_SEPARATOR {
            SEPARATOR
        } else {
            c
        });
    }
    path
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split() {
        assert_eq!(split_path("/foo").unwrap(), ("/", "foo"));
        assert_eq!(split_path("/a/b/c").unwrap(), ("/a/b", "c"));
        assert_eq!(split_path("/a/b/").unwrap(), ("/a", "b"));
        assert!(split_path("/").is_err());
        assert!(split_path("foo").is_err());
    }

    #[test]
    fn host_translation() {
        let rel = format!(
            "my{sep}folder{sep}file",
            sep = std::path::MAIN_SEPARATOR
        );
        assert_eq!(host_rel_to_fs_path(&rel), "/my/folder/file");
        assert_eq!(host_rel_to_fs_path(""), "/");
    }
}
