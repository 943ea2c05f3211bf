//! Generated-file plumbing.

use std::path::{Path, PathBuf};

use eyre::Result;

/// A rendered artifact and where it belongs on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub content: String,
}

impl RenderedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Write the file, creating parent directories as needed.
    pub fn write(&self) -> Result<()> {
        write_file(&self.path, &self.content)
    }
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("com").join("acme").join("Enum.java");

        write_file(&path, "content").unwrap();

        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_write_file_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.sql");

        write_file(&path, "first").unwrap();
        write_file(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_rendered_file_write() {
        let temp = TempDir::new().unwrap();
        let file = RenderedFile::new(temp.path().join("a.xml"), "<xml/>");

        file.write().unwrap();

        assert_eq!(fs::read_to_string(&file.path).unwrap(), "<xml/>");
    }
}
