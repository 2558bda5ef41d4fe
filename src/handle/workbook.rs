use std::path::{Path, PathBuf};

/// A spreadsheet workbook, known only by its file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookRef {
    filepath: PathBuf,
}

impl WorkbookRef {
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// A reference can be restored only when it names an existing file.
    pub fn is_restorable(&self) -> bool {
        !self.filepath.as_os_str().is_empty() && self.filepath.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restorable_only_when_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        assert!(!WorkbookRef::new(&path).is_restorable());
        std::fs::write(&path, b"").unwrap();
        assert!(WorkbookRef::new(&path).is_restorable());
        assert!(!WorkbookRef::new("").is_restorable());
        assert!(!WorkbookRef::new(dir.path()).is_restorable());
    }
}
