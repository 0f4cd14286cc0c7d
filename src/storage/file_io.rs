//! File I/O utilities with atomic writes
//!
//! Backups and check images are written to a temp file and renamed into
//! place, so a crash never leaves a truncated file behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::OffertoryError;

/// Write `bytes` to `path` atomically (write to temp, then rename)
pub fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), OffertoryError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            OffertoryError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    let file = File::create(temp_path)
        .map_err(|e| OffertoryError::Io(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .map_err(|e| OffertoryError::Io(format!("Failed to write data: {}", e)))?;
    writer
        .flush()
        .map_err(|e| OffertoryError::Io(format!("Failed to flush data: {}", e)))?;

    // Sync to disk before rename
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| OffertoryError::Io(format!("Failed to sync data: {}", e)))?;

    fs::rename(temp_path, path).map_err(|e| {
        let _ = fs::remove_file(temp_path);
        OffertoryError::Io(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dump.sql");

        write_atomic(&path, b"BEGIN TRANSACTION;\nCOMMIT;\n").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "BEGIN TRANSACTION;\nCOMMIT;\n"
        );
    }

    #[test]
    fn test_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("image.png");

        write_atomic(&path, &[0x89, 0x50, 0x4e, 0x47]).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("image.png.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("file.bin");

        write_atomic(&path, b"data").unwrap();
        assert!(path.exists());
    }
}
