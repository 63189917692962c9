use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting compose files.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

/// Copy `src` to `dest` only when `src` exists and `dest` does not.
/// Returns true if the copy happened.
pub fn copy_if_missing(src: &Path, dest: &Path) -> Result<bool> {
    if !src.exists() || dest.exists() {
        return Ok(false);
    }
    let data = std::fs::read(src)?;
    atomic_write(dest, &data)?;
    Ok(true)
}

/// Copy `src` over `dest`, replacing any existing file.
pub fn copy_overwrite(src: &Path, dest: &Path) -> Result<()> {
    let data = std::fs::read(src)?;
    atomic_write(dest, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("compose.yml");
        atomic_write(&path, b"services: {}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "services: {}");
    }

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/compose.yml");
        atomic_write(&path, b"data").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn write_if_missing_skips_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("existing.env");
        std::fs::write(&path, b"original").unwrap();
        let written = write_if_missing(&path, b"new").unwrap();
        assert!(!written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn copy_if_missing_copies_once() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("example.env");
        let dest = dir.path().join(".env");
        std::fs::write(&src, b"PORT=3030").unwrap();

        assert!(copy_if_missing(&src, &dest).unwrap());
        std::fs::write(&dest, b"PORT=9999").unwrap();
        assert!(!copy_if_missing(&src, &dest).unwrap());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "PORT=9999");
    }

    #[test]
    fn copy_if_missing_without_source_is_noop() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("absent.env");
        let dest = dir.path().join(".env");
        assert!(!copy_if_missing(&src, &dest).unwrap());
        assert!(!dest.exists());
    }

    #[test]
    fn copy_overwrite_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("template.Dockerfile");
        let dest = dir.path().join("Dockerfile");
        std::fs::write(&src, b"FROM node:20").unwrap();
        std::fs::write(&dest, b"FROM node:14").unwrap();

        copy_overwrite(&src, &dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "FROM node:20");
    }
}
