use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::PathBuf;

/// Directory-rooted storage. Used for local output and as an upload target
/// when no bucket is configured.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("staging/travelers/part-00000.csv", b"LOS,37").await.unwrap();

        let data = fs::read(dir.path().join("staging/travelers/part-00000.csv")).unwrap();
        assert_eq!(data, b"LOS,37");
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_object() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("cities.csv", b"old").await.unwrap();
        storage.write_file("cities.csv", b"new").await.unwrap();

        assert_eq!(fs::read(dir.path().join("cities.csv")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_write_into_file_path_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("staging"), b"not a directory").unwrap();
        let storage = LocalStorage::new(dir.path());

        assert!(storage.write_file("staging/cities.csv", b"x").await.is_err());
    }
}
