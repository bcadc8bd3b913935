use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Files on the local filesystem, resolved against `base_path`.
///
/// Writes go to a temporary file in the destination directory which is then
/// renamed over the target, so readers never observe a partial file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".".to_string())
    }
}

fn write_atomically(full_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = match full_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(full_path).map_err(|e| e.error)?;
    Ok(())
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        tokio::fs::read(&full_path)
            .await
            .map_err(|source| EtlError::InputRead {
                path: full_path.display().to_string(),
                source,
            })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        let data = data.to_vec();

        let target = full_path.clone();
        let written = tokio::task::spawn_blocking(move || write_atomically(&target, &data))
            .await
            .map_err(|e| EtlError::ProcessingError {
                message: format!("output writer task failed: {}", e),
            })?;

        written.map_err(|source| EtlError::OutputWrite {
            path: full_path.display().to_string(),
            source,
        })
    }
}
