//! File-based document backend.
//! Documents saved as pretty JSON files, human-readable, git-friendly.
//! Writes go through a temp file + rename so a crash never leaves half a document.

use parkalloc_core::error::Result;
use parkalloc_core::traits::{DocumentBackend, Entity};
use std::path::{Path, PathBuf};

/// One `<entity>.json` file per document in a directory.
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend rooted at `dir`, creating it if needed.
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn path_of(&self, entity: Entity) -> PathBuf {
        self.dir.join(format!("{}.json", entity.key()))
    }

    fn staging_path(&self, entity: Entity) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", entity.key()))
    }

    fn stage(&self, entity: Entity, body: &str) -> Result<PathBuf> {
        let tmp = self.staging_path(entity);
        std::fs::write(&tmp, body)?;
        Ok(tmp)
    }
}

impl DocumentBackend for JsonFileBackend {
    fn name(&self) -> &str {
        "json"
    }

    fn read(&self, entity: Entity) -> Result<Option<Vec<u8>>> {
        let file = self.path_of(entity);
        if !file.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(&file)?))
    }

    fn write(&self, entity: Entity, body: &str) -> Result<()> {
        let tmp = self.stage(entity, body)?;
        let file = self.path_of(entity);
        std::fs::rename(&tmp, &file)?;
        tracing::debug!("💾 Saved {} ({} bytes)", file.display(), body.len());
        Ok(())
    }

    fn write_all(&self, docs: &[(Entity, String)]) -> Result<()> {
        // Stage everything first; nothing is visible until all temp files exist.
        let mut staged = Vec::with_capacity(docs.len());
        for (entity, body) in docs {
            match self.stage(*entity, body) {
                Ok(tmp) => staged.push((*entity, tmp)),
                Err(e) => {
                    for (_, tmp) in &staged {
                        std::fs::remove_file(tmp).ok();
                    }
                    return Err(e);
                }
            }
        }
        for (entity, tmp) in staged {
            std::fs::rename(&tmp, self.path_of(entity))?;
        }
        tracing::debug!("💾 Saved {} documents to {}", docs.len(), self.dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_document_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path()).unwrap();
        assert!(backend.read(Entity::Members).unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path()).unwrap();
        backend.write(Entity::History, "[]").unwrap();
        assert_eq!(backend.read(Entity::History).unwrap().as_deref(), Some(b"[]".as_slice()));
        assert!(dir.path().join("history.json").exists());
        assert!(!dir.path().join(".history.json.tmp").exists());
    }

    #[test]
    fn test_write_all_replaces_every_document() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path()).unwrap();
        backend.write(Entity::Members, "[1]").unwrap();
        backend
            .write_all(&[
                (Entity::Members, "[2]".to_string()),
                (Entity::History, "[3]".to_string()),
            ])
            .unwrap();
        assert_eq!(backend.read(Entity::Members).unwrap().as_deref(), Some(b"[2]".as_slice()));
        assert_eq!(backend.read(Entity::History).unwrap().as_deref(), Some(b"[3]".as_slice()));
    }

    #[test]
    fn test_write_all_staging_failure_keeps_old_documents() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path()).unwrap();
        backend.write(Entity::Members, "[1]").unwrap();
        backend.write(Entity::History, "[1]").unwrap();
        // A directory in the staging spot makes the second stage fail.
        std::fs::create_dir(dir.path().join(".history.json.tmp")).unwrap();

        let err = backend.write_all(&[
            (Entity::Members, "[2]".to_string()),
            (Entity::History, "[2]".to_string()),
        ]);
        assert!(err.is_err());
        assert_eq!(backend.read(Entity::Members).unwrap().as_deref(), Some(b"[1]".as_slice()));
        assert_eq!(backend.read(Entity::History).unwrap().as_deref(), Some(b"[1]".as_slice()));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.is_file() && p.to_string_lossy().ends_with(".json.tmp"))
            .collect();
        assert!(leftovers.is_empty(), "staged files left behind: {leftovers:?}");
    }
}
