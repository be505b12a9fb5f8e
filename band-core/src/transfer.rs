//! File Transfer Handshake support
//!
//! The host announces a newly selected piece by filename first; members that
//! already hold the file keep their local copy, members that do not mark the
//! piece pending and adopt the base64 payload the host pushes next. The
//! local file store itself is a collaborator boundary.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::sync::TrackRecord;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("not a file: {0}")]
    NotAFile(PathBuf),
}

/// Local piece storage and indexing boundary.
pub trait FileStore: Send + Sync {
    /// Local path of `filename` if the piece is already present.
    fn check_file_exists(&self, filename: &str) -> Option<PathBuf>;

    /// Persist a pushed base64 payload, returning where it was written.
    fn save_temp_file(&self, filename: &str, data: &str) -> Result<PathBuf, TransferError>;

    /// Read a local piece as base64 for pushing to members.
    fn read_file_base64(&self, path: &Path) -> Result<String, TransferError>;

    /// Track index of a local piece (id, name, note count).
    fn list_tracks(&self, path: &Path) -> Result<Vec<TrackRecord>, TransferError>;
}

/// Directory-backed file store.
///
/// Track extraction belongs to the external MIDI indexer, so
/// `list_tracks` here reports an empty index; embedders with an indexer
/// supply their own store.
pub struct DiskFileStore {
    dir: PathBuf,
}

impl DiskFileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl FileStore for DiskFileStore {
    fn check_file_exists(&self, filename: &str) -> Option<PathBuf> {
        let path = self.dir.join(filename);
        path.is_file().then_some(path)
    }

    fn save_temp_file(&self, filename: &str, data: &str) -> Result<PathBuf, TransferError> {
        let bytes = BASE64.decode(data)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    fn read_file_base64(&self, path: &Path) -> Result<String, TransferError> {
        if !path.is_file() {
            return Err(TransferError::NotAFile(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        Ok(BASE64.encode(bytes))
    }

    fn list_tracks(&self, _path: &Path) -> Result<Vec<TrackRecord>, TransferError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> DiskFileStore {
        let dir = std::env::temp_dir().join(format!(
            "band-core-store-{}-{}",
            std::process::id(),
            name
        ));
        DiskFileStore::new(dir)
    }

    #[test]
    fn test_save_then_read_round_trip() {
        let store = temp_store("roundtrip");
        let payload = BASE64.encode(b"MThd fake midi bytes");

        let path = store.save_temp_file("piece.mid", &payload).unwrap();
        assert_eq!(store.check_file_exists("piece.mid"), Some(path.clone()));
        assert_eq!(store.read_file_base64(&path).unwrap(), payload);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file() {
        let store = temp_store("missing");
        assert_eq!(store.check_file_exists("nope.mid"), None);
        assert!(store
            .read_file_base64(Path::new("/definitely/not/here.mid"))
            .is_err());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let store = temp_store("badb64");
        assert!(matches!(
            store.save_temp_file("x.mid", "!!not base64!!"),
            Err(TransferError::Decode(_))
        ));
    }
}
