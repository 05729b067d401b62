// SPDX-License-Identifier: MIT

//! A filesystem [`StorageAdapter`]: one `zstd`-compressed JSON file
//! per key under a configurable root. Content is hashed with `sha2`
//! before compression so two consecutive hibernations of an unchanged
//! agent are easy to verify as byte-identical.

use crate::checkpoint::{Checkpoint, Thread};
use crate::error::InstanceError;
use crate::storage::StorageAdapter;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

pub struct FilesystemStorageAdapter {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FilesystemStorageAdapter {
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, write_lock: Mutex::new(()) })
    }

    fn checkpoint_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.ckpt.zst", sanitize(key)))
    }

    fn thread_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.thread.zst", sanitize(id)))
    }

    fn write_compressed(&self, path: &PathBuf, bytes: &[u8], key: &str) -> Result<(), InstanceError> {
        let digest = Sha256::digest(bytes);
        let hash = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
        let compressed =
            zstd::stream::encode_all(bytes, 3).map_err(|err| storage_err(key, err.to_string()))?;
        let _guard = self.write_lock.lock();
        fs::write(path, &compressed).map_err(|err| storage_err(key, err.to_string()))?;
        tracing::debug!(key, content_hash = %hash, bytes = compressed.len(), "wrote checkpoint");
        Ok(())
    }

    fn read_decompressed(&self, path: &PathBuf, key: &str) -> Result<Option<Vec<u8>>, InstanceError> {
        match fs::read(path) {
            Ok(compressed) => {
                let bytes = zstd::stream::decode_all(compressed.as_slice())
                    .map_err(|err| storage_err(key, err.to_string()))?;
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_err(key, err.to_string())),
        }
    }
}

fn sanitize(key: &str) -> String {
    key.chars().map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' }).collect()
}

fn storage_err(key: &str, reason: String) -> InstanceError {
    InstanceError::Storage { key: key.to_string(), reason }
}

#[async_trait]
impl StorageAdapter for FilesystemStorageAdapter {
    async fn put_checkpoint(&self, key: &str, checkpoint: &Checkpoint) -> Result<(), InstanceError> {
        let json = serde_json::to_vec(checkpoint).map_err(|err| storage_err(key, err.to_string()))?;
        self.write_compressed(&self.checkpoint_path(key), &json, key)
    }

    async fn get_checkpoint(&self, key: &str) -> Result<Option<Checkpoint>, InstanceError> {
        match self.read_decompressed(&self.checkpoint_path(key), key)? {
            Some(bytes) => {
                let checkpoint = serde_json::from_slice(&bytes).map_err(|err| storage_err(key, err.to_string()))?;
                Ok(Some(checkpoint))
            }
            None => Ok(None),
        }
    }

    async fn delete_checkpoint(&self, key: &str) -> Result<(), InstanceError> {
        match fs::remove_file(self.checkpoint_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_err(key, err.to_string())),
        }
    }

    async fn append_thread(&self, id: &str, entries: Vec<Value>) -> Result<u64, InstanceError> {
        let path = self.thread_path(id);
        let mut thread = match self.read_decompressed(&path, id)? {
            Some(bytes) => serde_json::from_slice::<Thread>(&bytes).map_err(|err| storage_err(id, err.to_string()))?,
            None => Thread { id: id.to_string(), rev: 0, entries: Vec::new() },
        };
        thread.entries.extend(entries);
        thread.rev += 1;
        let json = serde_json::to_vec(&thread).map_err(|err| storage_err(id, err.to_string()))?;
        self.write_compressed(&path, &json, id)?;
        Ok(thread.rev)
    }

    async fn load_thread(&self, id: &str) -> Result<Option<Thread>, InstanceError> {
        match self.read_decompressed(&self.thread_path(id), id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(|err| storage_err(id, err.to_string()))?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "fs_storage_tests.rs"]
mod tests;
