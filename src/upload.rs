// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Artifact upload
//!
//! The pipeline publishes the finished archive through [`ArtifactSink`]. Keys
//! are derived from the archive contents, so the destination only ever grows.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::UploadConfig;
use crate::draft::ValidatedDraft;
use crate::errors::{ForjaError, ForjaResult};

/// Hex characters of the content hash used in artifact keys
const KEY_HASH_LEN: usize = 16;

/// Destination for finished archives
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store `bytes` under `key` and return the public URL
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> ForjaResult<String>;
}

/// Storage key for an archive: `<prefix>/<draftId>/[v<version>-]<hash>.zip`
pub fn artifact_key(prefix: &str, draft: &ValidatedDraft, bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes).to_hex();
    let hash = &hash.as_str()[..KEY_HASH_LEN];
    let file = match draft.version {
        Some(version) => format!("v{}-{}.zip", version, hash),
        None => format!("{}.zip", hash),
    };

    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}/{}", draft.id, file)
    } else {
        format!("{}/{}/{}", prefix, draft.id, file)
    }
}

/// Sink that publishes into a local directory
pub struct FilesystemSink {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemSink {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.root.clone(), config.public_base_url.clone())
    }

    fn target(&self, key: &str) -> ForjaResult<PathBuf> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(ForjaError::Upload {
                    key: key.to_string(),
                    message: "key must be a relative path without '.' or '..' segments".into(),
                });
            }
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl ArtifactSink for FilesystemSink {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> ForjaResult<String> {
        let target = self.target(key)?;
        let upload_error = |e: std::io::Error| ForjaError::Upload {
            key: key.to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(upload_error)?;
        }
        tokio::fs::write(&target, &bytes).await.map_err(upload_error)?;

        tracing::debug!(path = %target.display(), size_bytes = bytes.len(), "artifact stored");

        Ok(format!("{}/{}", self.public_base_url.trim_end_matches('/'), key))
    }
}
