//! # quill-storage-local
//!
//! Local filesystem implementation of `MediaStore`: content-addressable
//! storage with two-level directory sharding. Identical uploads dedupe to
//! the same blob, and the media id doubles as the path under the public
//! prefix (`ab/cd/<sha256>.<ext>`).

use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;

use quill_core::error::{AppError, Result};
use quill_core::traits::MediaStore;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g. "./media").
    root: PathBuf,
    /// Public URL prefix the router serves `root` under (e.g. "/media").
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self { root, url_prefix: url_prefix.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Sniffs the image format, hashes the bytes and writes them under a
    /// sharded path. Non-image payloads are a validation error, not a 500.
    async fn save(&self, data: Vec<u8>) -> Result<String> {
        let format = image::guess_format(&data)
            .map_err(|_| AppError::validation("image", "unsupported or corrupt image"))?;
        let ext = format.extensions_str().first().copied().unwrap_or("bin");

        let hash = format!("{:x}", Sha256::digest(&data));
        let media_id = format!("{}/{}/{hash}.{ext}", &hash[0..2], &hash[2..4]);

        let target = self.root.join(&media_id);
        let parent = target
            .parent()
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("media path has no parent")))?;
        fs::create_dir_all(parent).await.map_err(AppError::internal)?;

        if !target.exists() {
            fs::write(&target, &data).await.map_err(AppError::internal)?;
            tracing::debug!(%media_id, bytes = data.len(), "stored media blob");
        }

        Ok(media_id)
    }

    fn url(&self, media_id: &str) -> String {
        format!("{}/{media_id}", self.url_prefix)
    }
}
