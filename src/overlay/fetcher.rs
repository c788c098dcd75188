//! Overlay image fetcher with caching.
//!
//! Overlays and watermark brand marks are stored as objects in S3. The
//! [`OverlayFetcher`] trait is the seam the pipeline fetches through, so
//! tests and other deployments can supply their own storage.
//!
//! # Caching
//!
//! [`S3OverlayFetcher`] keeps the raw object bytes in a `moka` cache keyed
//! by `bucket/key`. Bytes are cached rather than decoded images because
//! every request resizes the overlay relative to its own base image.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use moka::future::Cache;
use std::time::Duration;
use tracing::{debug, warn};

use crate::aws::collaborator_error;
use crate::config::OverlayCacheConfig;
use crate::error::CollaboratorError;

/// Fetches overlay objects from storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OverlayFetcher: Send + Sync {
    /// Read the object at `bucket`/`key`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, CollaboratorError>;
}

/// [`OverlayFetcher`] backed by an S3 client.
#[derive(Clone)]
pub struct S3OverlayFetcher {
    client: S3Client,
    cache: Option<Cache<String, Bytes>>,
}

impl S3OverlayFetcher {
    pub fn new(client: S3Client, cache_config: &OverlayCacheConfig) -> Self {
        let cache = if cache_config.max_entries > 0 {
            Some(
                Cache::builder()
                    .max_capacity(cache_config.max_entries)
                    .time_to_live(Duration::from_secs(cache_config.ttl_seconds))
                    .build(),
            )
        } else {
            None
        };

        Self { client, cache }
    }

    /// Get the number of cached objects.
    pub fn cache_size(&self) -> u64 {
        self.cache.as_ref().map(|c| c.entry_count()).unwrap_or(0)
    }

    /// Clear all cached objects.
    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
        }
    }

    async fn fetch_from_s3(&self, bucket: &str, key: &str) -> Result<Bytes, CollaboratorError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let err = collaborator_error(e);
                warn!(bucket = bucket, key = key, error = %err, "Overlay fetch failed");
                err
            })?;

        let body = response.body.collect().await.map_err(|e| {
            CollaboratorError::new(
                None,
                Some("BodyReadFailed".to_string()),
                format!("Failed to read S3 body: {e}"),
            )
        })?;

        Ok(body.into_bytes())
    }
}

impl std::fmt::Debug for S3OverlayFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3OverlayFetcher")
            .field("cached", &self.cache_size())
            .finish()
    }
}

/// Cache key for an object location.
pub fn cache_key(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}

#[async_trait]
impl OverlayFetcher for S3OverlayFetcher {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, CollaboratorError> {
        let cache_key = cache_key(bucket, key);

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&cache_key).await {
                debug!(object = %cache_key, "Overlay cache hit");
                return Ok(cached);
            }
        }

        let data = self.fetch_from_s3(bucket, key).await?;
        debug!(object = %cache_key, bytes = data.len(), "Fetched overlay");

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, data.clone()).await;
        }

        Ok(data)
    }
}
