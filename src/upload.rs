//! Size-routed object upload: one direct request below the limit, a strictly
//! sequential chunk sequence above it.
//!
//! The chunk sequence never overlaps requests: chunk *i + 1* is not issued
//! until chunk *i* has been acknowledged, which is what the remote store's
//! range-based resumability contract depends on. The first failure aborts the
//! sequence and surfaces the session id and failing byte range.

use async_trait::async_trait;
use bytes::Bytes;

use crate::chunk::{self, ByteRange, DEFAULT_CHUNK_SIZE, DEFAULT_DIRECT_LIMIT, SessionId};
use crate::error::{UploadError, UploadResult};
use crate::rest_types::{AccessToken, StoredObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStrategy {
    Direct,
    Chunked,
}

/// Pick the transfer strategy for a payload of `len` bytes. Total over all
/// lengths; the boundary `len == direct_limit` stays direct.
pub fn select_strategy(len: u64, direct_limit: u64) -> TransferStrategy {
    if len <= direct_limit {
        TransferStrategy::Direct
    } else {
        TransferStrategy::Chunked
    }
}

/// Store acknowledgment for one chunk: either the range was recorded, or the
/// session is complete and the object exists.
#[derive(Debug, Clone)]
pub enum ChunkAck {
    Accepted,
    Complete(StoredObject),
}

/// Remote object store collaborator.
///
/// Chunk uploads for the same range and session are idempotent on the remote
/// side; the store returns the final object once all expected bytes for a
/// session have been received.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Single-shot store of an entire payload.
    async fn store_object(
        &self,
        token: &AccessToken,
        object_name: &str,
        bytes: Bytes,
    ) -> UploadResult<StoredObject>;

    /// Store one byte range of a payload under a shared session.
    async fn store_object_chunk(
        &self,
        token: &AccessToken,
        object_name: &str,
        session: &SessionId,
        range: ByteRange,
        total: u64,
        bytes: Bytes,
    ) -> UploadResult<ChunkAck>;
}

/// Uploads a named payload through an [`ObjectStore`], routing by size.
pub struct Uploader<'a, S: ObjectStore> {
    store: &'a S,
    chunk_size: u64,
    direct_limit: u64,
}

impl<'a, S: ObjectStore> Uploader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
            direct_limit: DEFAULT_DIRECT_LIMIT,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_direct_limit(mut self, direct_limit: u64) -> Self {
        self.direct_limit = direct_limit;
        self
    }

    /// Transfer `payload` to the store as `object_name`.
    ///
    /// Zero-length payloads and empty object names are rejected before any
    /// network call. The returned object comes from the single direct
    /// acknowledgment or from the final chunk's acknowledgment.
    pub async fn upload(
        &self,
        token: &AccessToken,
        object_name: &str,
        payload: Bytes,
    ) -> UploadResult<StoredObject> {
        if object_name.is_empty() {
            return Err(UploadError::Validation("object name is empty".to_string()));
        }
        if payload.is_empty() {
            return Err(UploadError::Validation(format!(
                "refusing zero-length upload for '{object_name}'"
            )));
        }

        match select_strategy(payload.len() as u64, self.direct_limit) {
            TransferStrategy::Direct => {
                tracing::debug!(object = object_name, len = payload.len(), "direct upload");
                self.store.store_object(token, object_name, payload).await
            }
            TransferStrategy::Chunked => self.upload_chunked(token, object_name, payload).await,
        }
    }

    async fn upload_chunked(
        &self,
        token: &AccessToken,
        object_name: &str,
        payload: Bytes,
    ) -> UploadResult<StoredObject> {
        let total = payload.len() as u64;
        let session = SessionId::generate();
        let ranges = chunk::partition(total, self.chunk_size);

        tracing::info!(
            %session,
            object = object_name,
            total,
            chunks = ranges.len(),
            "starting chunked upload"
        );

        let mut last_ack = ChunkAck::Accepted;
        for (index, range) in ranges.into_iter().enumerate() {
            let body = payload.slice(range.start as usize..range.end as usize);
            tracing::debug!(%session, index, %range, "uploading chunk");

            last_ack = self
                .store
                .store_object_chunk(token, object_name, &session, range, total, body)
                .await
                .map_err(|source| UploadError::Chunk {
                    session: session.clone(),
                    index,
                    range,
                    source: Box::new(source),
                })?;
        }

        match last_ack {
            ChunkAck::Complete(object) => {
                tracing::info!(%session, object = object_name, "chunked upload complete");
                Ok(object)
            }
            ChunkAck::Accepted => Err(UploadError::IncompleteSession { session }),
        }
    }
}
