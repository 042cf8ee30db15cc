//! Error types for the upload pipeline.

use reqwest::StatusCode;
use thiserror::Error;

use crate::chunk::{ByteRange, SessionId};

#[derive(Error, Debug)]
pub enum UploadError {
    /// Malformed or missing input, caught before any network call.
    #[error("invalid upload request: {0}")]
    Validation(String),

    /// The remote service answered with a non-success status.
    #[error("remote service rejected the request ({status}): {message}")]
    Remote { status: StatusCode, message: String },

    /// Network-level failure before a response arrived.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// A chunk upload failed; the sequence was aborted at this chunk.
    #[error("chunk {index} (bytes {range}) of session {session} failed: {source}")]
    Chunk {
        session: SessionId,
        index: usize,
        range: ByteRange,
        #[source]
        source: Box<UploadError>,
    },

    /// The store acknowledged the final chunk without producing an object.
    #[error("session {session} ended without a completed object after the final chunk")]
    IncompleteSession { session: SessionId },

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type UploadResult<T> = Result<T, UploadError>;
