//! Demo backend bridging a browser 3D viewer to a cloud model-conversion
//! platform: short-lived service credentials, transient bucket provisioning,
//! size-routed object upload (direct below 10 MiB, chunked resumable above),
//! and translation job submission.

pub mod chunk;
pub mod client;
pub mod config;
pub mod error;
pub mod rest_types;
pub mod server;
pub mod upload;

pub use chunk::{ByteRange, DEFAULT_CHUNK_SIZE, DEFAULT_DIRECT_LIMIT, SessionId};
pub use client::{PlatformClient, object_urn};
pub use error::{UploadError, UploadResult};
pub use rest_types::{AccessToken, StoredObject};
pub use upload::{ChunkAck, ObjectStore, TransferStrategy, Uploader, select_strategy};
