//! reqwest client for the remote platform: authentication, bucket
//! provisioning, object storage (direct and resumable), and translation jobs.
//!
//! Every request-building method takes the credential explicitly; the client
//! holds no token state, so callers decide when to acquire or refresh.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use url::Url;

use crate::chunk::{ByteRange, SessionId};
use crate::error::{UploadError, UploadResult};
use crate::rest_types::{
    AccessToken, BucketDetails, CreateBucketRequest, StoredObject, TranslationJobAccepted,
    TranslationJobRequest,
};
use crate::upload::{ChunkAck, ObjectStore};

/// Scope for the backend's own service token.
pub const SERVICE_SCOPE: &str = "data:read data:write data:create bucket:create bucket:read";

/// Read-only scope for viewer tokens handed to the browser.
pub const VIEWER_SCOPE: &str = "viewables:read";

/// Buckets expire after 24 hours; good enough for a demo.
const BUCKET_POLICY: &str = "transient";

const AUTH_ROUTE: &str = "authentication/v1/authenticate";
const BUCKETS_ROUTE: &str = "oss/v2/buckets";
const TRANSLATION_JOB_ROUTE: &str = "modelderivative/v2/designdata/job";

/// Outcome of a bucket creation attempt. An existing bucket is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCreation {
    Created,
    AlreadyExists,
}

pub struct PlatformClient {
    client: Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
}

impl PlatformClient {
    pub fn new(base_url: Url, client_id: String, client_secret: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            client_id,
            client_secret,
        }
    }

    /// Bucket key for this application. Prefixed with the client id because
    /// bucket keys are unique across all accounts on the platform.
    pub fn bucket_key(&self) -> String {
        format!("{}_demo_bucket", self.client_id.to_lowercase())
    }

    pub async fn authenticate(&self, scope: &str) -> UploadResult<AccessToken> {
        let url = self.base_url.join(AUTH_ROUTE)?;
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", scope),
        ];

        let response = self.client.post(url).form(&params).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    pub async fn create_bucket(
        &self,
        token: &AccessToken,
        bucket_key: &str,
    ) -> UploadResult<BucketCreation> {
        let url = self.base_url.join(BUCKETS_ROUTE)?;
        let request = CreateBucketRequest {
            bucket_key: bucket_key.to_string(),
            policy_key: BUCKET_POLICY.to_string(),
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&token.access_token)
            .json(&request)
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT => {
                tracing::debug!(bucket_key, "bucket already exists, skipping creation");
                Ok(BucketCreation::AlreadyExists)
            }
            status if status.is_success() => {
                tracing::info!(bucket_key, "bucket created");
                Ok(BucketCreation::Created)
            }
            status => Err(UploadError::Remote {
                status,
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    pub async fn bucket_details(
        &self,
        token: &AccessToken,
        bucket_key: &str,
    ) -> UploadResult<BucketDetails> {
        let mut url = self.base_url.join(BUCKETS_ROUTE)?;
        Self::push_segments(&mut url, &[bucket_key, "details"])?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    pub async fn submit_translation(
        &self,
        token: &AccessToken,
        urn: &str,
    ) -> UploadResult<TranslationJobAccepted> {
        let url = self.base_url.join(TRANSLATION_JOB_ROUTE)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&token.access_token)
            .json(&TranslationJobRequest::svf(urn))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    fn object_url(&self, object_name: &str) -> UploadResult<Url> {
        let mut url = self.base_url.join(BUCKETS_ROUTE)?;
        Self::push_segments(&mut url, &[&self.bucket_key(), "objects", object_name])?;
        Ok(url)
    }

    // Percent-encodes each segment, unlike Url::join.
    fn push_segments(url: &mut Url, segments: &[&str]) -> UploadResult<()> {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| UploadError::Validation("platform base URL cannot hold paths".to_string()))?;
        path.pop_if_empty().extend(segments);
        drop(path);
        Ok(())
    }

    async fn check(response: reqwest::Response) -> UploadResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(UploadError::Remote {
                status,
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

/// URN of a stored object, as expected by the translation service and viewer.
pub fn object_urn(object_id: &str) -> String {
    BASE64.encode(object_id)
}

#[async_trait]
impl ObjectStore for PlatformClient {
    async fn store_object(
        &self,
        token: &AccessToken,
        object_name: &str,
        bytes: Bytes,
    ) -> UploadResult<StoredObject> {
        let url = self.object_url(object_name)?;

        let response = self
            .client
            .put(url)
            .bearer_auth(&token.access_token)
            .header(header::CONTENT_LENGTH, bytes.len())
            .header(header::CONTENT_DISPOSITION, object_name)
            .body(bytes)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn store_object_chunk(
        &self,
        token: &AccessToken,
        object_name: &str,
        session: &SessionId,
        range: ByteRange,
        total: u64,
        bytes: Bytes,
    ) -> UploadResult<ChunkAck> {
        let mut url = self.object_url(object_name)?;
        Self::push_segments(&mut url, &["resumable"])?;

        let response = self
            .client
            .put(url)
            .bearer_auth(&token.access_token)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header(header::CONTENT_RANGE, range.content_range(total))
            .header("Session-Id", session.as_str())
            .body(bytes)
            .send()
            .await?;
        let response = Self::check(response).await?;

        // 202 means the range was recorded but the session is still open.
        if response.status() == StatusCode::ACCEPTED {
            Ok(ChunkAck::Accepted)
        } else {
            Ok(ChunkAck::Complete(response.json().await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PlatformClient {
        PlatformClient::new(
            Url::parse("https://developer.api.autodesk.com").unwrap(),
            "AbC123".to_string(),
            "secret".to_string(),
        )
    }

    #[test]
    fn bucket_key_is_lowercased_client_id() {
        assert_eq!(client().bucket_key(), "abc123_demo_bucket");
    }

    #[test]
    fn object_url_percent_encodes_the_name() {
        let url = client().object_url("my model v2.rvt").unwrap();
        assert_eq!(
            url.as_str(),
            "https://developer.api.autodesk.com/oss/v2/buckets/abc123_demo_bucket/objects/my%20model%20v2.rvt"
        );
    }

    #[test]
    fn urn_is_standard_base64_of_object_id() {
        let urn = object_urn("urn:adsk.objects:os.object:bucket/model.rvt");
        assert_eq!(
            urn,
            "dXJuOmFkc2sub2JqZWN0czpvcy5vYmplY3Q6YnVja2V0L21vZGVsLnJ2dA=="
        );
    }
}
