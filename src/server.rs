//! Axum server wiring the upload pipeline to HTTP routes.
//!
//! `POST /api/models` runs the full pipeline: authenticate, ensure the
//! bucket exists, transfer the payload (direct or chunked by size), then
//! submit the translation job so the viewer can load the result.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
};
use bytes::Bytes;
use serde::Serialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::client::{self, PlatformClient, SERVICE_SCOPE, VIEWER_SCOPE};
use crate::config::Config;
use crate::error::UploadError;
use crate::upload::Uploader;

/// Multipart field name the upload form posts its file under.
const UPLOAD_FIELD: &str = "fileToUpload";

/// Generous cap for demo models; axum's default 2 MiB would reject anything
/// worth chunking.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

pub struct AppState {
    pub client: PlatformClient,
}

type ApiError = (StatusCode, String);

#[derive(Debug, Serialize)]
struct ModelUploaded {
    object_id: String,
    urn: String,
}

pub fn router(state: Arc<AppState>, static_dir: &str) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/auth/token/public", get(public_token_handler))
        .route("/api/models", post(upload_model_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let client = PlatformClient::new(
        config.platform_base_url.clone(),
        config.client_id.clone(),
        config.client_secret.clone(),
    );
    let state = Arc::new(AppState { client });
    let app = router(state, &config.static_dir);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "modelbridge",
    }))
}

/// Read-only token for the browser viewer.
async fn public_token_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = state
        .client
        .authenticate(VIEWER_SCOPE)
        .await
        .map_err(|e| stage_error("auth", &e))?;

    Ok(Json(serde_json::json!({
        "access_token": token.access_token,
        "expires_in": token.expires_in,
    })))
}

async fn upload_model_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ModelUploaded>, ApiError> {
    let mut file_name: Option<String> = None;
    let mut payload: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("multipart error: {e}")))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            file_name = field.file_name().map(str::to_string);
            payload = Some(field.bytes().await.map_err(|e| {
                (StatusCode::BAD_REQUEST, format!("failed to read upload: {e}"))
            })?);
        }
    }

    let payload = payload.ok_or((
        StatusCode::BAD_REQUEST,
        format!("missing multipart field '{UPLOAD_FIELD}'"),
    ))?;
    let object_name = file_name.filter(|name| !name.is_empty()).ok_or((
        StatusCode::BAD_REQUEST,
        "uploaded file has no name".to_string(),
    ))?;

    let client = &state.client;
    let token = client
        .authenticate(SERVICE_SCOPE)
        .await
        .map_err(|e| stage_error("auth", &e))?;

    let bucket_key = client.bucket_key();
    client
        .create_bucket(&token, &bucket_key)
        .await
        .map_err(|e| stage_error("bucket", &e))?;
    client
        .bucket_details(&token, &bucket_key)
        .await
        .map_err(|e| stage_error("bucket", &e))?;

    let object = Uploader::new(client)
        .upload(&token, &object_name, payload)
        .await
        .map_err(|e| stage_error("upload", &e))?;

    let urn = client::object_urn(&object.object_id);
    client
        .submit_translation(&token, &urn)
        .await
        .map_err(|e| stage_error("conversion", &e))?;

    tracing::info!(object_id = %object.object_id, %urn, "model uploaded and translation submitted");
    Ok(Json(ModelUploaded {
        object_id: object.object_id,
        urn,
    }))
}

/// Map a pipeline error to an HTTP response naming the failed stage.
/// Remote rejection statuses pass through verbatim.
fn stage_error(stage: &str, err: &UploadError) -> ApiError {
    tracing::error!(stage, error = %err, "request failed");
    (status_for(err), format!("{stage} failed: {err}"))
}

fn status_for(err: &UploadError) -> StatusCode {
    match err {
        UploadError::Validation(_) => StatusCode::BAD_REQUEST,
        UploadError::Remote { status, .. } => *status,
        UploadError::Transport(_) => StatusCode::BAD_GATEWAY,
        UploadError::Chunk { source, .. } => status_for(source),
        UploadError::IncompleteSession { .. } => StatusCode::BAD_GATEWAY,
        UploadError::Url(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ByteRange, SessionId};

    #[test]
    fn remote_status_passes_through() {
        let err = UploadError::Remote {
            status: StatusCode::CONFLICT,
            message: "bucket exists".to_string(),
        };
        assert_eq!(status_for(&err), StatusCode::CONFLICT);
    }

    #[test]
    fn chunk_errors_report_their_underlying_status() {
        let err = UploadError::Chunk {
            session: SessionId::generate(),
            index: 1,
            range: ByteRange { start: 5, end: 10 },
            source: Box::new(UploadError::Remote {
                status: StatusCode::INSUFFICIENT_STORAGE,
                message: "full".to_string(),
            }),
        };
        assert_eq!(status_for(&err), StatusCode::INSUFFICIENT_STORAGE);

        let (status, message) = stage_error("upload", &err);
        assert_eq!(status, StatusCode::INSUFFICIENT_STORAGE);
        assert!(message.starts_with("upload failed:"));
        assert!(message.contains("chunk 1"));
    }
}
