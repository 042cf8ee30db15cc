use serde::{Deserialize, Serialize};

/// Short-lived credential from the authentication service.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketRequest {
    pub bucket_key: String,
    pub policy_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDetails {
    pub bucket_key: String,
    pub policy_key: Option<String>,
}

/// Remote store acknowledgment for a fully received object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub bucket_key: String,
    pub object_id: String,
    pub object_key: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationJobRequest {
    pub input: TranslationInput,
    pub output: TranslationOutput,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationInput {
    pub urn: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationOutput {
    pub formats: Vec<TranslationFormat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub views: Vec<String>,
}

impl TranslationJobRequest {
    /// Job requesting viewer-ready SVF output with 2d and 3d views.
    pub fn svf(urn: &str) -> Self {
        Self {
            input: TranslationInput { urn: urn.to_string() },
            output: TranslationOutput {
                formats: vec![TranslationFormat {
                    format_type: "svf".to_string(),
                    views: vec!["2d".to_string(), "3d".to_string()],
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationJobAccepted {
    pub result: String,
    pub urn: Option<String>,
}
