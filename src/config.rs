//! Configuration for the classification endpoint.

use serde::{Deserialize, Serialize};

/// Connection settings for the HuggingFace zero-shot inference endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    /// Base inference URL (e.g. https://api-inference.huggingface.co/models).
    pub endpoint: String,
    /// Model identifier, appended to the endpoint path.
    pub model_id: String,
    /// Bearer token, attached to requests when present. Key management and
    /// rotation stay with the embedding application.
    pub api_token: Option<String>,
    /// Winning scores below this downgrade COMPLIES/DEVIATES to UNCLEAR.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

pub(crate) fn default_confidence_threshold() -> f64 {
    0.6
}

fn default_timeout_secs() -> u64 {
    30
}

impl HuggingFaceConfig {
    /// Load from environment variables. Returns `None` when the endpoint or
    /// model id is unset or empty.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("HUGGINGFACE_ENDPOINT").ok()?;
        let model_id = std::env::var("HUGGINGFACE_MODEL_ID").ok()?;

        if endpoint.is_empty() || model_id.is_empty() {
            return None;
        }

        let api_token = std::env::var("HUGGINGFACE_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        let confidence_threshold = std::env::var("GUIDEWATCH_CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_confidence_threshold);

        Some(Self {
            endpoint,
            model_id,
            api_token,
            confidence_threshold,
            timeout_secs: default_timeout_secs(),
        })
    }
}
