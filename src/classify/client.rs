//! HTTP client for the HuggingFace zero-shot classification endpoint.
//!
//! One outbound request per classify call (plus retries). The action is
//! the input text; the guideline is embedded into three natural-language
//! hypotheses, one per canonical label.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use super::retry::RetryPolicy;
use super::{resolve, Candidate, Classification, Classifier, CANDIDATE_LABELS};
use crate::config::HuggingFaceConfig;
use crate::error::ClassificationError;

pub struct HuggingFaceClassifier {
    http: reqwest::Client,
    config: HuggingFaceConfig,
    retry: RetryPolicy,
}

impl HuggingFaceClassifier {
    pub fn new(config: HuggingFaceConfig) -> Result<Self, ClassificationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config,
            retry: RetryPolicy::default(),
        })
    }

    /// Override the default retry schedule.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn request_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model_id
        )
    }

    /// The three zero-shot hypotheses, one per canonical label.
    fn hypotheses(guideline: &str) -> Vec<String> {
        CANDIDATE_LABELS
            .iter()
            .map(|label| format!("{label} with guideline: {guideline}"))
            .collect()
    }

    /// One request/response exchange, no retries.
    async fn attempt(
        &self,
        action: &str,
        guideline: &str,
    ) -> Result<Vec<Candidate>, ClassificationError> {
        let payload = json!({
            "inputs": action,
            "parameters": { "candidate_labels": Self::hypotheses(guideline) },
        });

        let mut request = self.http.post(self.request_url()).json(&payload);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::REQUEST_TIMEOUT => ClassificationError::Timeout { body },
                StatusCode::TOO_MANY_REQUESTS => ClassificationError::RateLimited { body },
                s if s.is_server_error() => ClassificationError::Server {
                    status: s.as_u16(),
                    body,
                },
                s => ClassificationError::Client {
                    status: s.as_u16(),
                    body,
                },
            });
        }

        let body = response.text().await?;
        let candidates: Vec<Candidate> = serde_json::from_str(&body)?;
        Ok(candidates)
    }
}

#[async_trait]
impl Classifier for HuggingFaceClassifier {
    async fn classify(
        &self,
        action: &str,
        guideline: &str,
    ) -> Result<Classification, ClassificationError> {
        tracing::debug!(model = %self.config.model_id, "sending zero-shot classification request");

        let candidates = self.retry.run(|| self.attempt(action, guideline)).await?;
        let outcome = resolve(&candidates, self.config.confidence_threshold)?;

        tracing::debug!(
            verdict = %outcome.verdict,
            confidence = outcome.confidence,
            "classification resolved"
        );
        Ok(outcome)
    }
}
