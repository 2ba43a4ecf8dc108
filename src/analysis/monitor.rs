//! Drives one classify-then-persist cycle.

use std::sync::Arc;

use chrono::Utc;

use super::{AnalysisRecord, AnalysisSummary, NewAnalysis, PagedResult};
use crate::classify::Classifier;
use crate::error::AnalysisError;
use crate::store::AnalysisStore;
use crate::validate;

/// Orchestrates the compliance pipeline: validate, classify, persist.
///
/// The classifier owns its retry policy; a classification that still
/// fails here is final and nothing is written. A store failure after a
/// successful classification surfaces as-is; the classification work is
/// not retried, queued or cached. Known limitation: that verdict is lost
/// and the caller has to analyze again.
pub struct AnalysisMonitor {
    classifier: Arc<dyn Classifier>,
    store: AnalysisStore,
}

impl AnalysisMonitor {
    pub fn new(classifier: Arc<dyn Classifier>, store: AnalysisStore) -> Self {
        Self { classifier, store }
    }

    /// Classify `action` against `guideline` and persist the outcome.
    ///
    /// Exactly one record is created per successful call. Cancelling the
    /// returned future before the store write is dispatched persists
    /// nothing; once dispatched, the insert is atomic and may still
    /// complete, so a partial record is never written either way.
    pub async fn analyze(
        &self,
        action: &str,
        guideline: &str,
    ) -> Result<AnalysisRecord, AnalysisError> {
        validate::check_analyze_request(action, guideline)?;

        let outcome = self
            .classifier
            .classify(action, guideline)
            .await
            .map_err(|err| {
                tracing::error!(action, guideline, "classification failed: {err}");
                AnalysisError::Classification(err)
            })?;

        let record = self
            .store
            .add(NewAnalysis {
                action: action.to_string(),
                guideline: guideline.to_string(),
                verdict: outcome.verdict,
                confidence: outcome.confidence,
                timestamp: Utc::now(),
            })
            .await?;

        tracing::debug!(
            id = record.id,
            verdict = %record.verdict,
            confidence = record.confidence,
            "analysis stored"
        );
        Ok(record)
    }

    /// One page of past analyses, most recent first.
    pub async fn page(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<PagedResult<AnalysisRecord>, AnalysisError> {
        Ok(self.store.page(page, page_size).await?)
    }

    /// Full history, most recent first.
    pub async fn history(&self) -> Result<Vec<AnalysisRecord>, AnalysisError> {
        Ok(self.store.history().await?)
    }

    /// Aggregate verdict counts, computed fresh per call.
    pub async fn summary(&self) -> Result<AnalysisSummary, AnalysisError> {
        Ok(self.store.summary().await?)
    }
}
