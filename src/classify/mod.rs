//! Zero-shot classification of actions against guidelines.
//!
//! The wire-facing client lives in [`client`]; this module owns the pure
//! response handling: winner selection, label normalization and the
//! confidence threshold. Keeping those as plain functions means the whole
//! post-processing pipeline is testable without a single HTTP request.

use async_trait::async_trait;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::analysis::Verdict;
use crate::error::ClassificationError;

pub mod client;
pub mod retry;

pub use client::HuggingFaceClassifier;
pub use retry::RetryPolicy;

/// Canonical candidate labels, in the order they are sent to the endpoint.
pub const CANDIDATE_LABELS: [&str; 3] = ["complies", "deviates", "unclear"];

// ── Wire types ───────────────────────────────────────────────────

/// One element of the raw classifier response. Never persisted.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub label: String,
    /// Unbounded; some models return raw logits, which may be negative.
    pub score: f64,
}

/// Field names arrive in whatever casing the inference backend emits, so
/// keys are matched case-insensitively. Unknown fields are skipped.
impl<'de> Deserialize<'de> for Candidate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CandidateVisitor;

        impl<'de> Visitor<'de> for CandidateVisitor {
            type Value = Candidate;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an object with label and score fields")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Candidate, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut label: Option<String> = None;
                let mut score: Option<f64> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.to_ascii_lowercase().as_str() {
                        "label" => label = Some(map.next_value()?),
                        "score" => score = Some(map.next_value()?),
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                Ok(Candidate {
                    label: label.ok_or_else(|| serde::de::Error::missing_field("label"))?,
                    score: score.ok_or_else(|| serde::de::Error::missing_field("score"))?,
                })
            }
        }

        deserializer.deserialize_map(CandidateVisitor)
    }
}

/// Normalized classification outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub verdict: Verdict,
    /// Raw winning score rounded to 4 decimal places. Computed before any
    /// threshold downgrade and unaffected by it.
    pub confidence: f64,
}

// ── Capability interface ─────────────────────────────────────────

/// Capability interface over the external classifier, so the monitor can
/// be driven by canned outcomes in tests.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        action: &str,
        guideline: &str,
    ) -> Result<Classification, ClassificationError>;
}

/// Classifier that replays a fixed candidate list through the normal
/// post-processing pipeline. Intended for tests and offline use.
pub struct FixedClassifier {
    candidates: Vec<Candidate>,
    threshold: f64,
}

impl FixedClassifier {
    pub fn new(candidates: Vec<Candidate>, threshold: f64) -> Self {
        Self {
            candidates,
            threshold,
        }
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(
        &self,
        _action: &str,
        _guideline: &str,
    ) -> Result<Classification, ClassificationError> {
        resolve(&self.candidates, self.threshold)
    }
}

// ── Response post-processing ─────────────────────────────────────

/// Pick the candidate with the numerically maximum score. Ties keep the
/// earliest response element; the response order is never re-sorted.
fn select_winner(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut best: Option<&Candidate> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.score > current.score => best = Some(candidate),
            None => best = Some(candidate),
            _ => {}
        }
    }
    best
}

/// Map a raw winning label onto a [`Verdict`]: first whitespace-delimited
/// token, lowercased. Unknown labels fall back to `Unclear`.
fn normalize_label(label: &str) -> Verdict {
    let token = label.split_whitespace().next().unwrap_or("");
    match token.to_ascii_lowercase().as_str() {
        "complies" => Verdict::Complies,
        "deviates" => Verdict::Deviates,
        _ => Verdict::Unclear,
    }
}

fn round4(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

/// Full post-processing of a raw candidate list: select the winner,
/// normalize its label, apply the confidence threshold.
pub(crate) fn resolve(
    candidates: &[Candidate],
    threshold: f64,
) -> Result<Classification, ClassificationError> {
    let winner = select_winner(candidates).ok_or(ClassificationError::EmptyResponse)?;

    let mut verdict = normalize_label(&winner.label);
    // Confidence reports the raw score even when the verdict is downgraded.
    let confidence = round4(winner.score);

    if matches!(verdict, Verdict::Complies | Verdict::Deviates) && winner.score < threshold {
        tracing::debug!(
            %verdict,
            score = winner.score,
            threshold,
            "winning score below threshold, downgrading to UNCLEAR"
        );
        verdict = Verdict::Unclear;
    }

    Ok(Classification {
        verdict,
        confidence,
    })
}
