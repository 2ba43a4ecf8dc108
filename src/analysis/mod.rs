//! Domain types for guideline compliance analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod monitor;

// ── Verdict ──────────────────────────────────────────────────────

/// Outcome of judging one action against one guideline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The action follows the guideline.
    Complies,
    /// The action goes against the guideline.
    Deviates,
    /// The classifier could not take a side, or its confidence was too low.
    Unclear,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complies => "COMPLIES",
            Self::Deviates => "DEVIATES",
            Self::Unclear => "UNCLEAR",
        }
    }

    /// Lossy mapping used when reading back from storage.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "COMPLIES" => Self::Complies,
            "DEVIATES" => Self::Deviates,
            _ => Self::Unclear,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Records ──────────────────────────────────────────────────────

/// A persisted analysis outcome. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Row id assigned by the store.
    pub id: i64,
    /// Free-text description of the operation under judgment.
    pub action: String,
    /// Free-text policy the action was evaluated against.
    pub guideline: String,
    pub verdict: Verdict,
    /// Raw winning score, rounded to 4 decimal places.
    pub confidence: f64,
    /// When the analysis completed, UTC.
    pub timestamp: DateTime<Utc>,
}

/// Input to [`crate::store::AnalysisStore::add`]; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub action: String,
    pub guideline: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

// ── Aggregates ───────────────────────────────────────────────────

/// Aggregate verdict counts over the whole history.
///
/// `total_all` always equals the sum of the three sub-counts; a verdict
/// with no records contributes 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_all: i64,
    pub total_complies: i64,
    pub total_deviates: i64,
    pub total_unclear: i64,
}

/// One page of an ordered listing.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    /// Full count across all pages.
    pub total_items: i64,
    /// `ceil(total_items / page_size)`.
    pub total_pages: i64,
}
