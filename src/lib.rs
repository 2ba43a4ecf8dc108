//! guidewatch: zero-shot compliance monitoring core.
//!
//! Classifies free-text actions against free-text guidelines through an
//! external zero-shot classification endpoint, persists every verdict,
//! and serves paginated history plus aggregate counts.
//!
//! Three pieces make up the pipeline:
//! - [`classify`]: a resilient client around the inference call (retry
//!   with exponential backoff, response parsing, label normalization,
//!   confidence thresholding);
//! - [`AnalysisMonitor`]: one classify-then-persist cycle;
//! - [`store::AnalysisStore`]: SQLite-backed history and aggregation.
//!
//! Transport framing, authorization and process bootstrap belong to the
//! embedding application; this crate consumes and produces plain values.

pub mod analysis;
pub mod classify;
pub mod config;
pub mod error;
pub mod store;
pub mod validate;

pub use analysis::monitor::AnalysisMonitor;
pub use analysis::{AnalysisRecord, AnalysisSummary, PagedResult, Verdict};
pub use classify::{
    Classification, Classifier, FixedClassifier, HuggingFaceClassifier, RetryPolicy,
};
pub use config::HuggingFaceConfig;
pub use error::{AnalysisError, ClassificationError, StoreError, ValidationError};
pub use store::AnalysisStore;
