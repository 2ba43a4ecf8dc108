//! SQLite-backed persistence for analysis records.
//!
//! Connections come from an r2d2 pool with WAL enabled, so concurrent
//! adds do not serialise behind one process-wide mutex; SQLite's own page
//! lock plus `busy_timeout` arbitrates writers. Blocking SQLite work runs
//! on the tokio blocking pool so async callers only suspend, never block
//! an executor thread.

use std::path::Path;

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::analysis::{AnalysisRecord, AnalysisSummary, NewAnalysis, PagedResult, Verdict};
use crate::error::{StoreError, ValidationError};

const MAX_POOL_SIZE: u32 = 8;

/// Append-only store of analysis outcomes. Cheap to clone; clones share
/// the same pool.
#[derive(Clone)]
pub struct AnalysisStore {
    pool: Pool<SqliteConnectionManager>,
}

impl AnalysisStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous  = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA temp_store   = MEMORY;",
            )
        });
        let pool = Pool::builder().max_size(MAX_POOL_SIZE).build(manager)?;

        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS analyses (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                action     TEXT NOT NULL,
                guideline  TEXT NOT NULL,
                verdict    TEXT NOT NULL,
                confidence REAL NOT NULL,
                timestamp  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_analyses_timestamp ON analyses(timestamp);
            CREATE INDEX IF NOT EXISTS idx_analyses_verdict ON analyses(verdict);",
        )?;
        Ok(())
    }

    /// Insert a record and return it with the generated id.
    ///
    /// The insert runs on the blocking pool and is atomic: a caller that
    /// drops this future mid-flight may find the record committed or
    /// absent, but never partially written.
    pub async fn add(&self, new: NewAnalysis) -> Result<AnalysisRecord, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO analyses (action, guideline, verdict, confidence, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    new.action,
                    new.guideline,
                    new.verdict.as_str(),
                    new.confidence,
                    new.timestamp.to_rfc3339(),
                ],
            )?;
            let id = conn.last_insert_rowid();

            Ok(AnalysisRecord {
                id,
                action: new.action,
                guideline: new.guideline,
                verdict: new.verdict,
                confidence: new.confidence,
                timestamp: new.timestamp,
            })
        })
        .await?
    }

    /// One page of history, most recent first.
    ///
    /// `page` and `page_size` are 1-based and must both be at least 1.
    pub async fn page(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<PagedResult<AnalysisRecord>, StoreError> {
        if page < 1 {
            return Err(ValidationError::InvalidPage(page).into());
        }
        if page_size < 1 {
            return Err(ValidationError::InvalidPageSize(page_size).into());
        }

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;

            let total_items: i64 =
                conn.query_row("SELECT COUNT(*) FROM analyses", [], |row| row.get(0))?;

            let offset = i64::from(page - 1) * i64::from(page_size);
            let mut stmt = conn.prepare(
                "SELECT id, action, guideline, verdict, confidence, timestamp
                 FROM analyses
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?1 OFFSET ?2",
            )?;
            let items = stmt
                .query_map(params![i64::from(page_size), offset], row_to_record)?
                .collect::<Result<Vec<_>, _>>()?;

            let total_pages = (total_items + i64::from(page_size) - 1) / i64::from(page_size);

            Ok(PagedResult {
                items,
                page,
                page_size,
                total_items,
                total_pages,
            })
        })
        .await?
    }

    /// Full history, most recent first.
    pub async fn history(&self) -> Result<Vec<AnalysisRecord>, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT id, action, guideline, verdict, confidence, timestamp
                 FROM analyses
                 ORDER BY timestamp DESC, id DESC",
            )?;
            let items = stmt
                .query_map([], row_to_record)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await?
    }

    /// Aggregate counts grouped by verdict, computed fresh on every call
    /// so concurrent writers are reflected at read time.
    pub async fn summary(&self) -> Result<AnalysisSummary, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare("SELECT verdict, COUNT(*) FROM analyses GROUP BY verdict")?;
            let counts = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;

            let count_for = |verdict: Verdict| {
                counts
                    .iter()
                    .find(|(v, _)| v == verdict.as_str())
                    .map(|(_, n)| *n)
                    .unwrap_or(0)
            };

            let total_complies = count_for(Verdict::Complies);
            let total_deviates = count_for(Verdict::Deviates);
            let total_unclear = count_for(Verdict::Unclear);

            Ok(AnalysisSummary {
                total_all: total_complies + total_deviates + total_unclear,
                total_complies,
                total_deviates,
                total_unclear,
            })
        })
        .await?
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnalysisRecord> {
    Ok(AnalysisRecord {
        id: row.get(0)?,
        action: row.get(1)?,
        guideline: row.get(2)?,
        verdict: Verdict::from_str_lossy(&row.get::<_, String>(3)?),
        confidence: row.get(4)?,
        timestamp: row
            .get::<_, String>(5)
            .ok()
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn test_store(tmp: &TempDir) -> AnalysisStore {
        AnalysisStore::open(&tmp.path().join("analyses.db")).unwrap()
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, secs).unwrap()
    }

    fn new_analysis(verdict: Verdict, timestamp: DateTime<Utc>) -> NewAnalysis {
        NewAnalysis {
            action: "merged a PR".into(),
            guideline: "PRs need one approval".into(),
            verdict,
            confidence: 0.91,
            timestamp,
        }
    }

    #[tokio::test]
    async fn add_assigns_increasing_ids() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        let first = store.add(new_analysis(Verdict::Complies, at(0))).await.unwrap();
        let second = store.add(new_analysis(Verdict::Deviates, at(1))).await.unwrap();

        assert!(first.id >= 1);
        assert!(second.id > first.id);
        assert_eq!(first.verdict, Verdict::Complies);
        assert_eq!(first.confidence, 0.91);
    }

    #[tokio::test]
    async fn page_orders_most_recent_first() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        // Inserted out of chronological order on purpose.
        store.add(new_analysis(Verdict::Complies, at(2))).await.unwrap();
        store.add(new_analysis(Verdict::Deviates, at(1))).await.unwrap();
        store.add(new_analysis(Verdict::Unclear, at(3))).await.unwrap();

        let result = store.page(1, 2).await.unwrap();

        assert_eq!(result.total_items, 3);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].timestamp, at(3));
        assert_eq!(result.items[1].timestamp, at(2));

        let last = store.page(2, 2).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].timestamp, at(1));
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_but_counted() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        store.add(new_analysis(Verdict::Complies, at(0))).await.unwrap();

        let result = store.page(5, 10).await.unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_items, 1);
        assert_eq!(result.total_pages, 1);
    }

    #[tokio::test]
    async fn page_rejects_zero_parameters() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        let err = store.page(0, 10).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::InvalidPage(0))
        ));

        let err = store.page(1, 0).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::InvalidPageSize(0))
        ));
    }

    #[tokio::test]
    async fn summary_counts_each_verdict() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        store.add(new_analysis(Verdict::Complies, at(0))).await.unwrap();
        store.add(new_analysis(Verdict::Deviates, at(1))).await.unwrap();
        store.add(new_analysis(Verdict::Unclear, at(2))).await.unwrap();

        let summary = store.summary().await.unwrap();
        assert_eq!(
            summary,
            AnalysisSummary {
                total_all: 3,
                total_complies: 1,
                total_deviates: 1,
                total_unclear: 1,
            }
        );
    }

    #[tokio::test]
    async fn summary_reports_zero_for_absent_verdicts() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        store.add(new_analysis(Verdict::Complies, at(0))).await.unwrap();
        store.add(new_analysis(Verdict::Complies, at(1))).await.unwrap();

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.total_all, 2);
        assert_eq!(summary.total_complies, 2);
        assert_eq!(summary.total_deviates, 0);
        assert_eq!(summary.total_unclear, 0);
    }

    #[tokio::test]
    async fn reads_reflect_writes_immediately() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        let before = store.summary().await.unwrap();
        assert_eq!(before.total_all, 0);

        store.add(new_analysis(Verdict::Deviates, at(0))).await.unwrap();

        let after = store.summary().await.unwrap();
        assert_eq!(after.total_all, 1);
        assert_eq!(store.page(1, 10).await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn history_returns_everything_newest_first() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        for i in 0..5 {
            store.add(new_analysis(Verdict::Unclear, at(i))).await.unwrap();
        }

        let history = store.history().await.unwrap();
        assert_eq!(history.len(), 5);
        assert!(history.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn concurrent_adds_all_land() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add(new_analysis(Verdict::Complies, at(i))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.total_all, 16);
        assert_eq!(summary.total_complies, 16);
    }
}
