//! Dashboard aggregation.
//!
//! Counts are independent snapshots taken concurrently; there is no
//! cross-collection consistency.

use mongodb::bson::Document;

use crate::db::{AdminRepository, AnalysisRepository, Collection, DocumentStore, RepositoryError};
use crate::models::AnalysisResult;

/// Scores strictly above this are excellent.
pub const EXCELLENT_THRESHOLD: f64 = 0.5;

/// Document counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionCounts {
    pub admins: u64,
    pub devices: u64,
    pub images: u64,
    pub feedbacks: u64,
}

/// Analysis records per quality bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityCounts {
    pub excellent: u64,
    pub low: u64,
    pub error: u64,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardStats {
    pub counts: CollectionCounts,
    /// Mean score over records that have one, two decimals; 0 when none do.
    pub avg_quality_score: f64,
    pub quality_counts: QualityCounts,
}

/// Which bucket an analysis record falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityBucket {
    Excellent,
    Low,
    Error,
}

/// Classify one record. Errors take precedence over the score; records
/// with neither an error nor a score are not counted.
#[must_use]
pub fn classify(result: &AnalysisResult) -> Option<QualityBucket> {
    if result.error_flag {
        return Some(QualityBucket::Error);
    }
    result.quality_score.map(|score| {
        if score > EXCELLENT_THRESHOLD {
            QualityBucket::Excellent
        } else {
            QualityBucket::Low
        }
    })
}

/// Average and bucket counts over a set of analysis records.
#[must_use]
pub fn summarize_analysis(results: &[AnalysisResult]) -> (f64, QualityCounts) {
    let mut counts = QualityCounts::default();
    for result in results {
        match classify(result) {
            Some(QualityBucket::Excellent) => counts.excellent += 1,
            Some(QualityBucket::Low) => counts.low += 1,
            Some(QualityBucket::Error) => counts.error += 1,
            None => {}
        }
    }

    let scores: Vec<f64> = results.iter().filter_map(|r| r.quality_score).collect();
    let average = if scores.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)] // record counts stay far below 2^52
        let len = scores.len() as f64;
        round2(scores.iter().sum::<f64>() / len)
    };

    (average, counts)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Dashboard aggregation service.
pub struct DashboardService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> DashboardService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Collect counts and the quality summary.
    ///
    /// # Errors
    ///
    /// Returns the first `RepositoryError` from any of the reads.
    pub async fn summarize(&self) -> Result<DashboardStats, RepositoryError> {
        let admins = AdminRepository::new(self.store);
        let analysis = AnalysisRepository::new(self.store);

        let (admins, devices, images, feedbacks, results) = tokio::join!(
            admins.count(),
            self.store.count(Collection::Devices, Document::new()),
            self.store.count(Collection::Images, Document::new()),
            self.store.count(Collection::Feedbacks, Document::new()),
            analysis.list_scores(),
        );

        let (avg_quality_score, quality_counts) = summarize_analysis(&results?);

        Ok(DashboardStats {
            counts: CollectionCounts {
                admins: admins?,
                devices: devices?,
                images: images?,
                feedbacks: feedbacks?,
            },
            avg_quality_score,
            quality_counts,
        })
    }
}
