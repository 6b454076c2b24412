//! Analysis result reads.

use mongodb::bson::doc;

use super::{Collection, DocumentStore, FindQuery, RepositoryError};
use crate::models::AnalysisResult;
use crate::models::analysis::{ERROR_FLAG_FIELD, QUALITY_SCORE_FIELD};

/// Repository for the `analysis_results` collection.
pub struct AnalysisRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AnalysisRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Score and error marker of every analysis record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_scores(&self) -> Result<Vec<AnalysisResult>, RepositoryError> {
        let documents = self
            .store
            .find(
                Collection::AnalysisResults,
                FindQuery::all().with_projection(doc! {
                    QUALITY_SCORE_FIELD: 1,
                    ERROR_FLAG_FIELD: 1,
                }),
            )
            .await?;

        Ok(documents.iter().map(AnalysisResult::from_document).collect())
    }
}
