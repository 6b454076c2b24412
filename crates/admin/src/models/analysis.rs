//! Analysis result records.
//!
//! Documents in `analysis_results` are written by the image pipeline, not by
//! this application, so both fields are optional and loosely typed. They are
//! normalized here, once, at the boundary.

use mongodb::bson::{Bson, Document};

/// Field holding the quality score.
pub const QUALITY_SCORE_FIELD: &str = "quality_score";

/// Field holding the error marker.
pub const ERROR_FLAG_FIELD: &str = "error_flag";

/// The parts of an analysis record the dashboard consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalysisResult {
    /// Quality score; `None` when absent or not numeric.
    pub quality_score: Option<f64>,
    /// Whether the analysis flagged an error.
    pub error_flag: bool,
}

impl AnalysisResult {
    /// Read an analysis record, tolerating missing or oddly typed fields.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        Self {
            quality_score: document.get(QUALITY_SCORE_FIELD).and_then(as_number),
            error_flag: document.get(ERROR_FLAG_FIELD).is_some_and(is_truthy),
        }
    }
}

#[allow(clippy::cast_precision_loss)] // scores are small; precision loss on huge ints is irrelevant
fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(n) if n.is_finite() => Some(*n),
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        _ => None,
    }
}

/// Loose truthiness, matching how the pipeline writes `error_flag`.
fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(flag) => *flag,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0 && !n.is_nan(),
        Bson::String(s) => !s.is_empty(),
        Bson::Array(items) => !items.is_empty(),
        Bson::Document(doc) => !doc.is_empty(),
        Bson::Null | Bson::Undefined => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    #[test]
    fn test_numeric_scores() {
        let double = AnalysisResult::from_document(&doc! { "quality_score": 0.75 });
        assert_eq!(double.quality_score, Some(0.75));

        let int = AnalysisResult::from_document(&doc! { "quality_score": 1_i32 });
        assert_eq!(int.quality_score, Some(1.0));

        let long = AnalysisResult::from_document(&doc! { "quality_score": 0_i64 });
        assert_eq!(long.quality_score, Some(0.0));
    }

    #[test]
    fn test_non_numeric_score_is_absent() {
        let text = AnalysisResult::from_document(&doc! { "quality_score": "0.9" });
        assert_eq!(text.quality_score, None);

        let null = AnalysisResult::from_document(&doc! { "quality_score": Bson::Null });
        assert_eq!(null.quality_score, None);

        let missing = AnalysisResult::from_document(&doc! {});
        assert_eq!(missing, AnalysisResult::default());
    }

    #[test]
    fn test_error_flag_truthiness() {
        let truthy = [
            Bson::Boolean(true),
            Bson::Int32(1),
            Bson::Int64(-3),
            Bson::Double(0.5),
            Bson::String("yes".into()),
            Bson::Array(vec![Bson::Int32(0)]),
        ];
        for value in truthy {
            let result = AnalysisResult::from_document(&doc! { "error_flag": value.clone() });
            assert!(result.error_flag, "{value:?} should be truthy");
        }

        let falsy = [
            Bson::Boolean(false),
            Bson::Int32(0),
            Bson::Double(0.0),
            Bson::String(String::new()),
            Bson::Array(vec![]),
            Bson::Null,
        ];
        for value in falsy {
            let result = AnalysisResult::from_document(&doc! { "error_flag": value.clone() });
            assert!(!result.error_flag, "{value:?} should be falsy");
        }
    }
}
