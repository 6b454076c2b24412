//! Tabular view over opaque records.
//!
//! Devices, images, analysis results and feedbacks have no schema this
//! application relies on; listings render whatever fields the documents carry.

use mongodb::bson::{Bson, Document};

/// Documents flattened into a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    /// Union of top-level field names, in order of first appearance.
    pub columns: Vec<String>,
    /// One row per document, one cell per column; missing fields are empty.
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    #[must_use]
    pub fn from_documents(documents: &[Document]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for document in documents {
            for key in document.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = documents
            .iter()
            .map(|document| {
                columns
                    .iter()
                    .map(|column| document.get(column).map(display).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn display(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::Double(n) => n.to_string(),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Boolean(flag) => flag.to_string(),
        Bson::Null | Bson::Undefined => String::new(),
        other => other.to_string(),
    }
}
