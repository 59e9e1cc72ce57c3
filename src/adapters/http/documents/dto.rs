//! Request and response bodies for document endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::document::Document;

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadView {
    pub id: i64,
    pub filename: String,
    pub content_type: String,
    pub file_path: String,
    pub file_size: i64,
    pub message: String,
    pub text_preview: String,
}

/// Document metadata as listed to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PdfSummary {
    pub id: i64,
    pub filename: String,
    pub file_path: String,
    pub upload_date: String,
    pub content_type: String,
    pub file_size: i64,
}

impl From<&Document> for PdfSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.as_i64(),
            filename: doc.filename.clone(),
            file_path: doc.file_path.clone(),
            upload_date: doc.uploaded_at.to_rfc3339(),
            content_type: doc.content_type.clone(),
            file_size: doc.file_size,
        }
    }
}

/// Body of `GET /pdfs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PdfListView {
    pub pdfs: Vec<PdfSummary>,
}

/// Body of `GET /pdfs/:pdf_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PdfDetailView {
    #[serde(flatten)]
    pub summary: PdfSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

/// Body of `GET /pdfs/:pdf_id/content`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PdfContentView {
    pub pdf_id: i64,
    pub text_content: String,
}

/// Query parameters for `GET /pdfs/:pdf_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludeContentParams {
    #[serde(default)]
    pub include_content: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_omits_absent_content() {
        let view = PdfDetailView {
            summary: PdfSummary {
                id: 1,
                filename: "a.pdf".to_string(),
                file_path: "uploads/a.pdf".to_string(),
                upload_date: "2024-01-01T00:00:00Z".to_string(),
                content_type: "application/pdf".to_string(),
                file_size: 3,
            },
            text_content: None,
        };

        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], 1);
        assert!(json.get("text_content").is_none());
    }
}
