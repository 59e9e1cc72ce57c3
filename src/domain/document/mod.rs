//! Document domain module.
//!
//! An uploaded PDF: its metadata record and the rules for accepting an
//! upload. Extracted text is stored separately and looked up by the same id.

use serde::Serialize;

use crate::domain::foundation::{DocumentId, Timestamp, UserId};

/// The only content type accepted for upload.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Metadata for an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: DocumentId,
    pub owner: UserId,
    pub filename: String,
    /// Where the original bytes were written.
    pub file_path: String,
    pub content_type: String,
    pub file_size: i64,
    /// Hex-encoded SHA-256 of the file contents.
    pub checksum: String,
    pub uploaded_at: Timestamp,
}

impl Document {
    /// Returns true if `user` uploaded this document.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }
}

/// A document that has been stored but not yet assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub owner: UserId,
    pub filename: String,
    pub file_path: String,
    pub content_type: String,
    pub file_size: i64,
    pub checksum: String,
    pub uploaded_at: Timestamp,
}

impl NewDocument {
    /// Attaches the store-assigned id.
    pub fn with_id(self, id: DocumentId) -> Document {
        Document {
            id,
            owner: self.owner,
            filename: self.filename,
            file_path: self.file_path,
            content_type: self.content_type,
            file_size: self.file_size,
            checksum: self.checksum,
            uploaded_at: self.uploaded_at,
        }
    }
}

/// Returns true for `application/pdf`, ignoring parameters and case.
pub fn is_pdf_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false)
}

/// First `max_chars` characters of `text`, with `...` appended if cut.
pub fn text_preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Reduces a client-supplied filename to a safe final path component.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(owner: &str) -> Document {
        NewDocument {
            owner: UserId::new(owner).unwrap(),
            filename: "a.pdf".to_string(),
            file_path: "uploads/a.pdf".to_string(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            file_size: 10,
            checksum: "00".to_string(),
            uploaded_at: Timestamp::now(),
        }
        .with_id(DocumentId::new(1))
    }

    #[test]
    fn ownership_is_checked_by_user_id() {
        let doc = document("alice");
        assert!(doc.is_owned_by(&UserId::new("alice").unwrap()));
        assert!(!doc.is_owned_by(&UserId::new("bob").unwrap()));
    }

    #[test]
    fn pdf_content_type_detection() {
        assert!(is_pdf_content_type("application/pdf"));
        assert!(is_pdf_content_type("Application/PDF; charset=binary"));
        assert!(!is_pdf_content_type("text/plain"));
        assert!(!is_pdf_content_type(""));
    }

    #[test]
    fn preview_of_short_text_is_unchanged() {
        assert_eq!(text_preview("short", 500), "short");
    }

    #[test]
    fn preview_of_long_text_is_cut_with_ellipsis() {
        let text = "x".repeat(501);
        let preview = text_preview(&text, 500);
        assert_eq!(preview.len(), 503);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        assert_eq!(text_preview("ééé", 2), "éé...");
    }

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\my file.pdf"), "my_file.pdf");
        assert_eq!(sanitize_filename("..."), "upload.pdf");
    }
}
