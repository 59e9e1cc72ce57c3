//! Document upload and lookup endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{PdfContentView, PdfDetailView, PdfListView, PdfSummary, UploadView};
pub use routes::document_routes;
