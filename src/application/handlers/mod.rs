//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

mod bootstrap_session;
mod document_queries;
mod submit_query;
mod thread_queries;
mod upload_document;

pub use bootstrap_session::{
    BootstrapSessionHandler, BootstrapSessionResult, SessionError, SessionStatus,
};
pub use document_queries::{DocumentQueryError, DocumentQueryHandler, DocumentView};
pub use submit_query::{QueryError, SubmitQueryCommand, SubmitQueryHandler, SubmitQueryResult};
pub use thread_queries::{ThreadQueryError, ThreadQueryHandler};
pub use upload_document::{
    UploadDocumentCommand, UploadDocumentHandler, UploadDocumentResult, UploadError, UploadLimits,
};
