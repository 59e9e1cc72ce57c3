//! Streaming conversation endpoint.

mod dto;
mod handlers;
mod routes;

pub use dto::{QueryMessage, QueryRequest};
pub use handlers::{THREAD_CREATED_HEADER, THREAD_ID_HEADER};
pub use routes::conversation_routes;
