//! Thread listing and history endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{MessagePageView, MessageView, PaginationParams, ThreadView, DEFAULT_LIMIT, MAX_LIMIT};
pub use routes::thread_routes;
