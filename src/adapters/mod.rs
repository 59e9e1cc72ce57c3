//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `ai` - Streaming chat completions (OpenAI-compatible, mock)
//! - `auth` - JWT session tokens
//! - `http` - axum REST and streaming endpoints
//! - `memory` - In-memory stores for tests and local runs
//! - `pdf` - PDF text extraction
//! - `sqlite` - sqlx persistence
//! - `storage` - Uploaded file storage on local disk

pub mod ai;
pub mod auth;
pub mod http;
pub mod memory;
pub mod pdf;
pub mod sqlite;
pub mod storage;
