//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, auth)
//! - `conversation` - Turn assembly, message types, and the history window
//! - `document` - Uploaded PDFs and upload rules
//! - `thread` - Conversation threads and their ownership rules
//! - `user` - Anonymous users

pub mod conversation;
pub mod document;
pub mod foundation;
pub mod thread;
pub mod user;
