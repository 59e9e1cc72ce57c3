//! PDF Chat - conversations grounded in uploaded PDF documents.
//!
//! Users upload PDFs, then hold threaded conversations about one document at
//! a time. Replies stream back from the model as they are generated, and
//! every thread's history is persisted.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
