//! Session bootstrap and health endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{HealthView, SessionView};
pub use routes::{health_routes, session_routes};
