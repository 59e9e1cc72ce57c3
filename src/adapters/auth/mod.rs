//! Authentication adapters.
//!
//! - `jwt` - HS256 session tokens for the `auth_token` cookie

mod jwt;

pub use jwt::JwtSessionTokens;
