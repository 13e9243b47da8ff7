//! # socialhub-auth
//!
//! Token verification for SocialHub. Tokens are issued by the REST layer
//! at login; this crate only decodes and validates them so a WebSocket
//! upgrade can be bound to an authenticated user.
//!
//! ## Modules
//!
//! - `jwt`: claims, HS256 decoding, and an encoder used by tooling and tests

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
