//! `cargodesk-auth`: admin authentication.
//!
//! There is exactly one administrator, identified by a configured credential
//! pair. A successful login yields a signed, expiring session token that the
//! HTTP layer checks on every admin route. This crate knows nothing about HTTP
//! or storage.

pub mod claims;
pub mod credentials;
pub mod roles;
pub mod tokens;

pub use claims::{validate_claims, SessionClaims, TokenValidationError};
pub use credentials::AdminCredentials;
pub use roles::Role;
pub use tokens::{Hs256Tokens, IssuedToken, SessionTokens, TokenError};
