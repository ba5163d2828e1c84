//! Authentication and authorization module
//!
//! This module provides JWT-based sessions with the following components:
//! - Access / refresh token issuance and validation
//! - Password hashing with Argon2id
//! - Session service with refresh-token rotation
//! - The route-visibility authorization gate
//! - Refresh-token cookie helpers

pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use cookie::{extract_cookie, RefreshCookie, REFRESH_COOKIE};
pub use jwt::{AccessClaims, IssuedTokens, JwtError, RefreshClaims, TokenIssuer};
pub use middleware::{authorize, resolve_visibility, AuthError, Identity, Visibility};
pub use password::{PasswordConfig, PasswordError};
pub use service::{hash_token, SessionError, SessionService};
