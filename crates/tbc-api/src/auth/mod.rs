//! Authentication: HS256 access tokens, argon2 password hashes and the
//! bearer-token middleware that resolves the current user.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::JwtService;
pub use middleware::{auth_middleware, AuthState};
pub use models::{CurrentUser, JwtClaims};
