//! Credentials: signed bearer tokens and password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{AuthUser, Claims, TokenError, TokenService};
