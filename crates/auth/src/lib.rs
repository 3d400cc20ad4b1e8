//! `quotedesk-auth`: authentication boundary.
//!
//! User accounts, password hashing and bearer tokens. Decoupled from HTTP and
//! storage: the API layer extracts tokens, the infra layer persists accounts.

pub mod claims;
pub mod error;
pub mod password;
pub mod principal;
pub mod token;
pub mod user;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use principal::Principal;
pub use token::{Hs256JwtValidator, IssuedToken, JwtValidator};
pub use user::{NewUser, UserAccount};
