//! Identity allocation, credential verification, and stateless token auth.
//!
//! The registration-time identity core of the FoodLink backend: allocation of
//! globally-unique human-readable identifiers under concurrent writers, plus
//! signed expiring session tokens with no server-side session state.
//!
//! ## Components
//!
//! - [`allocator`] — derives unique identifiers from free text, resolving
//!   collisions by numeric suffixing
//! - [`password`] — Argon2 hashing and verification
//! - [`Crypto`] / [`Claims`] — HS512 token issuance and validation
//! - [`service`] — register / login / resolve_token orchestration
//! - [`CreatorRepository`] — narrow persistence interface for the above
//!
//! ## Guarantees
//!
//! Email, username, slug, and instagram handle are each globally unique.
//! Pre-checks give fast rejections in the common case; the store's unique
//! constraints are the authority, and a registration that loses the race at
//! insert surfaces [`AuthError::Conflict`] rather than a token for an
//! account that was never persisted.
pub mod allocator;
pub mod password;
pub mod service;

mod claims;
mod creator;
mod crypto;
mod dto;
mod error;
mod repository;

pub use claims::*;
pub use creator::*;
pub use crypto::*;
pub use dto::*;
pub use error::*;
pub use repository::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod middleware;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use middleware::*;
