//! Creator pages, restaurant deduplication, recommendations, and analytics.
//!
//! Everything here is conventional CRUD around the identity core: public
//! creator profiles looked up by slug, restaurants deduplicated behind a
//! find-or-create (reusing the slug allocator from `fl-auth`),
//! recommendation listings, and best-effort analytics event recording.
//!
//! Unlike the identity core, analytics recording is log-and-continue:
//! tracking must never break the page that emitted it.
mod error;
mod event;
mod profile;
mod recommendation;
mod restaurant;

pub use error::*;
pub use event::*;
pub use profile::*;
pub use recommendation::*;
pub use restaurant::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
pub use handlers::*;
