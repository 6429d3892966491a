//! PostgreSQL connectivity and schema management.
//!
//! Thin wrapper around `tokio-postgres` for the FoodLink backend: a single
//! connection helper, table name constants, and a [`Schema`] trait that lets
//! each domain crate declare its own DDL next to its domain type.
//!
//! Uniqueness of the human-readable identifiers (email, username, slug,
//! instagram handle) is ultimately enforced HERE, by the unique constraints
//! each schema declares. Application-level pre-checks are an optimization;
//! the constraint is the authority.
mod schema;

pub use schema::*;

use std::sync::Arc;
use tokio_postgres::Client;

/// Establishes a database connection.
///
/// Connects to PostgreSQL using the `DB_URL` environment variable.
/// Returns an `Arc<Client>` suitable for sharing across async tasks.
///
/// # Panics
///
/// Panics if `DB_URL` is not set or if connection fails.
pub async fn db() -> Arc<Client> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let ref url = std::env::var("DB_URL").expect("DB_URL must be set");
    let (client, connection) = tokio_postgres::connect(url, tls)
        .await
        .expect("database connection failed");
    tokio::spawn(connection);
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await
        .expect("set client_min_messages");
    Arc::new(client)
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Table for registered creator accounts.
#[rustfmt::skip]
pub const CREATORS:        &str = "creators";
/// Table for deduplicated restaurants.
#[rustfmt::skip]
pub const RESTAURANTS:     &str = "restaurants";
/// Table for creator recommendations.
#[rustfmt::skip]
pub const RECOMMENDATIONS: &str = "recommendations";
/// Table for analytics events.
#[rustfmt::skip]
pub const EVENTS:          &str = "events";
