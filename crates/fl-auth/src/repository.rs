use super::*;
use fl_core::ID;
use std::time::SystemTime;

/// Narrow persistence interface for the identity core.
///
/// Exactly the operations register/login need, no framework contract.
/// Point reads, existence pre-checks, one conditional insert, one
/// timestamp touch. Store failures arrive as [`AuthError::Store`]; a
/// unique-constraint rejection at insert arrives as
/// [`AuthError::Conflict`] naming the violated field.
#[allow(async_fn_in_trait)]
pub trait CreatorRepository {
    /// Case-insensitive email lookup, returning the stored password hash
    /// alongside the account.
    async fn find_by_email(&self, email: &str) -> Result<Option<(Creator, String)>, AuthError>;
    async fn find_by_id(&self, id: ID<Creator>) -> Result<Option<Creator>, AuthError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError>;
    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError>;
    async fn exists_by_slug(&self, slug: &str) -> Result<bool, AuthError>;
    async fn exists_by_handle(&self, handle: &str) -> Result<bool, AuthError>;
    /// The only mutation visible to concurrent registrations. The table's
    /// unique constraints are the authority here; pre-checks are advisory.
    async fn create(&self, creator: &Creator, hashword: &str) -> Result<(), AuthError>;
    async fn touch_login(&self, id: ID<Creator>, at: SystemTime) -> Result<(), AuthError>;
}

#[cfg(feature = "database")]
mod postgres {
    use super::*;
    use fl_core::Unique;
    use fl_pg::*;
    use std::sync::Arc;
    use tokio_postgres::Client;
    use tokio_postgres::Row;

    const COLUMNS: &str =
        "id, email, username, display_name, slug, instagram_handle, bio, status, created_at, last_login_at";

    fn hydrate(row: &Row) -> Result<Creator, AuthError> {
        let status = row.get::<_, String>(7);
        let status = Status::parse(&status)
            .ok_or_else(|| AuthError::Store(format!("unknown creator status {}", status)))?;
        Ok(Creator::hydrate(
            ID::from(row.get::<_, uuid::Uuid>(0)),
            row.get::<_, String>(1),
            row.get::<_, String>(2),
            row.get::<_, String>(3),
            row.get::<_, String>(4),
            row.get::<_, Option<String>>(5),
            row.get::<_, Option<String>>(6),
            status,
            row.get::<_, SystemTime>(8),
            row.get::<_, Option<SystemTime>>(9),
        ))
    }

    fn store(e: PgErr) -> AuthError {
        AuthError::Store(e.to_string())
    }

    /// Maps a rejected insert back into the taxonomy: a unique violation
    /// on one of the four named identity constraints is a Conflict on that
    /// field; anything else is a store failure.
    fn rejected(e: PgErr) -> AuthError {
        match e.code() {
            Some(code) if *code == tokio_postgres::error::SqlState::UNIQUE_VIOLATION => {
                match e.as_db_error().and_then(|db| db.constraint()) {
                    Some(c) if c.contains("email") => AuthError::Conflict(Field::Email),
                    Some(c) if c.contains("username") => AuthError::Conflict(Field::Username),
                    Some(c) if c.contains("slug") => AuthError::Conflict(Field::Slug),
                    Some(c) if c.contains("instagram") => {
                        AuthError::Conflict(Field::InstagramHandle)
                    }
                    _ => store(e),
                }
            }
            _ => store(e),
        }
    }

    impl CreatorRepository for Arc<Client> {
        async fn find_by_email(
            &self,
            email: &str,
        ) -> Result<Option<(Creator, String)>, AuthError> {
            self.query_opt(
                const_format::concatcp!(
                    "SELECT ",
                    COLUMNS,
                    ", hashword FROM ",
                    CREATORS,
                    " WHERE LOWER(email) = LOWER($1)"
                ),
                &[&email],
            )
            .await
            .map_err(store)?
            .map(|row| Ok((hydrate(&row)?, row.get::<_, String>(10))))
            .transpose()
        }

        async fn find_by_id(&self, id: ID<Creator>) -> Result<Option<Creator>, AuthError> {
            self.query_opt(
                const_format::concatcp!(
                    "SELECT ",
                    COLUMNS,
                    " FROM ",
                    CREATORS,
                    " WHERE id = $1"
                ),
                &[&id.inner()],
            )
            .await
            .map_err(store)?
            .map(|row| hydrate(&row))
            .transpose()
        }

        async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
            self.query_opt(
                const_format::concatcp!(
                    "SELECT 1 FROM ",
                    CREATORS,
                    " WHERE LOWER(email) = LOWER($1)"
                ),
                &[&email],
            )
            .await
            .map(|opt| opt.is_some())
            .map_err(store)
        }

        async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
            self.query_opt(
                const_format::concatcp!("SELECT 1 FROM ", CREATORS, " WHERE username = $1"),
                &[&username],
            )
            .await
            .map(|opt| opt.is_some())
            .map_err(store)
        }

        async fn exists_by_slug(&self, slug: &str) -> Result<bool, AuthError> {
            self.query_opt(
                const_format::concatcp!("SELECT 1 FROM ", CREATORS, " WHERE slug = $1"),
                &[&slug],
            )
            .await
            .map(|opt| opt.is_some())
            .map_err(store)
        }

        async fn exists_by_handle(&self, handle: &str) -> Result<bool, AuthError> {
            self.query_opt(
                const_format::concatcp!(
                    "SELECT 1 FROM ",
                    CREATORS,
                    " WHERE instagram_handle = $1"
                ),
                &[&handle],
            )
            .await
            .map(|opt| opt.is_some())
            .map_err(store)
        }

        async fn create(&self, creator: &Creator, hashword: &str) -> Result<(), AuthError> {
            self.execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    CREATORS,
                    " (id, email, hashword, username, display_name, slug,
                       instagram_handle, bio, status, created_at, last_login_at)
                      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
                ),
                &[
                    &creator.id().inner(),
                    &creator.email(),
                    &hashword,
                    &creator.username(),
                    &creator.display_name(),
                    &creator.slug(),
                    &creator.instagram_handle(),
                    &creator.bio(),
                    &creator.status().encode(),
                    &creator.created_at(),
                    &creator.last_login_at(),
                ],
            )
            .await
            .map(|_| ())
            .map_err(rejected)
        }

        async fn touch_login(&self, id: ID<Creator>, at: SystemTime) -> Result<(), AuthError> {
            self.execute(
                const_format::concatcp!(
                    "UPDATE ",
                    CREATORS,
                    " SET last_login_at = $2 WHERE id = $1"
                ),
                &[&id.inner(), &at],
            )
            .await
            .map(|_| ())
            .map_err(store)
        }
    }
}
