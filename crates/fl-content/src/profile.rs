use super::*;
use fl_auth::Creator;

/// Read-side lookup of creators for public pages. Deliberately separate
/// from the auth repository: nothing here ever sees a password hash.
#[allow(async_fn_in_trait)]
pub trait ProfileRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Creator>, ContentError>;
}

/// Creator profile as shown on a public page. No email, no status, no
/// account internals.
#[derive(Debug, serde::Serialize)]
pub struct CreatorPublic {
    pub username: String,
    pub display_name: String,
    pub slug: String,
    pub instagram_handle: Option<String>,
    pub bio: Option<String>,
}

impl From<&Creator> for CreatorPublic {
    fn from(creator: &Creator) -> Self {
        Self {
            username: creator.username().to_string(),
            display_name: creator.display_name().to_string(),
            slug: creator.slug().to_string(),
            instagram_handle: creator.instagram_handle().map(String::from),
            bio: creator.bio().map(String::from),
        }
    }
}

/// Public profile by slug.
pub async fn profile<R>(repo: &R, slug: &str) -> Result<CreatorPublic, ContentError>
where
    R: ProfileRepository,
{
    repo.find_by_slug(slug)
        .await?
        .as_ref()
        .map(CreatorPublic::from)
        .ok_or(ContentError::NotFound("creator"))
}

#[cfg(feature = "database")]
mod postgres {
    use super::*;
    use fl_auth::Status;
    use fl_core::ID;
    use fl_pg::*;
    use std::sync::Arc;
    use std::time::SystemTime;
    use tokio_postgres::Client;

    impl ProfileRepository for Arc<Client> {
        async fn find_by_slug(&self, slug: &str) -> Result<Option<Creator>, ContentError> {
            self.query_opt(
                const_format::concatcp!(
                    "SELECT id, email, username, display_name, slug, instagram_handle,
                            bio, status, created_at, last_login_at FROM ",
                    CREATORS,
                    " WHERE slug = $1"
                ),
                &[&slug],
            )
            .await
            .map_err(|e| ContentError::Store(e.to_string()))?
            .map(|row| {
                let status = row.get::<_, String>(7);
                let status = Status::parse(&status)
                    .ok_or_else(|| ContentError::Store(format!("unknown creator status {}", status)))?;
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
            })
            .transpose()
        }
    }
}
