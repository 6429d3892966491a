use fl_core::ID;
use fl_core::Unique;
use std::time::SystemTime;

/// Account lifecycle state. Login currently does NOT consult this; a
/// suspended or pending creator can still authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Active,
    Suspended,
    Pending,
}

impl Status {
    pub fn encode(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Pending => "PENDING",
        }
    }
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "SUSPENDED" => Some(Self::Suspended),
            "PENDING" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Registered creator account.
///
/// The password hash is a database-only column, never part of this type,
/// never logged, never serialized outward. `username` is derived from the
/// display name at creation and never edited afterwards; `slug` is chosen
/// by the creator at registration and equally immutable here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    id: ID<Self>,
    email: String,
    username: String,
    display_name: String,
    slug: String,
    instagram_handle: Option<String>,
    bio: Option<String>,
    status: Status,
    created_at: SystemTime,
    last_login_at: Option<SystemTime>,
}

impl Creator {
    /// A fresh registration: new id, ACTIVE, created now, never logged in.
    pub fn new(
        email: String,
        username: String,
        display_name: String,
        slug: String,
        instagram_handle: Option<String>,
        bio: Option<String>,
    ) -> Self {
        Self {
            id: ID::default(),
            email,
            username,
            display_name,
            slug,
            instagram_handle,
            bio,
            status: Status::Active,
            created_at: SystemTime::now(),
            last_login_at: None,
        }
    }
    /// Reconstructs a creator from its stored row.
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: ID<Self>,
        email: String,
        username: String,
        display_name: String,
        slug: String,
        instagram_handle: Option<String>,
        bio: Option<String>,
        status: Status,
        created_at: SystemTime,
        last_login_at: Option<SystemTime>,
    ) -> Self {
        Self {
            id,
            email,
            username,
            display_name,
            slug,
            instagram_handle,
            bio,
            status,
            created_at,
            last_login_at,
        }
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
    pub fn slug(&self) -> &str {
        &self.slug
    }
    pub fn instagram_handle(&self) -> Option<&str> {
        self.instagram_handle.as_deref()
    }
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
    pub fn last_login_at(&self) -> Option<SystemTime> {
        self.last_login_at
    }
    pub fn logged_in(&mut self, at: SystemTime) {
        self.last_login_at = Some(at);
    }
}

impl Unique for Creator {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use fl_pg::*;

    /// Schema for the creators table.
    ///
    /// The named UNIQUE constraints are the authority on identifier
    /// uniqueness; their names are matched back to a conflicted field when
    /// an insert loses a race. `hashword` is database-only, not part of
    /// the Creator domain type.
    impl Schema for Creator {
        fn name() -> &'static str {
            CREATORS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                CREATORS,
                " (
                    id               UUID PRIMARY KEY,
                    email            VARCHAR(255) NOT NULL,
                    hashword         TEXT NOT NULL,
                    username         VARCHAR(20) NOT NULL,
                    display_name     VARCHAR(100) NOT NULL,
                    slug             VARCHAR(100) NOT NULL,
                    instagram_handle VARCHAR(100),
                    bio              TEXT,
                    status           VARCHAR(20) NOT NULL DEFAULT 'ACTIVE',
                    created_at       TIMESTAMPTZ NOT NULL,
                    last_login_at    TIMESTAMPTZ,
                    CONSTRAINT creators_username_key         UNIQUE (username),
                    CONSTRAINT creators_slug_key             UNIQUE (slug),
                    CONSTRAINT creators_instagram_handle_key UNIQUE (instagram_handle)
                );"
            )
        }
        /// Email uniqueness lives in a unique expression index rather
        /// than a column constraint: lookups fold case, so storage must
        /// reject `A@x.com` next to `a@x.com` too. The index name feeds
        /// the same conflict mapping as the named constraints.
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE UNIQUE INDEX IF NOT EXISTS creators_email_key ON ",
                CREATORS,
                " (LOWER(email));"
            )
        }
    }
}
