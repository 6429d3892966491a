/// Unique column a registration collided on.
///
/// Surfaced to callers so they can say which field conflicted, without
/// leaking anything about the store itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Username,
    Slug,
    InstagramHandle,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Username => write!(f, "username"),
            Self::Slug => write!(f, "slug"),
            Self::InstagramHandle => write!(f, "instagram handle"),
        }
    }
}

/// Failure taxonomy for the identity core.
///
/// Every failure here is security- or correctness-relevant and is returned
/// to the caller as a value; nothing in this crate logs-and-continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// A unique identifier is already taken.
    #[error("{0} already taken")]
    Conflict(Field),
    /// Wrong credentials or a bad token. Account-not-found and password
    /// mismatch share this one value so callers cannot enumerate accounts.
    #[error("invalid credentials")]
    Unauthorized,
    /// Input failed structural validation before any store interaction.
    #[error("{0}")]
    Malformed(String),
    /// The credential store is unreachable or errored. Not retried; no
    /// partial mutation has occurred when this is returned.
    #[error("store failure: {0}")]
    Store(String),
}
