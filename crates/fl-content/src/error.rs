/// Failure taxonomy for content CRUD.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// The requested entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Input failed structural validation.
    #[error("{0}")]
    Malformed(String),
    /// The store is unreachable or errored.
    #[error("store failure: {0}")]
    Store(String),
}
