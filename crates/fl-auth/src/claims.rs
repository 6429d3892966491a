use super::*;
use fl_core::ID;

/// Self-contained session claims: who was authenticated and until when.
/// Validation is signature + expiry only; nothing here touches the store.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// TTL is configured in milliseconds but `exp` has one-second
    /// resolution, so the lifetime rounds up: a sub-second TTL still
    /// issues a token that is live for a moment, never one born expired.
    pub fn new(creator: ID<Creator>, ttl: std::time::Duration) -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_secs() as i64;
        Self {
            sub: creator.inner(),
            iat: now,
            exp: now + ttl.as_millis().div_ceil(1000) as i64,
        }
    }
    pub fn expired(&self) -> bool {
        self.exp
            < std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time")
                .as_secs() as i64
    }
    pub fn creator(&self) -> ID<Creator> {
        ID::from(self.sub)
    }
}
