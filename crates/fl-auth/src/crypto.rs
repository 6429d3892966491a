use super::*;
use fl_core::ID;

/// HS512 token signing and verification.
///
/// Holds the process-wide symmetric key pair and the configured token
/// time-to-live. Loaded once at startup; key rotation requires a restart.
pub struct Crypto {
    encoding: jsonwebtoken::EncodingKey,
    decoding: jsonwebtoken::DecodingKey,
    ttl: std::time::Duration,
}

impl Crypto {
    pub fn new(secret: &[u8], ttl: std::time::Duration) -> Self {
        if secret.len() < 32 {
            log::warn!("signing secret is under 32 bytes; tokens are weakly keyed");
        }
        Self {
            encoding: jsonwebtoken::EncodingKey::from_secret(secret),
            decoding: jsonwebtoken::DecodingKey::from_secret(secret),
            ttl,
        }
    }
    /// Reads `JWT_SECRET` and `JWT_TTL_MS` (milliseconds, default 24h).
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| String::default());
        let ttl = std::env::var("JWT_TTL_MS")
            .ok()
            .and_then(|ms| ms.parse().ok())
            .unwrap_or(fl_core::DEFAULT_TTL_MS);
        Self::new(secret.as_bytes(), std::time::Duration::from_millis(ttl))
    }
    /// Issues a token for an authenticated creator, expiring after the
    /// configured TTL.
    pub fn issue(&self, creator: ID<Creator>) -> Result<String, jsonwebtoken::errors::Error> {
        self.encode(&Claims::new(creator, self.ttl))
    }
    pub fn encode(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS512),
            claims,
            &self.encoding,
        )
    }
    /// Zero leeway: a token is rejected the moment `exp` passes.
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS512);
        validation.leeway = 0;
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
    pub fn ttl(&self) -> std::time::Duration {
        self.ttl
    }
}
