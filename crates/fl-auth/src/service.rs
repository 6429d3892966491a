//! Registration, login, and token resolution.
//!
//! Plain functions generic over [`CreatorRepository`], so the orchestration
//! is testable without a database and usable behind any transport. The
//! resolved creator id is always passed explicitly to downstream callers;
//! there is no ambient "current user" anywhere in this crate.
//!
//! Registration pre-checks each unique identifier for a fast, friendly
//! rejection, but two concurrent registrations can both pass a pre-check
//! for the same value. The insert is the authority: losing that race
//! surfaces as a [`AuthError::Conflict`], never a token for an account
//! that was not persisted.

use super::*;
use fl_core::ID;
use fl_core::PASSWORD_MIN;
use fl_core::Unique;
use std::time::SystemTime;

pub async fn register<R>(
    repo: &R,
    crypto: &Crypto,
    req: RegisterRequest,
) -> Result<AuthResponse, AuthError>
where
    R: CreatorRepository,
{
    let email = req.email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::Malformed("email is not valid".to_string()));
    }
    if req.password.len() < PASSWORD_MIN {
        return Err(AuthError::Malformed(format!(
            "password must be at least {} characters",
            PASSWORD_MIN
        )));
    }
    let display_name = req.display_name.trim().to_string();
    if display_name.is_empty() {
        return Err(AuthError::Malformed("display name must not be empty".to_string()));
    }
    let slug = req.slug.trim().to_lowercase();
    if !allocator::legal(&slug, allocator::Charset::Slug) {
        return Err(AuthError::Malformed(
            "slug must be 3-100 lowercase letters, digits, or hyphens".to_string(),
        ));
    }
    let handle = normalize_handle(req.instagram_handle);

    if repo.exists_by_email(&email).await? {
        return Err(AuthError::Conflict(Field::Email));
    }
    if repo.exists_by_slug(&slug).await? {
        return Err(AuthError::Conflict(Field::Slug));
    }
    if let Some(ref handle) = handle {
        if repo.exists_by_handle(handle).await? {
            return Err(AuthError::Conflict(Field::InstagramHandle));
        }
    }

    let username = derive_username(repo, &display_name).await?;
    let hashword = password::hash(&req.password)?;
    let creator = Creator::new(email, username, display_name, slug, handle, req.bio);
    repo.create(&creator, &hashword).await?;
    log::info!("registered creator {} ({})", creator.username(), creator.id());
    respond(crypto, creator)
}

pub async fn login<R>(
    repo: &R,
    crypto: &Crypto,
    req: LoginRequest,
) -> Result<AuthResponse, AuthError>
where
    R: CreatorRepository,
{
    let (mut creator, hashword) = repo
        .find_by_email(req.email.trim())
        .await?
        .ok_or(AuthError::Unauthorized)?;
    if !password::verify(&req.password, &hashword) {
        return Err(AuthError::Unauthorized);
    }
    // suspended and pending creators can still sign in
    let now = SystemTime::now();
    repo.touch_login(creator.id(), now).await?;
    creator.logged_in(now);
    log::info!("creator {} signed in", creator.id());
    respond(crypto, creator)
}

/// Signature and expiry check only. Never touches the store, has no side
/// effects, and resolves the same token to the same id every time; callers
/// still load and check the account themselves.
pub fn resolve_token(crypto: &Crypto, token: &str) -> Result<ID<Creator>, AuthError> {
    let claims = crypto.decode(token).map_err(|_| AuthError::Unauthorized)?;
    match claims.expired() {
        true => Err(AuthError::Unauthorized),
        false => Ok(claims.creator()),
    }
}

/// Usernames self-resolve collisions by renumbering; this loop terminates
/// because the suffix space is unbounded and the store is finite.
async fn derive_username<R>(repo: &R, display_name: &str) -> Result<String, AuthError>
where
    R: CreatorRepository,
{
    for candidate in allocator::candidates(display_name, allocator::Charset::Username) {
        if !repo.exists_by_username(&candidate).await? {
            return Ok(candidate);
        }
    }
    unreachable!("candidate stream is infinite")
}

fn normalize_handle(handle: Option<String>) -> Option<String> {
    handle
        .map(|h| h.trim().to_string())
        .map(|h| h.strip_prefix('@').map(String::from).unwrap_or(h))
        .filter(|h| !h.is_empty())
}

fn respond(crypto: &Crypto, creator: Creator) -> Result<AuthResponse, AuthError> {
    let token = crypto
        .issue(creator.id())
        .map_err(|e| AuthError::Store(format!("token signing failed: {}", e)))?;
    Ok(AuthResponse {
        token,
        expires_in_ms: crypto.ttl().as_millis() as u64,
        creator: CreatorInfo::from(&creator),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory credential store enforcing the same uniqueness the
    /// database constraints do.
    #[derive(Default)]
    struct Memory {
        rows: Mutex<Vec<(Creator, String)>>,
    }

    impl CreatorRepository for Memory {
        async fn find_by_email(
            &self,
            email: &str,
        ) -> Result<Option<(Creator, String)>, AuthError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|(c, _)| c.email().eq_ignore_ascii_case(email))
                .cloned())
        }
        async fn find_by_id(&self, id: ID<Creator>) -> Result<Option<Creator>, AuthError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|(c, _)| c.id() == id)
                .map(|(c, _)| c.clone()))
        }
        async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .any(|(c, _)| c.email().eq_ignore_ascii_case(email)))
        }
        async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .any(|(c, _)| c.username() == username))
        }
        async fn exists_by_slug(&self, slug: &str) -> Result<bool, AuthError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .any(|(c, _)| c.slug() == slug))
        }
        async fn exists_by_handle(&self, handle: &str) -> Result<bool, AuthError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .any(|(c, _)| c.instagram_handle() == Some(handle)))
        }
        async fn create(&self, creator: &Creator, hashword: &str) -> Result<(), AuthError> {
            let mut rows = self.rows.lock().unwrap();
            for (c, _) in rows.iter() {
                if c.email().eq_ignore_ascii_case(creator.email()) {
                    return Err(AuthError::Conflict(Field::Email));
                }
                if c.username() == creator.username() {
                    return Err(AuthError::Conflict(Field::Username));
                }
                if c.slug() == creator.slug() {
                    return Err(AuthError::Conflict(Field::Slug));
                }
                if c.instagram_handle().is_some()
                    && c.instagram_handle() == creator.instagram_handle()
                {
                    return Err(AuthError::Conflict(Field::InstagramHandle));
                }
            }
            rows.push((creator.clone(), hashword.to_string()));
            Ok(())
        }
        async fn touch_login(&self, id: ID<Creator>, at: SystemTime) -> Result<(), AuthError> {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|(c, _)| c.id() == id) {
                Some((c, _)) => {
                    c.logged_in(at);
                    Ok(())
                }
                None => Err(AuthError::Store("no such creator".to_string())),
            }
        }
    }

    fn crypto() -> Crypto {
        Crypto::new(
            b"0123456789abcdef0123456789abcdef",
            std::time::Duration::from_millis(60_000),
        )
    }

    fn request(email: &str, name: &str, slug: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "pw123456".to_string(),
            display_name: name.to_string(),
            slug: slug.to_string(),
            instagram_handle: None,
            bio: None,
        }
    }

    #[tokio::test]
    async fn identical_display_names_renumber_usernames() {
        let repo = Memory::default();
        let a = register(&repo, &crypto(), request("a@x.com", "Chef Raj", "chef-raj"))
            .await
            .unwrap();
        let b = register(&repo, &crypto(), request("b@x.com", "Chef Raj", "chef-raj-2"))
            .await
            .unwrap();
        assert!(a.creator.username == "chefraj");
        assert!(b.creator.username == "chefraj1");
        assert!(a.creator.id != b.creator.id);
    }

    #[tokio::test]
    async fn duplicate_slug_rejects_and_persists_nothing() {
        let repo = Memory::default();
        register(&repo, &crypto(), request("a@x.com", "Chef Raj", "chef-raj"))
            .await
            .unwrap();
        let err = register(&repo, &crypto(), request("b@x.com", "Other Chef", "chef-raj"))
            .await
            .unwrap_err();
        assert!(err == AuthError::Conflict(Field::Slug));
        assert!(repo.rows.lock().unwrap().len() == 1);
    }

    #[tokio::test]
    async fn duplicate_email_rejects_case_insensitively() {
        let repo = Memory::default();
        register(&repo, &crypto(), request("a@x.com", "Chef Raj", "chef-raj"))
            .await
            .unwrap();
        let err = register(&repo, &crypto(), request("A@X.com", "Other Chef", "other-chef"))
            .await
            .unwrap_err();
        assert!(err == AuthError::Conflict(Field::Email));
    }

    /// The storage authority, not just the pre-check, must fold case:
    /// two racing registrations differing only in email case may both
    /// pass `exists_by_email`, and the insert settles it.
    #[tokio::test]
    async fn insert_rejects_mixed_case_duplicate_email() {
        let repo = Memory::default();
        register(&repo, &crypto(), request("a@x.com", "Chef Raj", "chef-raj"))
            .await
            .unwrap();
        let twin = Creator::new(
            "A@X.com".to_string(),
            "otherchef".to_string(),
            "Other Chef".to_string(),
            "other-chef".to_string(),
            None,
            None,
        );
        let err = repo.create(&twin, "hashword").await.unwrap_err();
        assert!(err == AuthError::Conflict(Field::Email));
        assert!(repo.rows.lock().unwrap().len() == 1);
    }

    #[tokio::test]
    async fn duplicate_instagram_handle_rejects_after_normalization() {
        let repo = Memory::default();
        let mut first = request("a@x.com", "Chef Raj", "chef-raj");
        first.instagram_handle = Some("@chefraj".to_string());
        register(&repo, &crypto(), first).await.unwrap();
        let mut second = request("b@x.com", "Other Chef", "other-chef");
        second.instagram_handle = Some("chefraj".to_string());
        let err = register(&repo, &crypto(), second).await.unwrap_err();
        assert!(err == AuthError::Conflict(Field::InstagramHandle));
    }

    #[tokio::test]
    async fn illegal_slug_is_malformed_before_any_store_interaction() {
        let repo = Memory::default();
        let err = register(&repo, &crypto(), request("a@x.com", "Chef Raj", "chef raj!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_round_trips_through_token_resolution() {
        let repo = Memory::default();
        let crypto = crypto();
        let registered = register(&repo, &crypto, request("a@x.com", "Chef Raj", "chef-raj"))
            .await
            .unwrap();
        let session = login(
            &repo,
            &crypto,
            LoginRequest {
                email: "a@x.com".to_string(),
                password: "pw123456".to_string(),
            },
        )
        .await
        .unwrap();
        let resolved = resolve_token(&crypto, &session.token).unwrap();
        assert!(resolved.to_string() == registered.creator.id);
        // resolution is idempotent and side-effect free
        assert!(resolve_token(&crypto, &session.token).unwrap() == resolved);
        assert!(repo.rows.lock().unwrap().len() == 1);
    }

    #[tokio::test]
    async fn login_records_last_login() {
        let repo = Memory::default();
        let crypto = crypto();
        register(&repo, &crypto, request("a@x.com", "Chef Raj", "chef-raj"))
            .await
            .unwrap();
        login(
            &repo,
            &crypto,
            LoginRequest {
                email: "a@x.com".to_string(),
                password: "pw123456".to_string(),
            },
        )
        .await
        .unwrap();
        let rows = repo.rows.lock().unwrap();
        assert!(rows[0].0.last_login_at().is_some());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_identically() {
        let repo = Memory::default();
        let crypto = crypto();
        register(&repo, &crypto, request("a@x.com", "Chef Raj", "chef-raj"))
            .await
            .unwrap();
        let mismatch = login(
            &repo,
            &crypto,
            LoginRequest {
                email: "a@x.com".to_string(),
                password: "wrong-password".to_string(),
            },
        )
        .await
        .unwrap_err();
        let unknown = login(
            &repo,
            &crypto,
            LoginRequest {
                email: "nobody@x.com".to_string(),
                password: "pw123456".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(mismatch == unknown);
        assert!(mismatch.to_string() == unknown.to_string());
    }

    /// A store whose pre-checks all pass but whose insert loses the race:
    /// the constraint rejection must surface as Conflict, with no token.
    struct Racy;

    impl CreatorRepository for Racy {
        async fn find_by_email(&self, _: &str) -> Result<Option<(Creator, String)>, AuthError> {
            Ok(None)
        }
        async fn find_by_id(&self, _: ID<Creator>) -> Result<Option<Creator>, AuthError> {
            Ok(None)
        }
        async fn exists_by_email(&self, _: &str) -> Result<bool, AuthError> {
            Ok(false)
        }
        async fn exists_by_username(&self, _: &str) -> Result<bool, AuthError> {
            Ok(false)
        }
        async fn exists_by_slug(&self, _: &str) -> Result<bool, AuthError> {
            Ok(false)
        }
        async fn exists_by_handle(&self, _: &str) -> Result<bool, AuthError> {
            Ok(false)
        }
        async fn create(&self, _: &Creator, _: &str) -> Result<(), AuthError> {
            Err(AuthError::Conflict(Field::Slug))
        }
        async fn touch_login(&self, _: ID<Creator>, _: SystemTime) -> Result<(), AuthError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn race_lost_at_insert_surfaces_conflict() {
        let err = register(&Racy, &crypto(), request("a@x.com", "Chef Raj", "chef-raj"))
            .await
            .unwrap_err();
        assert!(err == AuthError::Conflict(Field::Slug));
    }

    #[tokio::test]
    async fn expired_tokens_resolve_unauthorized() {
        let crypto = crypto();
        let now = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let stale = Claims {
            sub: uuid::Uuid::now_v7(),
            iat: now - 120,
            exp: now - 60,
        };
        let token = crypto.encode(&stale).unwrap();
        assert!(resolve_token(&crypto, &token) == Err(AuthError::Unauthorized));
    }
}
