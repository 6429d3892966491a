use super::*;
use actix_web::FromRequest;
use actix_web::HttpRequest;
use actix_web::dev::Payload;
use actix_web::web;
use fl_core::ID;
use std::future::Future;
use std::pin::Pin;

/// Extractor for authenticated requests.
///
/// Resolves `Authorization: Bearer <token>` to a creator id once per
/// request — signature and expiry only, no store round-trip — and hands
/// that id to handlers explicitly. There is no ambient current-user state.
pub struct Auth(ID<Creator>);

impl Auth {
    pub fn creator(&self) -> ID<Creator> {
        self.0
    }
}

impl FromRequest for Auth {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let tokens = req.app_data::<web::Data<Crypto>>().cloned();
        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_owned());
        Box::pin(async move {
            let header = header.ok_or_else(|| {
                actix_web::error::ErrorUnauthorized("missing authorization header")
            })?;
            let token = header.strip_prefix("Bearer ").ok_or_else(|| {
                actix_web::error::ErrorUnauthorized("invalid authorization format")
            })?;
            let tokens = tokens.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("token service not configured")
            })?;
            let creator = service::resolve_token(&tokens, token)
                .map_err(|_| actix_web::error::ErrorUnauthorized("invalid token"))?;
            Ok(Auth(creator))
        })
    }
}
