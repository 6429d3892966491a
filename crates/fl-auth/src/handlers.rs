use super::*;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

/// HTTP rendering of the error taxonomy. Store details never leave the
/// process; conflicts say which field, credential failures say nothing.
fn reply(err: AuthError) -> HttpResponse {
    match err {
        AuthError::Conflict(_) => HttpResponse::Conflict().body(err.to_string()),
        AuthError::Unauthorized => HttpResponse::Unauthorized().body(err.to_string()),
        AuthError::Malformed(_) => HttpResponse::BadRequest().body(err.to_string()),
        AuthError::Store(_) => {
            log::error!("{}", err);
            HttpResponse::InternalServerError().body("internal error")
        }
    }
}

pub async fn register(
    db: web::Data<Arc<Client>>,
    tokens: web::Data<Crypto>,
    req: web::Json<RegisterRequest>,
) -> impl Responder {
    match service::register(db.get_ref(), &tokens, req.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => reply(e),
    }
}

pub async fn login(
    db: web::Data<Arc<Client>>,
    tokens: web::Data<Crypto>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    match service::login(db.get_ref(), &tokens, req.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => reply(e),
    }
}

/// Profile of the authenticated creator. The token only asserts an id; the
/// account itself is loaded and checked here.
pub async fn me(db: web::Data<Arc<Client>>, auth: Auth) -> impl Responder {
    match db.get_ref().find_by_id(auth.creator()).await {
        Ok(Some(creator)) => HttpResponse::Ok().json(CreatorInfo::from(&creator)),
        Ok(None) => reply(AuthError::Unauthorized),
        Err(e) => reply(e),
    }
}
