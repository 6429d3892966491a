use super::*;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use fl_auth::Auth;
use fl_core::Unique;
use std::sync::Arc;
use tokio_postgres::Client;

fn reply(err: ContentError) -> HttpResponse {
    match err {
        ContentError::NotFound(_) => HttpResponse::NotFound().body(err.to_string()),
        ContentError::Malformed(_) => HttpResponse::BadRequest().body(err.to_string()),
        ContentError::Store(_) => {
            log::error!("{}", err);
            HttpResponse::InternalServerError().body("internal error")
        }
    }
}

pub async fn public_profile(
    db: web::Data<Arc<Client>>,
    slug: web::Path<String>,
) -> impl Responder {
    match profile(db.get_ref(), &slug).await {
        Ok(found) => HttpResponse::Ok().json(found),
        Err(e) => reply(e),
    }
}

pub async fn public_recommendations(
    db: web::Data<Arc<Client>>,
    slug: web::Path<String>,
) -> impl Responder {
    let creator = match db.get_ref().find_by_slug(&slug).await {
        Ok(Some(creator)) => creator,
        Ok(None) => return reply(ContentError::NotFound("creator")),
        Err(e) => return reply(e),
    };
    match listing(db.get_ref(), creator.id()).await {
        Ok(infos) => HttpResponse::Ok().json(infos),
        Err(e) => reply(e),
    }
}

/// Creation requires authentication; the creator id comes from the token,
/// resolved once by the extractor and passed explicitly.
pub async fn create_recommendation(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    req: web::Json<CreateRecommendationRequest>,
) -> impl Responder {
    match recommend(db.get_ref(), auth.creator(), req.into_inner()).await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(e) => reply(e),
    }
}

/// The authenticated creator's own recommendations, newest first.
pub async fn own_recommendations(db: web::Data<Arc<Client>>, auth: Auth) -> impl Responder {
    match listing(db.get_ref(), auth.creator()).await {
        Ok(infos) => HttpResponse::Ok().json(infos),
        Err(e) => reply(e),
    }
}

/// Fire-and-forget tracking; the response never reflects storage failures.
pub async fn track_event(
    db: web::Data<Arc<Client>>,
    http: HttpRequest,
    req: web::Json<TrackEventRequest>,
) -> impl Responder {
    let header = |name: &str| {
        http.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(String::from)
    };
    let ctx = RequestContext {
        user_agent: header("User-Agent"),
        ip: http
            .connection_info()
            .realip_remote_addr()
            .map(String::from),
        referrer: header("Referer"),
    };
    track(db.get_ref(), req.into_inner(), ctx).await;
    HttpResponse::Accepted().json(serde_json::json!({"status": "accepted"}))
}
