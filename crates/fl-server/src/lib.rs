//! Unified FoodLink backend server.
//!
//! Wires the identity core and the content CRUD into a single actix-web
//! server: auth routes, public creator pages, recommendation management,
//! analytics tracking, and a health probe.

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

async fn health(client: web::Data<Arc<Client>>) -> impl Responder {
    match client
        .execute("SELECT 1", &[])
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

/// Applies every table schema. Idempotent; runs at each boot.
async fn prepare(client: &Client) -> Result<(), fl_pg::PgErr> {
    fl_pg::create::<fl_auth::Creator>(client).await?;
    fl_pg::create::<fl_content::Restaurant>(client).await?;
    fl_pg::create::<fl_content::Recommendation>(client).await?;
    fl_pg::create::<fl_content::AnalyticsEvent>(client).await?;
    Ok(())
}

#[rustfmt::skip]
pub async fn run() -> Result<(), std::io::Error> {
    let client = fl_pg::db().await;
    prepare(&client).await.expect("schema preparation failed");
    let crypto = web::Data::new(fl_auth::Crypto::from_env());
    let client = web::Data::new(client);
    log::info!("starting foodlink server");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(crypto.clone())
            .app_data(client.clone())
            .route("/health", web::get().to(health))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(fl_auth::register))
                    .route("/login", web::post().to(fl_auth::login))
                    .route("/me", web::get().to(fl_auth::me)),
            )
            .service(
                web::scope("/public")
                    .route("/creators/{slug}", web::get().to(fl_content::public_profile))
                    .route("/creators/{slug}/recommendations", web::get().to(fl_content::public_recommendations))
                    .route("/events", web::post().to(fl_content::track_event)),
            )
            .service(
                web::scope("/creator")
                    .route("/recommendations", web::get().to(fl_content::own_recommendations))
                    .route("/recommendations", web::post().to(fl_content::create_recommendation)),
            )
    })
    .workers(6)
    .bind(std::env::var("BIND_ADDR").expect("BIND_ADDR must be set"))?
    .run()
    .await
}
