use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::SessionCoordinator;
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::{ApiMetrics, HitCounter};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, reset, revoke, update_user,
};
use crate::store::Store;

/// Directory served under `/app`.
const STATIC_DIR: &str = "./app";

/// Build the HTTP server on an already bound listener.
///
/// All shared state (storage, session coordinator, hit counter, settings) is
/// created here once and handed to every worker through `web::Data`.
pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(SessionCoordinator::new(store.clone(), settings.auth.clone()));
    let store: web::Data<dyn Store> = web::Data::from(store);
    let metrics_data = web::Data::new(ApiMetrics::new());
    let settings = web::Data::new(settings);

    let server = HttpServer::new(move || {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
        });

        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(json_config)
            .app_data(store.clone())
            .app_data(sessions.clone())
            .app_data(metrics_data.clone())
            .app_data(settings.clone())

            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(create_user))
                    .route("/users", web::put().to(update_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/chirps", web::post().to(create_chirp))
                    .route("/chirps", web::get().to(list_chirps))
                    .route("/chirps/{chirp_id}", web::get().to(get_chirp))
                    .route("/chirps/{chirp_id}", web::delete().to(delete_chirp))
                    .route("/polka/webhooks", web::post().to(polka_webhook)),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )
            // Every request under /app counts as a file server hit
            .service(
                web::scope("/app")
                    .wrap(HitCounter::new(metrics_data.clone()))
                    .service(fs::Files::new("", STATIC_DIR).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
