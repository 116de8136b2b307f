// src/main.rs
use actix_files::Files;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

mod catalog;
mod config;
mod errors;
mod handlers;
mod models;
mod services;

use crate::config::AppConfig;
use crate::handlers::{
    apply_preset, clear_image, create_session, delete_session, download_image,
    download_metadata, generate, get_catalog, get_session, preview_prompt, update_config,
    upload_image,
};
use crate::services::{GeminiService, ImageEditor, ImageProcessor, SessionStore};

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<SessionStore>,
    editor: Arc<dyn ImageEditor>,
    image_processor: Arc<ImageProcessor>,
    max_upload_bytes: usize,
}

const EVICTION_INTERVAL: Duration = Duration::from_secs(300);

pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/catalog", web::get().to(get_catalog))
            .route("/sessions", web::post().to(create_session))
            .route("/sessions/{id}", web::get().to(get_session))
            .route("/sessions/{id}", web::delete().to(delete_session))
            .route("/sessions/{id}/config", web::patch().to(update_config))
            .route("/sessions/{id}/images/{slot}", web::put().to(upload_image))
            .route("/sessions/{id}/images/{slot}", web::delete().to(clear_image))
            .route("/sessions/{id}/presets/{name}", web::post().to(apply_preset))
            .route("/sessions/{id}/prompt", web::get().to(preview_prompt))
            .route("/sessions/{id}/generate", web::post().to(generate))
            .route("/sessions/{id}/result/image", web::get().to(download_image))
            .route(
                "/sessions/{id}/result/metadata",
                web::get().to(download_metadata),
            ),
    )
    .route("/health", web::get().to(health_check));
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting interior studio service...");

    let config = AppConfig::from_env()?;
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; generation requests will fail until it is configured");
    }

    // Initialize services
    let editor: Arc<dyn ImageEditor> = Arc::new(GeminiService::new(
        config.gemini_api_key.clone(),
        config.gemini_image_model.clone(),
        config.gemini_base_url.clone(),
    ));
    let sessions = Arc::new(SessionStore::with_idle_ttl(chrono::Duration::seconds(
        config.session_idle_ttl_secs,
    )));
    let app_state = AppState {
        sessions: sessions.clone(),
        editor,
        image_processor: Arc::new(ImageProcessor::new(config.max_image_dimension)),
        max_upload_bytes: config.max_upload_bytes,
    };

    // Sweep idle sessions even when nobody is creating new ones
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            ticker.tick().await;
            sessions.evict_idle().await;
        }
    });

    info!(
        "Starting HTTP server on {} (model={}, static={})",
        config.bind_addr, config.gemini_image_model, config.static_dir
    );

    let static_dir = config.static_dir.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(api_routes)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "interior-studio",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
