use actix_web::{web, App, HttpResponse, HttpServer};
use serde::Serialize;
use std::sync::Arc;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{BatchRequest, SubjectResult};
use crate::pipeline::Pipeline;

#[derive(Serialize, Debug)]
struct RunResponse {
    results: Vec<SubjectResult>,
}

async fn get_random_photo(
    pipeline: web::Data<Pipeline>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let requests = BatchRequest::from_json(&body).map_err(|e| {
        log::debug!("Rejected trigger body: {}", e);
        e
    })?;
    log::info!("HTTP trigger accepted {} subject(s)", requests.len());

    let results = pipeline.run(&requests).await?;
    Ok(HttpResponse::Ok().json(RunResponse { results }))
}

async fn get_manifest(pipeline: web::Data<Pipeline>) -> Result<HttpResponse, AppError> {
    let manifest = pipeline.last_manifest().await?;
    Ok(HttpResponse::Ok().json(manifest))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/getRandomPhoto").route(web::post().to(get_random_photo)))
        .service(web::resource("/api/manifest").route(web::get().to(get_manifest)))
        .service(web::resource("/api/health").route(web::get().to(health)));
}

/// Publishes the images container under `/blobs/{container}`. Other containers and
/// dot-prefixed staging files are never served.
fn blob_files(root_directory: &str, images_container: &str) -> actix_files::Files {
    let directory = std::path::Path::new(root_directory).join(images_container);
    actix_files::Files::new(&format!("/blobs/{}", images_container), directory).path_filter(
        |path, _| {
            !path
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        },
    )
}

pub async fn start_web_server(
    config: Arc<AppConfig>,
    pipeline: Arc<Pipeline>,
) -> std::io::Result<()> {
    let port = config.web_port;
    let blob_root = config.storage.root_directory.clone();
    let images_container = config.storage.images_container.clone();
    let pipeline_data = web::Data::from(pipeline);

    log::info!("Starting web server on port: {}", port);
    log::debug!("Serving {}/{} under /blobs", blob_root, images_container);

    HttpServer::new(move || {
        App::new()
            .app_data(pipeline_data.clone())
            .configure(configure)
            .service(blob_files(&blob_root, &images_container))
    })
    .bind(format!("0.0.0.0:{}", port))?
    .run()
    .await
}
