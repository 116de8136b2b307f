// src/handlers.rs
use crate::{AppState, catalog::catalog, errors::StudioError, models::*};
use crate::services::editor::FieldUpdate;
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, http::header, web};
use futures_util::TryStreamExt;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    lang: Option<String>,
}

impl LanguageQuery {
    fn language(&self) -> Language {
        self.lang
            .as_deref()
            .map(Language::from_code)
            .unwrap_or_default()
    }
}

fn download_name(extension: &str) -> String {
    format!(
        "interior-design-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        extension
    )
}

pub async fn get_catalog() -> HttpResponse {
    HttpResponse::Ok().json(catalog())
}

pub async fn create_session(data: web::Data<AppState>) -> HttpResponse {
    let view = data.sessions.create().await;
    HttpResponse::Created().json(view)
}

pub async fn get_session(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let view = data.sessions.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn delete_session(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    data.sessions.remove(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn update_config(
    path: web::Path<Uuid>,
    update: web::Json<FieldUpdate>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let config = data
        .sessions
        .update_field(path.into_inner(), update.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(config))
}

pub async fn upload_image(
    path: web::Path<(Uuid, String)>,
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let (session_id, slot) = path.into_inner();
    let slot: ImageSlot = slot.parse()?;

    let mut upload = None;
    while let Some(mut field) = payload.try_next().await? {
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{:?}", slot));

        // Collect image data
        let mut image_data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if image_data.len() + chunk.len() > data.max_upload_bytes {
                return Err(StudioError::Validation(format!(
                    "Upload exceeds the {} byte limit",
                    data.max_upload_bytes
                ))
                .into());
            }
            image_data.extend_from_slice(&chunk);
        }

        // First non-empty file part is the image; anything after it is ignored
        if upload.is_none() && !image_data.is_empty() {
            upload = Some((filename, image_data));
        }
    }

    let (filename, image_data) =
        upload.ok_or_else(|| StudioError::Validation("No image file provided".to_string()))?;

    let attachment = data.image_processor.prepare_upload(&filename, &image_data)?;
    log::info!(
        "Session {}: stored {:?} ({}x{}, {})",
        session_id,
        slot,
        attachment.width,
        attachment.height,
        attachment.mime_type
    );

    let config = data
        .sessions
        .set_image(session_id, slot, Some(attachment))
        .await?;
    Ok(HttpResponse::Ok().json(config))
}

pub async fn clear_image(
    path: web::Path<(Uuid, String)>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let (session_id, slot) = path.into_inner();
    let slot: ImageSlot = slot.parse()?;
    let config = data.sessions.set_image(session_id, slot, None).await?;
    Ok(HttpResponse::Ok().json(config))
}

pub async fn apply_preset(
    path: web::Path<(Uuid, String)>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let (session_id, preset_name) = path.into_inner();
    let config = data.sessions.apply_preset(session_id, &preset_name).await?;
    Ok(HttpResponse::Ok().json(config))
}

pub async fn preview_prompt(
    path: web::Path<Uuid>,
    query: web::Query<LanguageQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let language = query.language();
    let prompt = data.sessions.prompt(path.into_inner(), language).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "language": language,
        "prompt": prompt
    })))
}

pub async fn generate(
    path: web::Path<Uuid>,
    query: web::Query<LanguageQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let view = data
        .sessions
        .submit(path.into_inner(), query.language(), data.editor.clone())
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn download_image(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let (image_data, _mime_type) = data.sessions.result_image(path.into_inner()).await?;
    let png = data.image_processor.to_png(&image_data)?;

    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_name("png")),
        ))
        .body(png))
}

pub async fn download_metadata(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let metadata = data.sessions.result_metadata(path.into_inner()).await?;
    let pretty = serde_json::to_string_pretty(&metadata)
        .map_err(|e| StudioError::Serialization(e.to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_name("json")),
        ))
        .body(pretty))
}
