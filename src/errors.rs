// src/errors.rs
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("{0}")]
    MissingInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Remote generation error: {0}")]
    RemoteCall(String),

    #[error("{0}")]
    PartialResponse(String),

    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("A generation request is already running for session {0}")]
    SubmissionInProgress(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StudioError {
    fn category(&self) -> &'static str {
        match self {
            StudioError::MissingInput(_) => "Missing input",
            StudioError::Configuration(_) => "Configuration error",
            StudioError::RemoteCall(_) => "AI service error",
            StudioError::PartialResponse(_) => "Incomplete response",
            StudioError::MalformedMetadata(_) => "Malformed metadata",
            StudioError::Validation(_) => "Validation error",
            StudioError::ImageProcessing(_) => "Image processing error",
            StudioError::SessionNotFound(_) => "Not found",
            StudioError::SubmissionInProgress(_) => "Conflict",
            StudioError::Serialization(_) => "Data processing error",
        }
    }
}

impl ResponseError for StudioError {
    fn error_response(&self) -> HttpResponse {
        let body = serde_json::json!({
            "error": self.category(),
            "message": self.to_string()
        });

        match self {
            StudioError::MissingInput(_)
            | StudioError::Validation(_)
            | StudioError::ImageProcessing(_) => HttpResponse::BadRequest().json(body),
            StudioError::SessionNotFound(_) => HttpResponse::NotFound().json(body),
            StudioError::SubmissionInProgress(_) => HttpResponse::Conflict().json(body),
            StudioError::RemoteCall(_) | StudioError::PartialResponse(_) => {
                HttpResponse::BadGateway().json(body)
            }
            StudioError::Configuration(_)
            | StudioError::MalformedMetadata(_)
            | StudioError::Serialization(_) => HttpResponse::InternalServerError().json(body),
        }
    }
}
