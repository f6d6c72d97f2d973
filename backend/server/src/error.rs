use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use redis::RedisError;
use schema::{FieldError, ValidationErrors, validate::BODY_FIELD};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::{config::ConfigError, database::StoreError};

pub const MALFORMED_MESSAGE: &str = "Malformed JSON payload";
pub const STORE_FAILURE_MESSAGE: &str = "Failed to save survey";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Invalid survey: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MalformedPayload => {
                warn!("Rejected survey: malformed payload");

                let errors = ValidationErrors::from(FieldError::new(BODY_FIELD, MALFORMED_MESSAGE));
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            AppError::Validation(errors) => {
                warn!("Rejected survey: {errors}");

                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            AppError::Store(e) => {
                error!("Error saving survey: {e}");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": STORE_FAILURE_MESSAGE })),
                )
                    .into_response()
            }
        }
    }
}

/// Anything that stops the service from coming up or keeps it from serving.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Error connecting to the database: {0}")]
    Database(#[from] RedisError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}
