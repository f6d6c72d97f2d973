use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use schema::{SurveyRecord, rules::FIELDS};
use serde::Serialize;
use tracing::info;

use crate::{error::AppError, state::AppState, utils::get_submission_from_body};

pub const SAVED_MESSAGE: &str = "Survey saved successfully";

#[derive(Serialize)]
pub struct SurveySaved {
    message: &'static str,
    survey: SurveyRecord,
}

pub async fn survey_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let submission = get_submission_from_body(&body)?;
    let survey = state.store.insert(submission, Utc::now()).await?;

    info!("Survey {} saved", survey.id);

    Ok((
        StatusCode::CREATED,
        Json(SurveySaved {
            message: SAVED_MESSAGE,
            survey,
        }),
    ))
}

pub async fn schema_handler() -> impl IntoResponse {
    Json(&FIELDS)
}
