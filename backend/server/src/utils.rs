use axum::body::Bytes;
use schema::{SurveySubmission, validate_submission};
use serde_json::Value;

use crate::error::AppError::{self, MalformedPayload};

/// Decodes a request body and runs the authoritative checks on it.
pub fn get_submission_from_body(body: &Bytes) -> Result<SurveySubmission, AppError> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| MalformedPayload)?;

    Ok(validate_submission(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_json() {
        let result = get_submission_from_body(&Bytes::from_static(b"{\"name\": "));

        assert!(matches!(result, Err(AppError::MalformedPayload)));
    }

    #[test]
    fn test_validation_errors_pass_through() {
        let result = get_submission_from_body(&Bytes::from_static(b"{\"name\": \"J\"}"));

        let Err(AppError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.fields().next(), Some("name"));
    }

    #[test]
    fn test_valid_body() {
        let body = Bytes::from_static(
            br#"{"name":"Jane Doe","email":"jane@example.com","role":"5-7","recommend":"Maybe","favoriteFeature":"Creative challenges","improvements":["Other"]}"#,
        );

        let submission = get_submission_from_body(&body).unwrap();

        assert_eq!(submission.name, "Jane Doe");
        assert_eq!(submission.age, None);
    }
}
