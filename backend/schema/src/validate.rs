//! Authoritative validation. The client may have checked the same rules already, it does
//! not matter: every field is checked again from the raw body.
use serde_json::Value;

use crate::{
    error::{FieldError, ValidationErrors},
    model::{FavoriteFeature, Improvement, Recommendation, Role, SurveySubmission},
    rules::{AGE, Accepted, EMAIL, FAVORITE_FEATURE, FieldRule, IMPROVEMENTS, NAME, RECOMMEND, ROLE},
};

pub const BODY_FIELD: &str = "body";
pub const NOT_AN_OBJECT: &str = "Survey payload must be a JSON object";

/// Checks every field of a raw survey body and reports all failures at once.
///
/// Unknown keys are ignored, including client-supplied `id` and `submittedAt`.
pub fn validate_submission(body: &Value) -> Result<SurveySubmission, ValidationErrors> {
    let Some(object) = body.as_object() else {
        return Err(FieldError::new(BODY_FIELD, NOT_AN_OBJECT).into());
    };

    let mut errors = Vec::new();
    let mut accept = |rule: &FieldRule| match rule.check(object.get(rule.field)) {
        Ok(accepted) => Some(accepted),
        Err(error) => {
            errors.push(error);
            None
        }
    };

    let name = accept(&NAME).and_then(into_text);
    let email = accept(&EMAIL).and_then(into_text);
    let age = accept(&AGE).and_then(into_age);
    let role = accept(&ROLE).and_then(into_choice).and_then(Role::parse);
    let recommend = accept(&RECOMMEND)
        .and_then(into_choice)
        .and_then(Recommendation::parse);
    let favorite_feature = accept(&FAVORITE_FEATURE)
        .and_then(into_choice)
        .and_then(FavoriteFeature::parse);
    let improvements = accept(&IMPROVEMENTS).and_then(|accepted| match accepted {
        Accepted::Choices(values) => values
            .into_iter()
            .map(Improvement::parse)
            .collect::<Option<Vec<_>>>(),
        _ => None,
    });

    match (name, email, age, role, recommend, favorite_feature, improvements) {
        (
            Some(name),
            Some(email),
            Some(age),
            Some(role),
            Some(recommend),
            Some(favorite_feature),
            Some(improvements),
        ) => Ok(SurveySubmission {
            name,
            email,
            age,
            role,
            recommend,
            favorite_feature,
            improvements,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

fn into_text(accepted: Accepted) -> Option<String> {
    match accepted {
        Accepted::Text(text) => Some(text),
        _ => None,
    }
}

fn into_age(accepted: Accepted) -> Option<Option<u8>> {
    match accepted {
        Accepted::Absent => Some(None),
        Accepted::Integer(age) => u8::try_from(age).ok().map(Some),
        _ => None,
    }
}

fn into_choice(accepted: Accepted) -> Option<&'static str> {
    match accepted {
        Accepted::Choice(value) => Some(value),
        _ => None,
    }
}
