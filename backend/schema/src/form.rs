//! # Advisory Form Validation
//!
//! The checks a form runs before it bothers the server. Same table, weaker guarantees:
//! - text inputs are matched against the rule's pattern (age only when filled in)
//! - selects only need a value, the options already come from the table
//! - radio and checkbox groups need at least one selection
//!
//! A pass never fails, it always yields a [`FormReport`]. The report is built fresh on every
//! pass so nothing carries over between submissions.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::rules::{Check, FIELDS, FieldRule, Pattern};

#[derive(Debug, Clone, Copy)]
pub enum FieldCheck<'a> {
    Pattern(&'a Pattern),
    Presence,
}

impl FieldCheck<'static> {
    pub fn for_rule(rule: &'static FieldRule) -> Self {
        match &rule.check {
            Check::Pattern { pattern } | Check::Range { pattern, .. } => {
                FieldCheck::Pattern(*pattern)
            }
            Check::OneOf { .. } | Check::AnyOf { .. } => FieldCheck::Presence,
        }
    }
}

/// Valid iff the trimmed value matches the pattern, or is non-empty for a presence check.
pub fn validate_field(value: &str, check: FieldCheck<'_>) -> bool {
    let value = value.trim();

    match check {
        FieldCheck::Pattern(pattern) => pattern.is_match(value),
        FieldCheck::Presence => !value.is_empty(),
    }
}

/// Valid iff at least one option of the group is selected.
pub fn validate_group<S: AsRef<str>>(selections: &[S]) -> bool {
    selections
        .iter()
        .any(|selection| !selection.as_ref().trim().is_empty())
}

/// Raw values as a form holds them, before any trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormValues {
    pub name: String,
    pub email: String,
    pub age: String,
    pub role: String,
    pub recommend: Option<String>,
    pub favorite_feature: String,
    pub improvements: Vec<String>,
}

impl FormValues {
    fn text(&self, field: &str) -> &str {
        match field {
            "name" => &self.name,
            "email" => &self.email,
            "age" => &self.age,
            "role" => &self.role,
            "favoriteFeature" => &self.favorite_feature,
            _ => "",
        }
    }

    fn group(&self, field: &str) -> &[String] {
        match field {
            "recommend" => self.recommend.as_slice(),
            "improvements" => &self.improvements,
            _ => &[],
        }
    }

    /// The JSON body a form posts: trimmed strings, blank age left out.
    pub fn payload(&self) -> Value {
        let mut payload = Map::new();

        payload.insert("name".into(), self.name.trim().into());
        payload.insert("email".into(), self.email.trim().into());
        if !self.age.trim().is_empty() {
            payload.insert("age".into(), self.age.trim().into());
        }
        payload.insert("role".into(), self.role.as_str().into());
        if let Some(recommend) = &self.recommend {
            payload.insert("recommend".into(), recommend.as_str().into());
        }
        payload.insert(
            "favoriteFeature".into(),
            self.favorite_feature.as_str().into(),
        );
        payload.insert("improvements".into(), self.improvements.clone().into());

        Value::Object(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStatus {
    pub field: &'static str,
    pub valid: bool,
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormReport {
    pub fields: Vec<FieldStatus>,
}

impl FormReport {
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|status| status.valid)
    }

    /// Where a form scrolls to after a failed submit.
    pub fn first_error(&self) -> Option<&FieldStatus> {
        self.fields.iter().find(|status| !status.valid)
    }

    pub fn errors(&self) -> impl Iterator<Item = &FieldStatus> {
        self.fields.iter().filter(|status| !status.valid)
    }
}

/// Validates every field in table order, the way a submit does.
pub fn validate_form(values: &FormValues) -> FormReport {
    let fields = FIELDS
        .iter()
        .map(|rule| {
            let valid = if rule.input.is_group() {
                validate_group(values.group(rule.field))
            } else {
                let value = values.text(rule.field);
                (!rule.required && value.trim().is_empty())
                    || validate_field(value, FieldCheck::for_rule(*rule))
            };

            FieldStatus {
                field: rule.field,
                valid,
                message: (!valid).then_some(rule.message),
            }
        })
        .collect();

    FormReport { fields }
}
