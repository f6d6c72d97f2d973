//! # Constraint Table
//!
//! One entry per form field, in validation order. The server validator, the advisory form
//! validator and the browser script (through `GET /api/v1/survey/schema`) all read from here.
//!
//! ## Checks
//! - `pattern`: trimmed text must match a regular expression
//! - `range`: integer within inclusive bounds, the pattern is what a text input can check
//! - `oneOf`: exactly one of a closed set of strings
//! - `anyOf`: non-empty list drawn from a closed set of strings, duplicates collapsed
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{
    error::FieldError,
    model::{FavoriteFeature, Improvement, Recommendation, Role},
};

/// Regular expression kept in source form so it can be shipped to the browser.
#[derive(Debug)]
pub struct Pattern {
    source: &'static str,
    regex: OnceLock<Regex>,
}

impl Pattern {
    pub const fn new(source: &'static str) -> Self {
        Self {
            source,
            regex: OnceLock::new(),
        }
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex
            .get_or_init(|| Regex::new(self.source).expect("constraint patterns are valid"))
            .is_match(value)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.source)
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Check {
    Pattern {
        pattern: &'static Pattern,
    },
    Range {
        min: i64,
        max: i64,
        pattern: &'static Pattern,
    },
    OneOf {
        values: &'static [&'static str],
    },
    AnyOf {
        values: &'static [&'static str],
    },
}

/// How the browser form collects a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Input {
    Text,
    Email,
    Number,
    Select,
    Radio,
    Checkbox,
}

impl Input {
    /// Radio and checkbox inputs are validated as a group of options.
    pub fn is_group(self) -> bool {
        matches!(self, Input::Radio | Input::Checkbox)
    }
}

#[derive(Debug, Serialize)]
pub struct FieldRule {
    pub field: &'static str,
    pub label: &'static str,
    pub input: Input,
    pub required: bool,
    pub check: Check,
    pub message: &'static str,
}

/// A value that satisfied its rule, before it is turned into a typed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accepted {
    Absent,
    Text(String),
    Integer(i64),
    Choice(&'static str),
    Choices(Vec<&'static str>),
}

impl FieldRule {
    /// Checks a raw JSON value against this rule. `null` counts as missing.
    pub fn check(&self, value: Option<&Value>) -> Result<Accepted, FieldError> {
        let accepted = match (value.filter(|value| !value.is_null()), &self.check) {
            (None, _) if !self.required => Some(Accepted::Absent),
            (None, _) => None,
            (Some(value), Check::Pattern { pattern }) => value
                .as_str()
                .map(str::trim)
                .filter(|text| pattern.is_match(text))
                .map(|text| Accepted::Text(text.to_string())),
            (Some(value), Check::Range { min, max, pattern }) => integer(value, pattern)
                .filter(|number| (*min..=*max).contains(number))
                .map(Accepted::Integer),
            (Some(value), Check::OneOf { values }) => value
                .as_str()
                .and_then(|text| lookup(values, text))
                .map(Accepted::Choice),
            (Some(value), Check::AnyOf { values }) => value
                .as_array()
                .filter(|items| !items.is_empty())
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_str().and_then(|text| lookup(values, text)))
                        .collect::<Option<Vec<_>>>()
                })
                .map(|chosen| Accepted::Choices(dedupe(chosen))),
        };

        accepted.ok_or_else(|| FieldError::new(self.field, self.message))
    }
}

// The browser form posts the raw input string, API clients post a number. A string must
// pass the same pattern the form checks, so `"007"` is rejected everywhere.
fn integer(value: &Value, pattern: &Pattern) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => Some(text.trim())
            .filter(|text| pattern.is_match(text))
            .and_then(|text| text.parse().ok()),
        _ => None,
    }
}

fn lookup(values: &'static [&'static str], text: &str) -> Option<&'static str> {
    values.iter().copied().find(|value| *value == text)
}

fn dedupe(chosen: Vec<&'static str>) -> Vec<&'static str> {
    let mut unique = Vec::with_capacity(chosen.len());
    for value in chosen {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

static NAME_PATTERN: Pattern = Pattern::new(r"^[A-Za-z ]{2,50}$");
static EMAIL_PATTERN: Pattern = Pattern::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$");
static AGE_PATTERN: Pattern = Pattern::new(r"^(?:[0-9]|[1-9][0-9]|1[0-1][0-9]|120)$");

pub static NAME: FieldRule = FieldRule {
    field: "name",
    label: "Name",
    input: Input::Text,
    required: true,
    check: Check::Pattern {
        pattern: &NAME_PATTERN,
    },
    message: "Name must be 2-50 characters, letters and spaces only",
};

pub static EMAIL: FieldRule = FieldRule {
    field: "email",
    label: "Email",
    input: Input::Email,
    required: true,
    check: Check::Pattern {
        pattern: &EMAIL_PATTERN,
    },
    message: "Please enter a valid email address",
};

pub static AGE: FieldRule = FieldRule {
    field: "age",
    label: "Age",
    input: Input::Number,
    required: false,
    check: Check::Range {
        min: 0,
        max: 120,
        pattern: &AGE_PATTERN,
    },
    message: "Age must be between 0 and 120",
};

pub static ROLE: FieldRule = FieldRule {
    field: "role",
    label: "Child's age group",
    input: Input::Select,
    required: true,
    check: Check::OneOf {
        values: Role::VALUES,
    },
    message: "Please select a valid age group",
};

pub static RECOMMEND: FieldRule = FieldRule {
    field: "recommend",
    label: "Would you recommend us?",
    input: Input::Radio,
    required: true,
    check: Check::OneOf {
        values: Recommendation::VALUES,
    },
    message: "Please select a valid recommendation",
};

pub static FAVORITE_FEATURE: FieldRule = FieldRule {
    field: "favoriteFeature",
    label: "Favorite feature",
    input: Input::Select,
    required: true,
    check: Check::OneOf {
        values: FavoriteFeature::VALUES,
    },
    message: "Please select a valid favorite feature",
};

pub static IMPROVEMENTS: FieldRule = FieldRule {
    field: "improvements",
    label: "What could we improve?",
    input: Input::Checkbox,
    required: true,
    check: Check::AnyOf {
        values: Improvement::VALUES,
    },
    message: "Please select at least one valid improvement",
};

/// Validation order of the form, which is also the order errors are reported in.
pub static FIELDS: [&FieldRule; 7] = [
    &NAME,
    &EMAIL,
    &AGE,
    &ROLE,
    &RECOMMEND,
    &FAVORITE_FEATURE,
    &IMPROVEMENTS,
];

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_name_pattern() {
        assert!(NAME_PATTERN.is_match("Jane Doe"));
        assert!(NAME_PATTERN.is_match("Al"));
        assert!(!NAME_PATTERN.is_match("J"));
        assert!(!NAME_PATTERN.is_match("Jane D03"));
        assert!(!NAME_PATTERN.is_match(&"a".repeat(51)));
        assert!(NAME_PATTERN.is_match(&"a".repeat(50)));
        assert!(!NAME_PATTERN.is_match("Jane\nDoe"));
        assert!(!NAME_PATTERN.is_match("Jane\tDoe"));
        assert!(!NAME_PATTERN.is_match("Jane\u{a0}Doe"));
        assert!(!NAME_PATTERN.is_match("Jane\u{2003}Doe"));
    }

    #[test]
    fn test_inner_whitespace_is_not_trimmed_away() {
        assert_eq!(
            NAME.check(Some(&json!(" Jane Doe\n"))),
            Ok(Accepted::Text("Jane Doe".to_string()))
        );
        assert!(NAME.check(Some(&json!("Jane\nDoe"))).is_err());
    }

    #[test]
    fn test_email_pattern() {
        assert!(EMAIL_PATTERN.is_match("jane@example.com"));
        assert!(EMAIL_PATTERN.is_match("j.doe-1@mail.example.org"));
        assert!(!EMAIL_PATTERN.is_match("jane@example"));
        assert!(!EMAIL_PATTERN.is_match("jane.example.com"));
        assert!(!EMAIL_PATTERN.is_match("jane@example.c"));
    }

    #[test]
    fn test_age_pattern_agrees_with_range() {
        for age in 0..=120 {
            assert!(AGE_PATTERN.is_match(&age.to_string()), "{age}");
        }
        assert!(!AGE_PATTERN.is_match("121"));
        assert!(!AGE_PATTERN.is_match("-1"));
        assert!(!AGE_PATTERN.is_match("007"));
    }

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(
            NAME.check(Some(&json!("  Jane Doe "))),
            Ok(Accepted::Text("Jane Doe".to_string()))
        );
    }

    #[test]
    fn test_missing_optional_and_required() {
        assert_eq!(AGE.check(None), Ok(Accepted::Absent));
        assert_eq!(AGE.check(Some(&Value::Null)), Ok(Accepted::Absent));
        assert_eq!(
            ROLE.check(None),
            Err(FieldError::new("role", "Please select a valid age group"))
        );
    }

    #[test]
    fn test_age_bounds() {
        assert_eq!(AGE.check(Some(&json!(0))), Ok(Accepted::Integer(0)));
        assert_eq!(AGE.check(Some(&json!(120))), Ok(Accepted::Integer(120)));
        assert_eq!(AGE.check(Some(&json!("34"))), Ok(Accepted::Integer(34)));
        assert!(AGE.check(Some(&json!(-1))).is_err());
        assert!(AGE.check(Some(&json!(121))).is_err());
        assert!(AGE.check(Some(&json!(34.5))).is_err());
        assert!(AGE.check(Some(&json!(""))).is_err());
        assert!(AGE.check(Some(&json!("-1"))).is_err());
        assert!(AGE.check(Some(&json!("ten"))).is_err());
        assert_eq!(AGE.check(Some(&json!(" 120 "))), Ok(Accepted::Integer(120)));
    }

    #[test]
    fn test_age_string_follows_form_pattern() {
        assert!(AGE.check(Some(&json!("007"))).is_err());
        assert!(AGE.check(Some(&json!("0120"))).is_err());
        assert!(AGE.check(Some(&json!("+34"))).is_err());
        assert_eq!(AGE.check(Some(&json!(7))), Ok(Accepted::Integer(7)));
    }

    #[test]
    fn test_one_of_is_exact() {
        assert_eq!(ROLE.check(Some(&json!("11-13"))), Ok(Accepted::Choice("11-13")));
        assert!(ROLE.check(Some(&json!(" 11-13"))).is_err());
        assert!(RECOMMEND.check(Some(&json!("not sure"))).is_err());
        assert!(FAVORITE_FEATURE.check(Some(&json!(["Team projects"]))).is_err());
    }

    #[test]
    fn test_any_of() {
        assert_eq!(
            IMPROVEMENTS.check(Some(&json!(["Other"]))),
            Ok(Accepted::Choices(vec!["Other"]))
        );
        assert_eq!(
            IMPROVEMENTS.check(Some(&json!(["Other", "Longer workshops", "Other"]))),
            Ok(Accepted::Choices(vec!["Other", "Longer workshops"]))
        );
        assert!(IMPROVEMENTS.check(Some(&json!([]))).is_err());
        assert!(IMPROVEMENTS.check(Some(&json!("Other"))).is_err());
        assert!(IMPROVEMENTS.check(Some(&json!(["Other", "Free pizza"]))).is_err());
        assert!(IMPROVEMENTS.check(Some(&json!(["Other", 3]))).is_err());
    }

    #[test]
    fn test_table_serializes_for_browser() {
        let table = serde_json::to_value(&FIELDS).unwrap();

        assert_eq!(table.as_array().map(Vec::len), Some(7));
        assert_eq!(
            table[2],
            json!({
                "field": "age",
                "label": "Age",
                "input": "number",
                "required": false,
                "check": {
                    "kind": "range",
                    "min": 0,
                    "max": 120,
                    "pattern": "^(?:[0-9]|[1-9][0-9]|1[0-1][0-9]|120)$"
                },
                "message": "Age must be between 0 and 120"
            })
        );
        assert_eq!(table[6]["check"]["kind"], "anyOf");
        assert_eq!(table[3]["check"]["values"], json!(["5-7", "8-10", "11-13", "14+"]));
    }
}
