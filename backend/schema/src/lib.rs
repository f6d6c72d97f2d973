//! # Survey Schema
//!
//! Everything both sides of the survey agree on.
//!
//! ## Overall Structures
//!
//! - [`rules`]: the constraint table. One [`rules::FieldRule`] per form field, in the order
//!   the form validates them. Patterns, bounds, allowed values and messages live here and
//!   nowhere else.
//! - [`model`]: typed survey values. What the server persists after validation.
//! - [`validate`]: **authoritative** validation of a raw JSON body. Only the server calls it.
//! - [`form`]: **advisory** validation of raw form inputs. Mirrors what the browser does so
//!   clients can fail fast, never trusted to enforce anything.
//!
//! ## Notes
//! - The browser script fetches the constraint table as JSON instead of hardcoding patterns,
//!   so the client and the server cannot drift.
//! - A record that passed [`validate::validate_submission`] satisfies every rule in the table.
//!   Nothing else produces a [`model::SurveySubmission`].

pub mod error;
pub mod form;
pub mod model;
pub mod rules;
pub mod validate;

pub use error::{FieldError, ValidationErrors};
pub use model::{
    FavoriteFeature, Improvement, Recommendation, Role, SurveyRecord, SurveySubmission,
};
pub use validate::validate_submission;
