//! # Survey Response
//!
//! The single persisted entity. Created once per accepted submission, never updated.
//!
//! ## Fields
//! - name (**string**): trimmed, 2-50 letters and spaces
//! - email (**string**): trimmed, `local@domain.tld`
//! - age (**int**, optional): 0-120
//! - role, recommend, favoriteFeature (**enum**): closed sets of strings
//! - improvements (**set of enum**): non-empty, duplicates collapsed
//! - submittedAt (**timestamp**): assigned by the server at write time
//! - id (**uuid**): assigned by the store at write time
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of strings with a fixed wire spelling per variant.
macro_rules! choice {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

choice! {
    /// Age group of the child the survey is about.
    Role {
        FiveToSeven => "5-7",
        EightToTen => "8-10",
        ElevenToThirteen => "11-13",
        FourteenPlus => "14+",
    }
}

choice! {
    Recommendation {
        Definitely => "Definitely",
        Maybe => "Maybe",
        NotSure => "Not sure",
    }
}

choice! {
    FavoriteFeature {
        HandsOnActivities => "Hands-on activities",
        CreativeChallenges => "Creative challenges",
        TeamProjects => "Team projects",
        EducationalFun => "Educational fun",
    }
}

choice! {
    Improvement {
        MoreHandsOnActivities => "More hands-on activities",
        LongerWorkshops => "Longer workshops",
        MoreCreativeChallenges => "More creative challenges",
        Other => "Other",
    }
}

/// A submission that passed authoritative validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    pub role: Role,
    pub recommend: Recommendation,
    pub favorite_feature: FavoriteFeature,
    pub improvements: Vec<Improvement>,
}

/// A persisted survey document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub submission: SurveySubmission,
    pub submitted_at: DateTime<Utc>,
}

impl SurveyRecord {
    pub fn new(id: Uuid, submission: SurveySubmission, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            submission,
            submitted_at,
        }
    }
}
