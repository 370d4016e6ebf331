use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::AppResult;

pub mod recommendation;
pub mod record;

pub use recommendation::{IdFormat, RecommendationKind, RecommendationParams, RecommendationRequest};
pub use record::{FieldValue, Record};

/// Column aliases shared by the query templates and the row mappers
pub mod columns {
    pub const MOVIE_ID: &str = "movieId";
    pub const TITLE: &str = "title";
    pub const SCORE: &str = "score";
    pub const SIMILARITY: &str = "similarity";
    pub const USER_ID: &str = "userId";
    pub const USERNAME: &str = "username";
}

// ============================================================================
// Movie
// ============================================================================

/// A movie returned to the caller
///
/// `similarity` is only set on recommendation results and only means
/// something within the response it came from. Equality ignores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl Movie {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            similarity: None,
        }
    }

    pub fn scored(id: i64, title: impl Into<String>, similarity: f64) -> Self {
        Self {
            id,
            title: title.into(),
            similarity: Some(similarity),
        }
    }

    /// Score used for ordering; unscored or NaN movies sort last
    pub fn score(&self) -> f64 {
        self.similarity
            .filter(|s| !s.is_nan())
            .unwrap_or(f64::NEG_INFINITY)
    }

    /// Maps a lookup row (`movieId`, `title`)
    pub fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self::new(
            record.int(columns::MOVIE_ID)?,
            record.text(columns::TITLE)?,
        ))
    }

    /// Maps a recommendation row, reading the score from `score_column`
    pub fn from_scored_record(record: &Record, score_column: &str) -> AppResult<Self> {
        Ok(Self::scored(
            record.int(columns::MOVIE_ID)?,
            record.text(columns::TITLE)?,
            record.float(score_column)?,
        ))
    }
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.title == other.title
    }
}

impl Display for Movie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.similarity {
            Some(score) => write!(f, "{}: {:.4}", self.title, score),
            None => write!(f, "{} ({})", self.title, self.id),
        }
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    /// Maps a lookup row (`userId`, `username`); a missing username reads as empty
    pub fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self::new(
            record.int(columns::USER_ID)?,
            record.opt_text(columns::USERNAME)?.unwrap_or_default(),
        ))
    }
}

impl Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.username, self.id)
    }
}
