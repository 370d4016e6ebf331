use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// Strategy used to produce recommendations
///
/// Deserializes through [`FromStr`], so serde input accepts the same
/// spellings as text input.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    /// Pearson correlation between the subject user and other raters
    ByUser,
    /// Cosine similarity over tag relevance to the subject movie
    ByMovie,
}

impl Display for RecommendationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationKind::ByUser => write!(f, "by-user"),
            RecommendationKind::ByMovie => write!(f, "by-movie"),
        }
    }
}

impl FromStr for RecommendationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "by-user" | "user" => Ok(RecommendationKind::ByUser),
            "by-movie" | "movie" => Ok(RecommendationKind::ByMovie),
            _ => Err(AppError::InvalidKind(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for RecommendationKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A single recommendation request, built per call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub kind: RecommendationKind,
    /// User id for `ByUser`, movie id for `ByMovie`
    pub subject_id: i64,
}

impl RecommendationRequest {
    pub fn new(kind: RecommendationKind, subject_id: i64) -> Self {
        Self { kind, subject_id }
    }

    /// Parses the textual kind, failing with `InvalidKind` on anything unknown
    pub fn parse(kind: &str, subject_id: i64) -> Result<Self, AppError> {
        Ok(Self::new(kind.parse()?, subject_id))
    }
}

/// Storage representation of `movieId`/`userId` properties
///
/// The MovieLens CSV import leaves ids as strings, so `Text` is the default.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdFormat {
    #[default]
    Text,
    Integer,
}

/// Tunables for the two query strategies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationParams {
    pub neighbor_limit: u32,
    pub result_limit: u32,
    pub min_common_ratings: u32,
    pub relevance_threshold: f64,
    pub id_format: IdFormat,
}

impl Default for RecommendationParams {
    fn default() -> Self {
        Self {
            neighbor_limit: 10,
            result_limit: 25,
            min_common_ratings: 10,
            relevance_threshold: 0.5,
            id_format: IdFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_accepts_both_spellings() {
        assert_eq!(
            "by-user".parse::<RecommendationKind>().unwrap(),
            RecommendationKind::ByUser
        );
        assert_eq!(
            "movie".parse::<RecommendationKind>().unwrap(),
            RecommendationKind::ByMovie
        );
        assert_eq!(
            " By-Movie ".parse::<RecommendationKind>().unwrap(),
            RecommendationKind::ByMovie
        );
    }

    #[test]
    fn test_parse_kind_compares_values_not_instances() {
        let owned = String::from("us") + "er";
        assert_eq!(
            owned.parse::<RecommendationKind>().unwrap(),
            RecommendationKind::ByUser
        );
    }

    #[test]
    fn test_parse_kind_rejects_unknown() {
        let err = "genre".parse::<RecommendationKind>().unwrap_err();
        assert!(matches!(err, AppError::InvalidKind(ref k) if k == "genre"));
    }

    #[test]
    fn test_kind_display_roundtrips() {
        for kind in [RecommendationKind::ByUser, RecommendationKind::ByMovie] {
            assert_eq!(kind.to_string().parse::<RecommendationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&RecommendationKind::ByMovie).unwrap();
        assert_eq!(json, "\"by-movie\"");
    }

    #[test]
    fn test_kind_deserialization_matches_from_str() {
        for (json, expected) in [
            ("\"by-user\"", RecommendationKind::ByUser),
            ("\"user\"", RecommendationKind::ByUser),
            ("\"Movie\"", RecommendationKind::ByMovie),
            ("\" by-movie \"", RecommendationKind::ByMovie),
        ] {
            let kind: RecommendationKind = serde_json::from_str(json).unwrap();
            assert_eq!(kind, expected);
        }

        let err = serde_json::from_str::<RecommendationKind>("\"genre\"").unwrap_err();
        assert!(err.to_string().contains("Invalid recommendation kind: genre"));
    }

    #[test]
    fn test_request_parse() {
        let request = RecommendationRequest::parse("user", 1).unwrap();
        assert_eq!(request.kind, RecommendationKind::ByUser);
        assert_eq!(request.subject_id, 1);
        assert!(RecommendationRequest::parse("", 1).is_err());
    }
}
