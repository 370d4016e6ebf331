use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{IdFormat, RecommendationParams};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Bolt URI of the Neo4j server
    #[serde(default = "default_neo4j_uri")]
    pub neo4j_uri: String,

    #[serde(default = "default_neo4j_user")]
    pub neo4j_user: String,

    #[serde(default = "default_neo4j_password")]
    pub neo4j_password: String,

    /// How movie and user ids are stored on nodes
    #[serde(default)]
    pub neo4j_id_format: IdFormat,

    /// Number of most-correlated users consulted by the user strategy
    #[serde(default = "default_neighbor_limit")]
    pub neighbor_limit: u32,

    /// Maximum number of movies returned by either strategy
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,

    /// Shared ratings a neighbour must exceed to be correlated at all
    #[serde(default = "default_min_common_ratings")]
    pub min_common_ratings: u32,

    /// Tag relevance the subject movie must exceed for a tag to count
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "neo4j".to_string()
}

fn default_neighbor_limit() -> u32 {
    10
}

fn default_result_limit() -> u32 {
    25
}

fn default_min_common_ratings() -> u32 {
    10
}

fn default_relevance_threshold() -> f64 {
    0.5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| AppError::Config(format!("Failed to load config: {}", e)))
    }

    /// Strategy parameters derived from this configuration
    pub fn recommendation_params(&self) -> RecommendationParams {
        RecommendationParams {
            neighbor_limit: self.neighbor_limit,
            result_limit: self.result_limit,
            min_common_ratings: self.min_common_ratings,
            relevance_threshold: self.relevance_threshold,
            id_format: self.neo4j_id_format,
        }
    }
}
