//! Movie recommendations served by Cypher queries against a Neo4j movie graph.
//!
//! [`RecommendationService`] routes a request to a user-based (Pearson
//! correlation) or movie-based (cosine similarity over tag relevance)
//! query and maps the rows into [`Movie`]s. The store is reached through
//! the [`GraphStore`] trait; [`Neo4jStore`] is the production backend.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use db::{GraphStore, Neo4jStore};
pub use error::{AppError, AppResult};
pub use models::{Movie, RecommendationKind, RecommendationParams, RecommendationRequest, User};
pub use services::RecommendationService;

/// Builds a service connected to the Neo4j server named in `config`
pub fn connect(config: &Config) -> AppResult<RecommendationService> {
    let store = Neo4jStore::connect(
        &config.neo4j_uri,
        &config.neo4j_user,
        &config.neo4j_password,
    )?;
    tracing::debug!(store = store.name(), "Store ready");
    Ok(RecommendationService::new(
        Box::new(store),
        config.recommendation_params(),
    ))
}
