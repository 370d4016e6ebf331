//! Cypher templates issued against the movie graph.
//!
//! The graph holds `(:User)-[:RATED {rating}]->(:Movie)` and
//! `(:Movie)-[:TAGGED_AS {relevance}]->(:Tag)` as loaded from MovieLens.
//! Every template aliases its return columns with the names in
//! [`crate::models::columns`], which is what the row mappers read.

use crate::{
    db::store::{Column, ColumnKind, ParamValue, Statement},
    models::{columns, IdFormat, RecommendationParams},
};

const SCORED_USER_COLUMNS: &[Column] = &[
    Column::new(columns::MOVIE_ID, ColumnKind::Integer),
    Column::new(columns::TITLE, ColumnKind::Text),
    Column::new(columns::SCORE, ColumnKind::Float),
];

const SCORED_MOVIE_COLUMNS: &[Column] = &[
    Column::new(columns::MOVIE_ID, ColumnKind::Integer),
    Column::new(columns::TITLE, ColumnKind::Text),
    Column::new(columns::SIMILARITY, ColumnKind::Float),
];

const MOVIE_COLUMNS: &[Column] = &[
    Column::new(columns::MOVIE_ID, ColumnKind::Integer),
    Column::new(columns::TITLE, ColumnKind::Text),
];

const USER_COLUMNS: &[Column] = &[
    Column::new(columns::USER_ID, ColumnKind::Integer),
    Column::new(columns::USERNAME, ColumnKind::OptionalText),
];

const RECOMMEND_BY_USER: &str = "\
MATCH (u1:User {userId: $uid})-[r:RATED]->(:Movie)
WITH u1, avg(toFloat(r.rating)) AS u1_mean
MATCH (u1)-[r1:RATED]->(:Movie)<-[r2:RATED]-(u2:User)
WITH u1, u1_mean, u2, collect({r1: r1, r2: r2}) AS ratings
WHERE size(ratings) > $min_common
MATCH (u2)-[r:RATED]->(:Movie)
WITH u1, u1_mean, u2, avg(toFloat(r.rating)) AS u2_mean, ratings
UNWIND ratings AS r
WITH u1, u2,
     sum((toFloat(r.r1.rating) - u1_mean) * (toFloat(r.r2.rating) - u2_mean)) AS nom,
     sqrt(sum((toFloat(r.r1.rating) - u1_mean) ^ 2) * sum((toFloat(r.r2.rating) - u2_mean) ^ 2)) AS denom
WHERE denom <> 0
WITH u1, u2, nom / denom AS pearson
ORDER BY pearson DESC LIMIT $neighbors
MATCH (u2)-[r:RATED]->(m:Movie)
WHERE NOT EXISTS { (u1)-[:RATED]->(m) }
RETURN toInteger(m.movieId) AS movieId, m.title AS title, sum(pearson * toFloat(r.rating)) AS score
ORDER BY score DESC LIMIT $limit";

const RECOMMEND_BY_MOVIE: &str = "\
MATCH (p1:Movie {movieId: $mid})-[x:TAGGED_AS]->(:Tag)<-[x2:TAGGED_AS]-(p2:Movie)
WHERE p2 <> p1 AND toFloat(x.relevance) > $threshold
WITH p1, p2, collect(toFloat(x.relevance)) AS p1_relevance, collect(toFloat(x2.relevance)) AS p2_relevance
RETURN toInteger(p2.movieId) AS movieId, p2.title AS title,
       gds.similarity.cosine(p1_relevance, p2_relevance) AS similarity
ORDER BY similarity DESC LIMIT $limit";

const MOVIE_BY_TITLE: &str = "\
MATCH (m:Movie {title: $title})
RETURN toInteger(m.movieId) AS movieId, m.title AS title
LIMIT 1";

const MOVIE_BY_ID: &str = "\
MATCH (m:Movie {movieId: $mid})
RETURN toInteger(m.movieId) AS movieId, m.title AS title
LIMIT 1";

const USER_BY_NAME: &str = "\
MATCH (u:User {username: $username})
RETURN toInteger(u.userId) AS userId, u.username AS username
LIMIT 1";

const USER_BY_ID: &str = "\
MATCH (u:User {userId: $uid})
RETURN toInteger(u.userId) AS userId, u.username AS username
LIMIT 1";

const UPSERT_USER: &str = "\
MERGE (u:User {userId: $uid})
SET u.username = $username";

/// Binds an entity id the way the graph stores it
pub fn id_param(id: i64, format: IdFormat) -> ParamValue {
    match format {
        IdFormat::Text => ParamValue::Text(id.to_string()),
        IdFormat::Integer => ParamValue::Integer(id),
    }
}

/// Pearson-correlated neighbours, then their top-scored movies the user has not rated
pub fn recommend_by_user(user_id: i64, params: &RecommendationParams) -> Statement {
    Statement::new("recommend_by_user", RECOMMEND_BY_USER, SCORED_USER_COLUMNS)
        .param("uid", id_param(user_id, params.id_format))
        .param("min_common", ParamValue::Integer(params.min_common_ratings.into()))
        .param("neighbors", ParamValue::Integer(params.neighbor_limit.into()))
        .param("limit", ParamValue::Integer(params.result_limit.into()))
}

/// Movies ranked by cosine similarity of shared tag relevance
pub fn recommend_by_movie(movie_id: i64, params: &RecommendationParams) -> Statement {
    Statement::new("recommend_by_movie", RECOMMEND_BY_MOVIE, SCORED_MOVIE_COLUMNS)
        .param("mid", id_param(movie_id, params.id_format))
        .param("threshold", ParamValue::Float(params.relevance_threshold))
        .param("limit", ParamValue::Integer(params.result_limit.into()))
}

pub fn movie_by_title(title: &str) -> Statement {
    Statement::new("movie_by_title", MOVIE_BY_TITLE, MOVIE_COLUMNS)
        .param("title", ParamValue::Text(title.to_string()))
}

pub fn movie_by_id(movie_id: i64, format: IdFormat) -> Statement {
    Statement::new("movie_by_id", MOVIE_BY_ID, MOVIE_COLUMNS).param("mid", id_param(movie_id, format))
}

pub fn user_by_name(username: &str) -> Statement {
    Statement::new("user_by_name", USER_BY_NAME, USER_COLUMNS)
        .param("username", ParamValue::Text(username.to_string()))
}

pub fn user_by_id(user_id: i64, format: IdFormat) -> Statement {
    Statement::new("user_by_id", USER_BY_ID, USER_COLUMNS).param("uid", id_param(user_id, format))
}

pub fn upsert_user(user_id: i64, username: &str, format: IdFormat) -> Statement {
    Statement::new("upsert_user", UPSERT_USER, &[])
        .param("uid", id_param(user_id, format))
        .param("username", ParamValue::Text(username.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every `$name` in the text must be bound, and nothing extra
    fn assert_params_match(statement: &Statement) {
        let mut placeholders: Vec<&str> = statement
            .text
            .split('$')
            .skip(1)
            .map(|rest| {
                let end = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                &rest[..end]
            })
            .collect();
        placeholders.sort_unstable();
        placeholders.dedup();

        let mut bound: Vec<&str> = statement.params.iter().map(|(k, _)| *k).collect();
        bound.sort_unstable();

        assert_eq!(placeholders, bound, "statement {}", statement.name);
    }

    /// Every declared column must be aliased in the RETURN clause
    fn assert_columns_aliased(statement: &Statement) {
        let returned = statement
            .text
            .rsplit("RETURN")
            .next()
            .unwrap_or_default();
        for column in statement.columns {
            assert!(
                returned.contains(&format!("AS {}", column.name)),
                "{} does not alias {}",
                statement.name,
                column.name
            );
        }
    }

    fn all_statements() -> Vec<Statement> {
        let params = RecommendationParams::default();
        vec![
            recommend_by_user(1, &params),
            recommend_by_movie(1, &params),
            movie_by_title("Inception"),
            movie_by_id(27, IdFormat::Text),
            user_by_name("alice"),
            user_by_id(1, IdFormat::Text),
            upsert_user(1, "alice", IdFormat::Text),
        ]
    }

    #[test]
    fn test_placeholders_are_bound() {
        for statement in all_statements() {
            assert_params_match(&statement);
        }
    }

    #[test]
    fn test_columns_are_aliased() {
        for statement in all_statements() {
            assert_columns_aliased(&statement);
        }
    }

    #[test]
    fn test_recommend_by_user_binds_limits() {
        let params = RecommendationParams {
            neighbor_limit: 7,
            result_limit: 12,
            min_common_ratings: 3,
            ..RecommendationParams::default()
        };
        let statement = recommend_by_user(42, &params);

        assert_eq!(statement.get_param("uid"), Some(&ParamValue::Text("42".to_string())));
        assert_eq!(statement.get_param("neighbors"), Some(&ParamValue::Integer(7)));
        assert_eq!(statement.get_param("limit"), Some(&ParamValue::Integer(12)));
        assert_eq!(statement.get_param("min_common"), Some(&ParamValue::Integer(3)));
    }

    #[test]
    fn test_recommend_by_user_excludes_rated_movies() {
        let statement = recommend_by_user(1, &RecommendationParams::default());
        assert!(statement.text.contains("NOT EXISTS { (u1)-[:RATED]->(m) }"));
        assert!(statement.text.contains("ORDER BY score DESC"));
    }

    #[test]
    fn test_recommend_by_movie_binds_threshold() {
        let params = RecommendationParams {
            relevance_threshold: 0.75,
            id_format: IdFormat::Integer,
            ..RecommendationParams::default()
        };
        let statement = recommend_by_movie(27, &params);

        assert_eq!(statement.get_param("mid"), Some(&ParamValue::Integer(27)));
        assert_eq!(statement.get_param("threshold"), Some(&ParamValue::Float(0.75)));
        assert!(statement.text.contains("ORDER BY similarity DESC"));
    }

    #[test]
    fn test_movie_by_id_matches_on_id() {
        let statement = movie_by_id(27, IdFormat::Text);
        assert!(statement.text.contains("{movieId: $mid}"));
        assert!(!statement.text.contains("{title:"));
    }
}
