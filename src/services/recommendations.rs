use tracing::instrument;

use crate::{
    db::{queries, GraphStore, Statement},
    error::{AppError, AppResult},
    models::{columns, Movie, RecommendationKind, RecommendationParams, RecommendationRequest, Record, User},
};

/// Recommendation and lookup operations over the movie graph
///
/// Owns the store handle for its whole lifetime. Every operation is a
/// single read-only statement (apart from [`add_user`](Self::add_user)),
/// and the similarity math itself runs inside the database.
pub struct RecommendationService {
    store: Option<Box<dyn GraphStore>>,
    params: RecommendationParams,
}

impl RecommendationService {
    pub fn new(store: Box<dyn GraphStore>, params: RecommendationParams) -> Self {
        Self {
            store: Some(store),
            params,
        }
    }

    pub fn params(&self) -> &RecommendationParams {
        &self.params
    }

    pub fn is_closed(&self) -> bool {
        self.store.is_none()
    }

    fn store(&self) -> AppResult<&dyn GraphStore> {
        self.store.as_deref().ok_or(AppError::Closed)
    }

    /// Dispatches on a textual kind (`by-user`/`user`, `by-movie`/`movie`)
    ///
    /// Unknown kinds fail with `InvalidKind` before any query is issued.
    pub async fn get_recommendations_for(
        &self,
        kind: &str,
        subject_id: i64,
    ) -> AppResult<Vec<Movie>> {
        let request = RecommendationRequest::parse(kind, subject_id).inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected recommendation request");
        })?;
        self.recommend(request).await
    }

    pub async fn recommend(&self, request: RecommendationRequest) -> AppResult<Vec<Movie>> {
        self.get_recommendations(request.kind, request.subject_id)
            .await
    }

    /// Recommended movies for a user or a movie, best score first
    ///
    /// An empty result from the store is an empty list, not an error.
    #[instrument(skip(self, kind), fields(kind = %kind))]
    pub async fn get_recommendations(
        &self,
        kind: RecommendationKind,
        subject_id: i64,
    ) -> AppResult<Vec<Movie>> {
        let (statement, score_column) = match kind {
            RecommendationKind::ByUser => (
                queries::recommend_by_user(subject_id, &self.params),
                columns::SCORE,
            ),
            RecommendationKind::ByMovie => (
                queries::recommend_by_movie(subject_id, &self.params),
                columns::SIMILARITY,
            ),
        };

        let records = self.store()?.fetch(&statement).await?;

        let mut movies = records
            .iter()
            .map(|record| Movie::from_scored_record(record, score_column))
            .collect::<AppResult<Vec<_>>>()?;
        sort_by_score(&mut movies);

        tracing::info!(
            subject_id,
            count = movies.len(),
            "Recommendations fetched"
        );

        Ok(movies)
    }

    /// Finds a movie by exact title
    #[instrument(skip(self))]
    pub async fn find_movie_by_title(&self, title: &str) -> AppResult<Option<Movie>> {
        self.fetch_one(queries::movie_by_title(title), Movie::from_record)
            .await
    }

    #[instrument(skip(self))]
    pub async fn find_movie_by_id(&self, movie_id: i64) -> AppResult<Option<Movie>> {
        self.fetch_one(
            queries::movie_by_id(movie_id, self.params.id_format),
            Movie::from_record,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn find_user_by_name(&self, username: &str) -> AppResult<Option<User>> {
        self.fetch_one(queries::user_by_name(username), User::from_record)
            .await
    }

    #[instrument(skip(self))]
    pub async fn find_user_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        self.fetch_one(
            queries::user_by_id(user_id, self.params.id_format),
            User::from_record,
        )
        .await
    }

    /// Creates the user if missing and sets its username
    ///
    /// Administrative only; the recommendation path never writes.
    #[instrument(skip(self))]
    pub async fn add_user(&self, user_id: i64, username: &str) -> AppResult<()> {
        let statement = queries::upsert_user(user_id, username, self.params.id_format);
        self.store()?.execute(&statement).await?;
        tracing::info!(user_id, "User upserted");
        Ok(())
    }

    async fn fetch_one<T>(
        &self,
        statement: Statement,
        map: fn(&Record) -> AppResult<T>,
    ) -> AppResult<Option<T>> {
        let records = self.store()?.fetch(&statement).await?;

        match records.first() {
            Some(record) => map(record).map(Some),
            None => {
                tracing::debug!(statement = statement.name, "Lookup matched nothing");
                Ok(None)
            }
        }
    }

    /// Releases the store handle
    ///
    /// Safe to call more than once; later calls are no-ops. Any operation
    /// after the first close fails with `AppError::Closed`.
    pub async fn close(&mut self) -> AppResult<()> {
        let Some(store) = self.store.take() else {
            tracing::debug!("Store already released");
            return Ok(());
        };

        let result = store.close().await;
        drop(store);

        match &result {
            Ok(()) => tracing::info!("Store released"),
            Err(e) => tracing::error!(error = %e, "Failed to release store"),
        }
        result
    }

    /// Closes the service after an operation, keeping the operation's own error
    ///
    /// A close failure is only returned when the operation itself succeeded.
    pub async fn finish<T>(mut self, outcome: AppResult<T>) -> AppResult<T> {
        let closed = self.close().await;

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(e), _) => Err(e),
        }
    }
}

/// Stable sort by descending score; ties keep the store's order
fn sort_by_score(movies: &mut [Movie]) {
    movies.sort_by(|a, b| b.score().total_cmp(&a.score()));
}
