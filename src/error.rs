/// Boxed driver-side error carried unmodified inside [`AppError::Query`]
pub type StoreFault = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid recommendation kind: {0}")]
    InvalidKind(String),

    #[error("Query error: {0}")]
    Query(#[source] StoreFault),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Store handle already closed")]
    Closed,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<neo4rs::Error> for AppError {
    fn from(err: neo4rs::Error) -> Self {
        AppError::Query(Box::new(err))
    }
}

impl From<neo4rs::DeError> for AppError {
    fn from(err: neo4rs::DeError) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl AppError {
    /// Builds a query error from any store-side failure
    pub fn query<E>(err: E) -> Self
    where
        E: Into<StoreFault>,
    {
        AppError::Query(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
