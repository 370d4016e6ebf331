use uuid::Uuid;

use crate::db::store::Statement;

/// Identifier attached to one unit of work against the store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Creates a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the UUID as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Creates the tracing span wrapping one statement's session
pub fn make_session_span(session_id: SessionId, statement: &Statement) -> tracing::Span {
    tracing::info_span!(
        "graph_session",
        session_id = %session_id,
        statement = statement.name,
        params = statement.params.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_display_matches_uuid() {
        let id = SessionId::new();
        assert_eq!(id.to_string(), id.as_str());
        assert!(Uuid::parse_str(&id.as_str()).is_ok());
    }
}
