use std::sync::Arc;

use neo4rs::{Graph, Query, Row};
use tokio::sync::RwLock;
use tracing::Instrument;

use crate::{
    db::{
        session::{make_session_span, SessionId},
        store::{Column, ColumnKind, GraphStore, ParamValue, Statement},
    },
    error::{AppError, AppResult},
    models::{FieldValue, Record},
};

/// Graph store backed by a Neo4j server over Bolt
///
/// `neo4rs::Graph` is a pooled handle: each call below checks a connection
/// out for the duration of one statement. Clones share the pool, and
/// [`close`](GraphStore::close) releases it for all of them; later calls
/// fail with `AppError::Closed`.
#[derive(Clone)]
pub struct Neo4jStore {
    graph: Arc<RwLock<Option<Graph>>>,
    uri: String,
}

impl Neo4jStore {
    /// Creates the connection pool; no round trip happens until the first query
    pub fn connect(uri: &str, user: &str, password: &str) -> AppResult<Self> {
        let graph = Graph::new(uri, user, password)?;

        tracing::info!(uri = %uri, user = %user, "Configured Neo4j connection pool");

        Ok(Self {
            graph: Arc::new(RwLock::new(Some(graph))),
            uri: uri.to_string(),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub async fn is_closed(&self) -> bool {
        self.graph.read().await.is_none()
    }

    /// Pool handle for one statement; the lock is not held across the query
    async fn graph(&self) -> AppResult<Graph> {
        self.graph.read().await.clone().ok_or(AppError::Closed)
    }
}

/// Binds a statement's parameters onto a driver query
fn to_query(statement: &Statement) -> Query {
    statement
        .params
        .iter()
        .fold(Query::new(statement.text.clone()), |query, (key, value)| match value {
            ParamValue::Integer(v) => query.param(key, *v),
            ParamValue::Float(v) => query.param(key, *v),
            ParamValue::Text(v) => query.param(key, v.clone()),
        })
}

/// Extracts the declared columns from a driver row
fn read_row(row: &Row, columns: &[Column]) -> AppResult<Record> {
    let mut record = Record::new();
    for column in columns {
        let value = match column.kind {
            ColumnKind::Integer => FieldValue::Integer(row.get::<i64>(column.name)?),
            ColumnKind::Float => FieldValue::Float(row.get::<f64>(column.name)?),
            ColumnKind::Text => FieldValue::Text(row.get::<String>(column.name)?),
            ColumnKind::OptionalText => row.get::<Option<String>>(column.name)?.into(),
        };
        record.insert(column.name, value);
    }
    Ok(record)
}

#[async_trait::async_trait]
impl GraphStore for Neo4jStore {
    async fn fetch(&self, statement: &Statement) -> AppResult<Vec<Record>> {
        let graph = self.graph().await?;
        let span = make_session_span(SessionId::new(), statement);

        async {
            let mut stream = graph.execute(to_query(statement)).await?;

            let mut records = Vec::new();
            while let Some(row) = stream.next().await? {
                records.push(read_row(&row, statement.columns)?);
            }

            tracing::debug!(rows = records.len(), "Statement completed");
            Ok::<_, AppError>(records)
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, statement: &Statement) -> AppResult<()> {
        let graph = self.graph().await?;
        let span = make_session_span(SessionId::new(), statement);

        async {
            let mut txn = graph.start_txn().await?;
            txn.run(to_query(statement)).await?;
            txn.commit().await?;

            tracing::debug!("Write transaction committed");
            Ok::<_, AppError>(())
        }
        .instrument(span)
        .await
    }

    async fn close(&self) -> AppResult<()> {
        match self.graph.write().await.take() {
            Some(graph) => {
                drop(graph);
                tracing::info!(uri = %self.uri, "Released Neo4j connection pool");
            }
            None => tracing::debug!(uri = %self.uri, "Neo4j connection pool already released"),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "neo4j"
    }
}
