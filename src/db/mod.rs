pub mod neo4j;
pub mod queries;
pub mod session;
pub mod store;

pub use neo4j::Neo4jStore;
pub use session::SessionId;
pub use store::{Column, ColumnKind, GraphStore, ParamValue, Statement};
