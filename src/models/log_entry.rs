use serde::{Deserialize, Serialize};

/// A log entry as it travels from the capture form to the log service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub user: String,
    pub action: String,
    pub system: String,
}

/// A stored log row as returned by queries. The surrogate id stays in the table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LogRow {
    pub timestamp: String,
    pub user: String,
    pub system: String,
    pub action: String,
}
