use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{LogEntry, LogRow};

/// Insert one row. The entry's timestamp must already be canonical.
pub async fn insert(pool: &SqlitePool, entry: &LogEntry) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO logs (timestamp, user, action, system) VALUES (?, ?, ?, ?)",
    )
    .bind(&entry.timestamp)
    .bind(&entry.user)
    .bind(&entry.action)
    .bind(&entry.system)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Row filter shared by the HTML view and the CSV export.
///
/// `user` and `system` match exactly, `action` matches as a substring, and
/// the time bounds compare against the canonical timestamp text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogFilter {
    pub user: Option<String>,
    pub system: Option<String>,
    pub action: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl LogFilter {
    /// Drop empty values, which a submitted filter form sends for blank inputs.
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        LogFilter {
            user: keep(self.user),
            system: keep(self.system),
            action: keep(self.action),
            start_time: keep(self.start_time),
            end_time: keep(self.end_time),
        }
    }
}

pub fn push_clause(builder: &mut QueryBuilder<'_, Sqlite>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

fn build_list_query(filter: &LogFilter) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new("SELECT timestamp, user, system, action FROM logs");
    let mut has_clause = false;

    if let Some(user) = &filter.user {
        push_clause(&mut builder, &mut has_clause);
        builder.push("user = ").push_bind(user.clone());
    }
    if let Some(system) = &filter.system {
        push_clause(&mut builder, &mut has_clause);
        builder.push("system = ").push_bind(system.clone());
    }
    if let Some(action) = &filter.action {
        push_clause(&mut builder, &mut has_clause);
        builder.push("action LIKE ").push_bind(format!("%{action}%"));
    }
    if let Some(start) = &filter.start_time {
        push_clause(&mut builder, &mut has_clause);
        builder.push("timestamp >= ").push_bind(start.clone());
    }
    if let Some(end) = &filter.end_time {
        push_clause(&mut builder, &mut has_clause);
        builder.push("timestamp <= ").push_bind(end.clone());
    }

    builder.push(" ORDER BY timestamp DESC, id DESC");
    builder
}

/// Matching rows, newest first.
pub async fn list(pool: &SqlitePool, filter: &LogFilter) -> Result<Vec<LogRow>, sqlx::Error> {
    let mut builder = build_list_query(filter);
    builder.build_query_as::<LogRow>().fetch_all(pool).await
}
