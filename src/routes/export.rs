use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;

use crate::db;
use crate::db::logs::LogFilter;
use crate::error::AppError;
use crate::models::LogRow;
use crate::state::SharedState;
use crate::timestamp;

pub const CSV_HEADER: [&str; 4] = ["Timestamp", "User", "System", "Action"];

/// `range` value that replaces any explicit bounds with the last 30 days.
pub const LAST_30_DAYS: &str = "30days";

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    #[serde(flatten)]
    pub filter: LogFilter,
    pub range: Option<String>,
}

pub async fn csv(
    State(state): State<SharedState>,
    Query(params): Query<ExportParams>,
) -> Result<Response, AppError> {
    let mut filter = params.filter.normalized();

    if params.range.as_deref() == Some(LAST_30_DAYS) {
        let now = timestamp::now_in_zone(&state.config.time_zone);
        let (start, end) = timestamp::trailing_window(now, 30);
        filter.start_time = Some(start);
        filter.end_time = Some(end);
    }

    let rows = db::logs::list(&state.pool, &filter)
        .await
        .map_err(|e| AppError::Internal(format!("Export failed: {e}")))?;

    let chunks =
        csv_chunks(&rows).map_err(|e| AppError::Internal(format!("Export failed: {e}")))?;

    tracing::debug!(rows = rows.len(), "Exporting logs as CSV");

    let stream = futures_util::stream::iter(chunks.into_iter().map(Ok::<_, Infallible>));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=logs_export.csv",
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Encode the header and each row as its own CSV chunk.
fn csv_chunks(rows: &[LogRow]) -> Result<Vec<Bytes>, csv::Error> {
    let mut chunks = Vec::with_capacity(rows.len() + 1);
    chunks.push(encode_record(CSV_HEADER)?);
    for row in rows {
        chunks.push(encode_record([
            &row.timestamp,
            &row.user,
            &row.system,
            &row.action,
        ])?);
    }
    Ok(chunks)
}

fn encode_record<I, T>(record: I) -> Result<Bytes, csv::Error>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(record)?;
    let buf = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(Bytes::from(buf))
}
