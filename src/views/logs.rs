use askama::Template;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};

use crate::db;
use crate::db::logs::LogFilter;
use crate::error::AppError;
use crate::models::LogRow;
use crate::routes::export::LAST_30_DAYS;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "logs.html")]
struct LogsTemplate {
    logs: Vec<LogRow>,
    filters: FilterValues,
    export_query: String,
    recent_export_query: String,
}

/// Filter values echoed back into the filter form, blank when unset.
struct FilterValues {
    user: String,
    system: String,
    action: String,
    start_time: String,
    end_time: String,
}

impl From<&LogFilter> for FilterValues {
    fn from(filter: &LogFilter) -> Self {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        FilterValues {
            user: value(&filter.user),
            system: value(&filter.system),
            action: value(&filter.action),
            start_time: value(&filter.start_time),
            end_time: value(&filter.end_time),
        }
    }
}

fn export_query(filter: &LogFilter, range: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let pairs = [
        ("user", &filter.user),
        ("system", &filter.system),
        ("action", &filter.action),
        ("start_time", &filter.start_time),
        ("end_time", &filter.end_time),
    ];
    for (key, value) in pairs {
        if let Some(value) = value {
            query.append_pair(key, value);
        }
    }
    if let Some(range) = range {
        query.append_pair("range", range);
    }
    query.finish()
}

pub async fn index(
    State(state): State<SharedState>,
    Query(filter): Query<LogFilter>,
) -> Result<impl IntoResponse, AppError> {
    let filter = filter.normalized();
    let logs = db::logs::list(&state.pool, &filter).await?;

    let template = LogsTemplate {
        logs,
        filters: FilterValues::from(&filter),
        export_query: export_query(&filter, None),
        recent_export_query: export_query(&filter, Some(LAST_30_DAYS)),
    };
    let page = template
        .render()
        .map_err(|e| AppError::Internal(format!("Failed to render logs page: {e}")))?;
    Ok(Html(page))
}
