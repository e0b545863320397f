mod common;

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::json;

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

// ── Ingestion ───────────────────────────────────────────────────

#[tokio::test]
async fn ingest_accepts_entry_and_normalizes_timestamp() {
    let app = common::spawn_app().await;

    let (body, status) = app
        .post_log(&json!({
            "timestamp": "2024-06-01T12:00:00Z",
            "user": "CORP\\jdoe",
            "action": "Replaced fan",
            "system": "SRV01",
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success" }));

    let stored: String = sqlx::query_scalar("SELECT timestamp FROM logs WHERE system = ?")
        .bind("SRV01")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(stored, "2024-06-01T08:00:00.000000-04:00");

    let (page, status) = app.get_text("/log?system=SRV01").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Replaced fan"));
    assert!(page.contains("CORP\\jdoe"));
    assert!(page.contains("2024-06-01T08:00:00.000000-04:00"));
}

#[tokio::test]
async fn ingest_rejects_bad_timestamp() {
    let app = common::spawn_app().await;

    let (body, status) = app
        .post_log(&json!({
            "timestamp": "not-a-date",
            "user": "CORP\\jdoe",
            "action": "Replaced fan",
            "system": "SRV01",
        }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Invalid timestamp format")
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM logs")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn ingest_rejects_years_outside_canonical_width() {
    let app = common::spawn_app().await;

    for timestamp in ["+12345-01-01T00:00:00+00:00", "-0001-01-01T00:00:00+00:00"] {
        let (body, status) = app
            .post_log(&json!({
                "timestamp": timestamp,
                "user": "u",
                "action": "Replaced fan",
                "system": "SRV01",
            }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{timestamp}");
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .contains("Invalid timestamp format")
        );
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM logs")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn ingest_rejects_missing_field() {
    let app = common::spawn_app().await;

    let (body, status) = app
        .post_log(&json!({
            "timestamp": "2024-06-01T12:00:00Z",
            "user": "CORP\\jdoe",
            "system": "SRV01",
        }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("action"));
}

#[tokio::test]
async fn ingest_rejects_malformed_json() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/log"))
        .header("content-type", "application/json")
        .body("{\"timestamp\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ingest_stores_empty_strings_verbatim() {
    let app = common::spawn_app().await;

    app.log("2024-06-01T12:00:00Z", "", "", "").await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM logs WHERE action = '' AND system = ''")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn double_submit_creates_two_rows() {
    let app = common::spawn_app().await;

    app.log("2024-06-01T12:00:00Z", "u", "SRV01", "Replaced fan").await;
    app.log("2024-06-01T12:00:00Z", "u", "SRV01", "Replaced fan").await;

    assert_eq!(app.export_rows("").await.len(), 2);
}

// ── Query view ──────────────────────────────────────────────────

#[tokio::test]
async fn newest_entry_is_listed_first() {
    let app = common::spawn_app().await;

    app.log("2024-06-01T12:00:00Z", "a", "SRV01", "first").await;
    app.log("2024-06-03T12:00:00+02:00", "b", "SRV02", "third").await;
    app.log("2024-06-02T12:00:00-07:00", "c", "SRV03", "second").await;

    let (page, status) = app.get_text("/log").await;
    assert_eq!(status, StatusCode::OK);
    let third = page.find("third").unwrap();
    let second = page.find("second").unwrap();
    let first = page.find("first").unwrap();
    assert!(third < second && second < first);
}

#[tokio::test]
async fn view_echoes_filters_and_skips_blank_ones() {
    let app = common::spawn_app().await;

    app.log("2024-06-01T12:00:00Z", "a", "SRV01", "Replaced fan").await;
    app.log("2024-06-01T13:00:00Z", "a", "SRV02", "Patched kernel").await;

    let (page, status) = app
        .get_text("/log?user=&system=SRV02&action=&start_time=&end_time=")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Patched kernel"));
    assert!(!page.contains("Replaced fan"));
    assert!(page.contains("name=\"system\" value=\"SRV02\""));
    assert!(page.contains("/export/csv?system=SRV02"));
}

#[tokio::test]
async fn view_escapes_logged_text() {
    let app = common::spawn_app().await;

    app.log("2024-06-01T12:00:00Z", "a", "SRV01", "<script>alert(1)</script>")
        .await;

    let (page, _) = app.get_text("/log").await;
    assert!(!page.contains("<script>"));
    assert!(page.contains("&#60;script&#62;alert(1)&#60;/script&#62;"));
}

#[tokio::test]
async fn view_documents_canonical_bound_layout() {
    let app = common::spawn_app().await;

    let (page, _) = app.get_text("/log").await;
    assert!(page.contains("placeholder=\"2024-06-01T00:00:00.000000-04:00\""));
    assert!(page.contains("six fractional digits"));
}

// ── CSV export ──────────────────────────────────────────────────

#[tokio::test]
async fn empty_export_is_header_only() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/export/csv"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=logs_export.csv"
    );
    assert_eq!(resp.text().await.unwrap(), "Timestamp,User,System,Action\r\n");
}

#[tokio::test]
async fn export_filters_by_system_and_action() {
    let app = common::spawn_app().await;

    app.log("2024-06-01T12:00:00Z", "CORP\\jdoe", "SRV01", "Replaced fan").await;
    app.log("2024-06-02T12:00:00Z", "CORP\\jdoe", "SRV01", "Patched kernel").await;
    app.log("2024-06-03T12:00:00Z", "CORP\\asmith", "SRV010", "Replaced fan belt").await;

    let by_system = app.export_rows("?system=SRV01").await;
    assert_eq!(
        by_system,
        vec![
            "2024-06-02T08:00:00.000000-04:00,CORP\\jdoe,SRV01,Patched kernel".to_string(),
            "2024-06-01T08:00:00.000000-04:00,CORP\\jdoe,SRV01,Replaced fan".to_string(),
        ]
    );

    let by_action = app.export_rows("?action=fan").await;
    assert_eq!(by_action.len(), 2);
    assert!(by_action.iter().all(|row| row.contains("fan")));

    let by_user = app.export_rows("?user=CORP%5Casmith").await;
    assert_eq!(by_user.len(), 1);
    assert!(by_user[0].ends_with("SRV010,Replaced fan belt"));
}

#[tokio::test]
async fn export_honours_explicit_time_bounds() {
    let app = common::spawn_app().await;

    app.log("2024-06-01T12:00:00Z", "u", "SRV01", "one").await;
    app.log("2024-06-10T12:00:00Z", "u", "SRV01", "two").await;
    app.log("2024-06-20T12:00:00Z", "u", "SRV01", "three").await;

    let rows = app
        .export_rows("?start_time=2024-06-05&end_time=2024-06-15")
        .await;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].ends_with(",two"));
}

#[tokio::test]
async fn thirty_day_range_overrides_explicit_bounds() {
    let app = common::spawn_app().await;

    let recent = (Utc::now() - Duration::days(2)).to_rfc3339();
    let stale = (Utc::now() - Duration::days(45)).to_rfc3339();
    app.log(&recent, "u", "SRV01", "recent").await;
    app.log(&stale, "u", "SRV01", "stale").await;

    let rows = app
        .export_rows("?range=30days&start_time=1900-01-01&end_time=1900-01-02")
        .await;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].ends_with(",recent"));

    let without_range = app.export_rows("?range=all").await;
    assert_eq!(without_range.len(), 2);
}

// ── Storage failures ────────────────────────────────────────────

#[tokio::test]
async fn storage_failure_returns_500_with_description() {
    let app = common::spawn_app().await;

    sqlx::query("DROP TABLE logs")
        .execute(&app.pool)
        .await
        .unwrap();

    let (body, status) = app
        .post_log(&json!({
            "timestamp": "2024-06-01T12:00:00Z",
            "user": "u",
            "action": "Replaced fan",
            "system": "SRV01",
        }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Database error:"), "{message}");
    assert!(message.contains("no such table: logs"), "{message}");

    let (page, status) = app.get_text("/log").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(page.contains("no such table: logs"), "{page}");

    let (export, status) = app.get_text("/export/csv").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&export).unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Export failed:"), "{message}");
    assert!(message.contains("no such table: logs"), "{message}");
}
