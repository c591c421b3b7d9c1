//! Monthly report and monthly chat-summary handlers.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use scribe_core::{Document, MonthlyReport, MonthlyStatistics, MonthlySummary, Note};
use scribe_notion::{blocks, normalize_database_id, NotionClient};

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct MonthlyReportRequest {
    pub user_id: String,
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize)]
pub struct MonthlySummaryRequest {
    pub year: i32,
    pub month: u32,
    pub reports: serde_json::Value,
}

/// UTC window covering one calendar month, end-inclusive.
fn month_window(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let start_date = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ApiError::BadRequest("无效的年份或月份".to_string()))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("first of month is always valid");

    let start = Utc.from_utc_datetime(&start_date.and_hms_opt(0, 0, 0).expect("midnight"));
    let end = Utc.from_utc_datetime(&next_month.and_hms_opt(0, 0, 0).expect("midnight"))
        - Duration::milliseconds(1);
    Ok((start, end))
}

/// Day (YYYY-MM-DD) with the most created records, or 无数据.
fn most_active_day(days: impl Iterator<Item = DateTime<Utc>>) -> String {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for day in days {
        *counts.entry(day.format("%Y-%m-%d").to_string()).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(day, _)| day)
        .unwrap_or_else(|| "无数据".to_string())
}

fn build_statistics(notes: &[Note], documents: &[Document]) -> MonthlyStatistics {
    let mut category_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    for category in notes
        .iter()
        .map(|n| n.analysis.category)
        .chain(documents.iter().map(|d| d.analysis.category))
    {
        *category_breakdown
            .entry(category.as_str().to_string())
            .or_default() += 1;
    }

    MonthlyStatistics {
        total_notes: notes.len(),
        total_documents: documents.len(),
        category_breakdown,
        most_active_day: most_active_day(
            notes
                .iter()
                .map(|n| n.created_at)
                .chain(documents.iter().map(|d| d.created_at)),
        ),
    }
}

/// Generate a monthly report over a user's notes and documents.
///
/// Statistics are computed locally; the analyzer only writes the narrative
/// sections. The finished report is mirrored to the server-level Notion
/// database best-effort.
pub async fn monthly_report(
    State(state): State<AppState>,
    Json(req): Json<MonthlyReportRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "用户ID、年份和月份都是必填的".to_string(),
        ));
    }
    let (start, end) = month_window(req.year, req.month)?;

    let analyzer = state.analyzer()?;

    let notes = state
        .store
        .notes
        .list_in_range(&req.user_id, start, end)
        .await?;
    let documents = state
        .store
        .documents
        .list_in_range(&req.user_id, start, end)
        .await?;

    let notes_digest: Vec<_> = notes
        .iter()
        .map(|n| {
            json!({
                "title": n.analysis.title,
                "category": n.analysis.category,
                "tags": n.analysis.tags,
                "summary": n.analysis.summary,
                "date": n.created_at,
            })
        })
        .collect();
    let documents_digest: Vec<_> = documents
        .iter()
        .map(|d| {
            json!({
                "title": d.analysis.title,
                "category": d.analysis.category,
                "tags": d.analysis.tags,
                "summary": d.analysis.summary,
                "document_type": d.analysis.document_type,
                "date": d.created_at,
            })
        })
        .collect();

    let analysis = analyzer
        .monthly_report(
            req.year,
            req.month,
            &json!(notes_digest),
            &json!(documents_digest),
        )
        .await?;

    let report = MonthlyReport {
        analysis,
        statistics: build_statistics(&notes, &documents),
        year: req.year,
        month: req.month,
        user_id: req.user_id.clone(),
        created_at: Utc::now(),
    };
    info!(
        user_id = %req.user_id,
        year = req.year,
        month = req.month,
        total_notes = report.statistics.total_notes,
        total_documents = report.statistics.total_documents,
        "monthly report generated"
    );

    mirror_report(&state, &report).await;

    Ok(Json(json!({
        "success": true,
        "report": report,
    })))
}

async fn mirror_report(state: &AppState, report: &MonthlyReport) {
    let (Some(api_key), Some(database_id)) = (
        state.config.notion_api_key.as_deref(),
        state.config.notion_database_id.as_deref(),
    ) else {
        return;
    };

    let database_id = normalize_database_id(database_id);
    let result = async {
        let client = NotionClient::new(api_key)?;
        client
            .create_page(blocks::monthly_report_page_body(&database_id, report))
            .await
    }
    .await;

    if let Err(err) = result {
        warn!(error = %err, "monthly report mirror failed");
    }
}

/// Generate a monthly summary over chat reports and mirror it best-effort.
pub async fn monthly_summary(
    State(state): State<AppState>,
    Json(req): Json<MonthlySummaryRequest>,
) -> Result<Json<MonthlySummary>, ApiError> {
    month_window(req.year, req.month)?;

    let analyzer = state.analyzer()?;
    let summary = analyzer
        .monthly_summary(req.year, req.month, &req.reports)
        .await?;

    if let (Some(api_key), Some(database_id)) = (
        state.config.notion_api_key.as_deref(),
        state.config.notion_database_id.as_deref(),
    ) {
        let database_id = normalize_database_id(database_id);
        let result = async {
            let client = NotionClient::new(api_key)?;
            client
                .create_page(blocks::monthly_summary_page_body(
                    &database_id,
                    req.year,
                    req.month,
                    &summary,
                ))
                .await
        }
        .await;

        if let Err(err) = result {
            warn!(error = %err, "monthly summary mirror failed");
        }
    }

    Ok(Json(summary))
}
