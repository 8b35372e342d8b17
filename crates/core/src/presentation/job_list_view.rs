use super::status_badge::{status_badge, StatusBadge};
use crate::shared::time_format::format_time;
use crate::transcription::domain::api_error::ApiError;
use crate::transcription::domain::job::JobSummary;

pub const LIST_TITLE: &str = "Your Transcriptions";
pub const LIST_ERROR_MESSAGE: &str = "Failed to load transcriptions. Please try again.";
pub const EMPTY_LIST_MESSAGE: &str = "No transcriptions yet. Upload a file to get started!";

#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub id: String,
    pub file_name: String,
    pub badge: StatusBadge,
    pub duration: String,
}

impl JobRow {
    pub fn from_summary(summary: &JobSummary) -> Self {
        Self {
            id: summary.id.clone(),
            file_name: summary.file_name.clone(),
            badge: status_badge(summary.status),
            duration: summary
                .duration
                .filter(|d| *d > 0.0)
                .map(format_time)
                .unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

/// What the job list page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum JobListView {
    Loading,
    Error { detail: String },
    Empty,
    Rows(Vec<JobRow>),
}

impl JobListView {
    pub fn from_result(result: &Result<Vec<JobSummary>, ApiError>) -> Self {
        match result {
            Err(e) => JobListView::Error {
                detail: e.to_string(),
            },
            Ok(jobs) if jobs.is_empty() => JobListView::Empty,
            Ok(jobs) => JobListView::Rows(jobs.iter().map(JobRow::from_summary).collect()),
        }
    }
}
