use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub const ALL: &[JobStatus] = &[
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Whether a job observed in `self` may later be observed in `next`.
    ///
    /// Status only moves forward along pending → processing → completed/failed,
    /// and a terminal status is final.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return *self == next;
        }
        next.rank() >= self.rank()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "Pending"),
            JobStatus::Processing => write!(f, "Processing"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    #[serde(default, alias = "sourceUrl", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Backend processing time in seconds.
    #[serde(default, alias = "processingTime", skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One transcription request and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionJob {
    #[serde(alias = "transcription_id")]
    pub id: String,
    pub status: JobStatus,
    #[serde(default, alias = "fileName")]
    pub file_name: String,
    #[serde(default, alias = "fileType")]
    pub file_type: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JobMetadata>,
}

impl TranscriptionJob {
    pub fn new(id: &str, status: JobStatus, file_name: &str, file_type: &str) -> Self {
        Self {
            id: id.to_string(),
            status,
            file_name: file_name.to_string(),
            file_type: file_type.to_string(),
            duration: None,
            language: None,
            segments: Vec::new(),
            created_at: None,
            updated_at: None,
            metadata: None,
        }
    }

    /// Backend-supplied failure detail, if any.
    pub fn error_detail(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.error.as_deref())
            .filter(|e| !e.trim().is_empty())
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id.clone(),
            status: self.status,
            file_name: self.file_name.clone(),
            duration: self.duration,
        }
    }
}

/// List-view projection of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, alias = "fileName")]
    pub file_name: String,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Body of a segment edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobUpdate {
    pub segments: Vec<Segment>,
}
