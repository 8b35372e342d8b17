use super::speaker_color::speaker_color;
use crate::query::job_poller::PollState;
use crate::shared::time_format::{format_time, format_time_range};
use crate::transcription::domain::job::{JobStatus, TranscriptionJob};
use crate::transcription::domain::segment::Segment;

pub const NO_SELECTION_MESSAGE: &str = "No transcription selected.";
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load transcription. Please try again.";
pub const PENDING_MESSAGE: &str = "Your file is queued and has not started processing yet.";
pub const PROCESSING_TITLE: &str = "Processing Your Transcription";
pub const PROCESSING_HINT: &str = "Your audio is being transcribed. This may take several minutes.";
pub const FAILED_TITLE: &str = "Transcription Failed";
pub const FAILED_HINT: &str = "Please try again.";
pub const NO_SEGMENTS_MESSAGE: &str = "No segments found in transcription.";

/// One rendered transcript segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentBlock {
    pub id: String,
    pub time_range: String,
    pub speaker: Option<String>,
    pub color: &'static str,
    pub text: String,
}

impl SegmentBlock {
    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            id: segment.id.clone(),
            time_range: format_time_range(segment.start_time, segment.end_time),
            speaker: segment.speaker.clone().filter(|s| !s.trim().is_empty()),
            color: speaker_color(segment.speaker.as_deref()),
            text: segment.text.clone(),
        }
    }
}

/// What the results page shows for the current poll state.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    NoSelection,
    Loading,
    /// The last fetch failed; transport problems, not job failures.
    LoadError { detail: String },
    Pending { file_name: String },
    Processing { file_name: String, duration: String },
    /// The service reported the job as failed.
    Failed { file_name: String, detail: Option<String> },
    Completed {
        file_name: String,
        duration: String,
        segments: Vec<SegmentBlock>,
    },
}

impl ResultsView {
    pub fn from_state(state: &PollState) -> Self {
        match state {
            PollState::Idle => ResultsView::NoSelection,
            PollState::Loading => ResultsView::Loading,
            PollState::Error { error, .. } => ResultsView::LoadError {
                detail: error.to_string(),
            },
            PollState::Ready(job) => Self::from_job(job),
        }
    }

    pub fn from_job(job: &TranscriptionJob) -> Self {
        let file_name = job.file_name.clone();
        let duration = format_time(job.duration.unwrap_or(0.0));
        match job.status {
            JobStatus::Pending => ResultsView::Pending { file_name },
            JobStatus::Processing => ResultsView::Processing {
                file_name,
                duration,
            },
            JobStatus::Failed => ResultsView::Failed {
                file_name,
                detail: job.error_detail().map(str::to_string),
            },
            JobStatus::Completed => ResultsView::Completed {
                file_name,
                duration,
                segments: job.segments.iter().map(SegmentBlock::from_segment).collect(),
            },
        }
    }

    /// Whether the view can no longer change by polling.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ResultsView::Failed { .. } | ResultsView::Completed { .. } | ResultsView::NoSelection
        )
    }
}
