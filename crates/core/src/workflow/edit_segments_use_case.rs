use std::str::FromStr;

use super::workflow_error::{ValidationError, WorkflowError};
use crate::query::transcription_queries::TranscriptionQueries;
use crate::transcription::domain::job::{JobStatus, JobUpdate, TranscriptionJob};

/// Replacement text for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentEdit {
    pub segment_id: String,
    pub text: String,
}

impl FromStr for SegmentEdit {
    type Err = ValidationError;

    /// Parses `SEGMENT_ID=TEXT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((id, text)) if !id.trim().is_empty() => Ok(SegmentEdit {
                segment_id: id.trim().to_string(),
                text: text.to_string(),
            }),
            _ => Err(ValidationError::MalformedEdit(s.to_string())),
        }
    }
}

/// Edits segment text of a completed transcription.
///
/// The full segment list is sent back to the service and the response
/// replaces the cached job.
pub struct EditSegmentsUseCase {
    queries: TranscriptionQueries,
}

impl EditSegmentsUseCase {
    pub fn new(queries: TranscriptionQueries) -> Self {
        Self { queries }
    }

    pub fn execute(
        &self,
        job_id: &str,
        edits: &[SegmentEdit],
    ) -> Result<TranscriptionJob, WorkflowError> {
        if edits.is_empty() {
            return Err(ValidationError::NoEdits.into());
        }

        let job = self.queries.fetch_job(job_id)?;
        if job.status != JobStatus::Completed {
            return Err(ValidationError::NotCompleted(job_id.to_string()).into());
        }

        let mut segments = job.segments;
        for edit in edits {
            let segment = segments
                .iter_mut()
                .find(|s| s.id == edit.segment_id)
                .ok_or_else(|| ValidationError::UnknownSegment(edit.segment_id.clone()))?;
            segment.text = edit.text.clone();
        }

        let updated = self.queries.update_job(job_id, &JobUpdate { segments })?;
        log::info!("updated {} segment(s) of transcription {job_id}", edits.len());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::query_cache::QueryCache;
    use crate::transcription::domain::segment::Segment;
    use crate::transcription::infrastructure::in_memory_transcription_api::InMemoryTranscriptionApi;
    use rstest::rstest;
    use std::sync::Arc;

    fn completed_job() -> TranscriptionJob {
        let mut job = TranscriptionJob::new("a", JobStatus::Completed, "talk.mp3", "audio/mpeg");
        job.segments = vec![
            Segment::new("s1", 0.0, 1.0, "helo").with_speaker("SPEAKER_00"),
            Segment::new("s2", 1.0, 2.0, "world").with_speaker("SPEAKER_01"),
        ];
        job
    }

    fn setup(job: TranscriptionJob) -> (Arc<InMemoryTranscriptionApi>, Arc<QueryCache>, EditSegmentsUseCase) {
        let api = Arc::new(InMemoryTranscriptionApi::new().with_job(job));
        let cache = Arc::new(QueryCache::new());
        let use_case = EditSegmentsUseCase::new(TranscriptionQueries::new(api.clone(), cache.clone()));
        (api, cache, use_case)
    }

    fn edit(id: &str, text: &str) -> SegmentEdit {
        SegmentEdit {
            segment_id: id.into(),
            text: text.into(),
        }
    }

    #[rstest]
    #[case::simple("s1=hello", "s1", "hello")]
    #[case::text_with_equals("s1=a=b", "s1", "a=b")]
    #[case::empty_text("s2=", "s2", "")]
    #[case::padded_id(" s3 =hi", "s3", "hi")]
    fn test_parse_edit(#[case] input: &str, #[case] id: &str, #[case] text: &str) {
        assert_eq!(input.parse::<SegmentEdit>().unwrap(), edit(id, text));
    }

    #[rstest]
    #[case::no_separator("s1 hello")]
    #[case::no_id("=hello")]
    fn test_parse_malformed_edit(#[case] input: &str) {
        assert!(matches!(
            input.parse::<SegmentEdit>(),
            Err(ValidationError::MalformedEdit(_))
        ));
    }

    #[test]
    fn test_edit_updates_text_and_cache() {
        let (api, cache, use_case) = setup(completed_job());

        let updated = use_case.execute("a", &[edit("s1", "hello")]).unwrap();

        assert_eq!(updated.segments[0].text, "hello");
        assert_eq!(updated.segments[1].text, "world");
        assert_eq!(updated.segments[0].speaker.as_deref(), Some("SPEAKER_00"));
        assert_eq!(cache.job("a").unwrap().segments[0].text, "hello");
        assert_eq!(api.job("a").unwrap().segments[0].text, "hello");
    }

    #[test]
    fn test_unknown_segment_is_rejected_before_update() {
        let (api, _, use_case) = setup(completed_job());
        let err = use_case.execute("a", &[edit("s9", "x")]).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::UnknownSegment(ref id)) if id == "s9"
        ));
        assert_eq!(api.call_count("update_job"), 0);
    }

    #[test]
    fn test_processing_job_cannot_be_edited() {
        let (api, _, use_case) = setup(TranscriptionJob::new(
            "a",
            JobStatus::Processing,
            "talk.mp3",
            "audio/mpeg",
        ));
        let err = use_case.execute("a", &[edit("s1", "x")]).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(ValidationError::NotCompleted(_))));
        assert_eq!(api.call_count("update_job"), 0);
    }

    #[test]
    fn test_no_edits_is_rejected_without_requests() {
        let (api, _, use_case) = setup(completed_job());
        let err = use_case.execute("a", &[]).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(ValidationError::NoEdits)));
        assert_eq!(api.call_count("get_job"), 0);
    }
}
