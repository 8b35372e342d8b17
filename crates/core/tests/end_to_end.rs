use std::sync::Arc;
use std::time::Duration;

use transcribe_core::presentation::job_list_view::{JobListView, EMPTY_LIST_MESSAGE};
use transcribe_core::presentation::results_view::{ResultsView, NO_SEGMENTS_MESSAGE};
use transcribe_core::presentation::text_renderer::TextRenderer;
use transcribe_core::query::job_poller::{JobPoller, PollPolicy, PollState};
use transcribe_core::query::query_cache::QueryCache;
use transcribe_core::query::retry_policy::RetryPolicy;
use transcribe_core::query::transcription_queries::TranscriptionQueries;
use transcribe_core::transcription::domain::job::JobStatus;
use transcribe_core::transcription::domain::segment::Segment;
use transcribe_core::transcription::infrastructure::in_memory_transcription_api::InMemoryTranscriptionApi;
use transcribe_core::workflow::upload_request::upload_options;
use transcribe_core::workflow::upload_use_case::UploadUseCase;

const INTERVAL: Duration = Duration::from_millis(10);

fn setup() -> (Arc<InMemoryTranscriptionApi>, TranscriptionQueries) {
    let api = Arc::new(InMemoryTranscriptionApi::new());
    let queries = TranscriptionQueries::new(api.clone(), Arc::new(QueryCache::new()))
        .with_retry(RetryPolicy::none());
    (api, queries)
}

#[test]
fn upload_poll_and_render_completed_transcript() {
    let (api, queries) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interview.mp3");
    std::fs::write(&path, vec![7u8; 4096]).unwrap();

    let options = upload_options(Some("en"), true).unwrap();
    let id = UploadUseCase::new(queries.clone())
        .submit_file(&path, &options, None)
        .unwrap();
    assert!(!id.is_empty());

    let mut poller = JobPoller::new(queries.clone(), Some(&id), PollPolicy::new(INTERVAL));
    assert_eq!(poller.poll_once(), Some(INTERVAL));
    assert!(matches!(
        poller.state(),
        PollState::Ready(job) if job.status == JobStatus::Processing
    ));
    let processing = TextRenderer::new(false).render_results(&ResultsView::from_state(poller.state()));
    assert!(processing.contains("Processing Your Transcription"));

    api.complete(
        &id,
        vec![
            Segment::new("s1", 0.0, 4.25, "Thanks for joining us.").with_speaker("SPEAKER_00"),
            Segment::new("s2", 4.25, 61.5, "Happy to be here.").with_speaker("SPEAKER_01"),
        ],
    );
    assert_eq!(poller.poll_once(), None);

    let fetches = api.call_count("get_job");
    assert_eq!(fetches, 2);

    let view = ResultsView::from_state(poller.state());
    assert!(view.is_final());
    let text = TextRenderer::new(false).render_results(&view);
    let blocks: Vec<&str> = text.lines().filter(|l| l.starts_with('[')).collect();
    assert_eq!(
        blocks,
        vec![
            "[00:00.00 - 00:04.25] SPEAKER_00",
            "[00:04.25 - 01:01.50] SPEAKER_01",
        ]
    );
    assert!(text.contains("Thanks for joining us."));
    assert!(text.contains("Happy to be here."));
    assert!(!text.contains(NO_SEGMENTS_MESSAGE));
    assert!(text.contains("File: interview.mp3"));
}

#[test]
fn failed_job_stops_polling_and_shows_detail() {
    let (api, queries) = setup();
    let id = UploadUseCase::new(queries.clone())
        .submit_url("https://media.example.com/episode-12.mp3", &Default::default())
        .unwrap();
    api.fail(&id, Some("audio stream could not be decoded"));

    let mut poller = JobPoller::new(queries, Some(&id), PollPolicy::new(INTERVAL));
    assert_eq!(poller.poll_once(), None);

    let text = TextRenderer::new(false).render_results(&ResultsView::from_state(poller.state()));
    assert!(text.contains("Transcription Failed"));
    assert!(text.contains("audio stream could not be decoded"));
    assert!(!text.contains("Segments:"));
}

#[test]
fn invalid_url_never_reaches_the_service() {
    let (api, queries) = setup();
    let result = UploadUseCase::new(queries).submit_url("not-a-url", &Default::default());

    assert!(result.unwrap_err().is_local());
    assert_eq!(api.call_count("upload_url"), 0);
}

#[test]
fn empty_job_list_renders_empty_state() {
    let (_api, queries) = setup();
    let view = JobListView::from_result(&queries.list_jobs());
    assert_eq!(view, JobListView::Empty);

    let text = TextRenderer::new(false).render_job_list(&view);
    assert!(text.contains(EMPTY_LIST_MESSAGE));
}

#[test]
fn uploaded_job_appears_in_refreshed_list() {
    let (api, queries) = setup();
    assert_eq!(queries.list_jobs().unwrap().len(), 0);

    UploadUseCase::new(queries.clone())
        .submit_url("https://media.example.com/talk.wav", &Default::default())
        .unwrap();

    let jobs = queries.list_jobs().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].file_name, "talk.wav");
    assert_eq!(api.call_count("list_jobs"), 2);
}
