use std::fs::{self, File};
use std::path::Path;

use super::upload_request::{media_type_for, validate_url};
use super::workflow_error::{ValidationError, WorkflowError};
use crate::query::transcription_queries::TranscriptionQueries;
use crate::transcription::domain::transcription_api::{FilePayload, ProgressFn, UploadOptions};

/// Submits new transcription jobs from a local file or a remote URL.
///
/// Input is validated locally first; nothing reaches the service unless it
/// passes. On success the new job id is returned and the cached job list is
/// invalidated.
pub struct UploadUseCase {
    queries: TranscriptionQueries,
}

impl UploadUseCase {
    pub fn new(queries: TranscriptionQueries) -> Self {
        Self { queries }
    }

    pub fn submit_file(
        &self,
        path: &Path,
        options: &UploadOptions,
        progress: Option<ProgressFn>,
    ) -> Result<String, WorkflowError> {
        let metadata = fs::metadata(path)
            .map_err(|_| ValidationError::FileNotFound(path.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(ValidationError::NotAFile(path.to_path_buf()).into());
        }
        if metadata.len() == 0 {
            return Err(ValidationError::EmptyFile(path.to_path_buf()).into());
        }
        let media_type = media_type_for(path)?;

        let file = File::open(path).map_err(|e| WorkflowError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let payload = FilePayload {
            file_name,
            media_type: media_type.to_string(),
            size: metadata.len(),
            reader: Box::new(file),
        };
        let job = self.queries.upload_file(payload, options, progress)?;
        Ok(job.id)
    }

    pub fn submit_url(&self, input: &str, options: &UploadOptions) -> Result<String, WorkflowError> {
        let url = validate_url(input)?;
        let job = self.queries.upload_url(&url, options)?;
        Ok(job.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::query_cache::{QueryCache, QueryKey};
    use crate::transcription::domain::api_error::ApiError;
    use crate::transcription::domain::job::{JobStatus, JobSummary, JobUpdate, TranscriptionJob};
    use crate::transcription::domain::transcription_api::{ExportFormat, TranscriptionApi};
    use crate::transcription::infrastructure::in_memory_transcription_api::InMemoryTranscriptionApi;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup() -> (Arc<InMemoryTranscriptionApi>, Arc<QueryCache>, UploadUseCase) {
        let api = Arc::new(InMemoryTranscriptionApi::new());
        let cache = Arc::new(QueryCache::new());
        let use_case = UploadUseCase::new(TranscriptionQueries::new(api.clone(), cache.clone()));
        (api, cache, use_case)
    }

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_submit_file_returns_job_id_and_reports_progress() {
        let (api, cache, use_case) = setup();
        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, "talk.mp3", &vec![0u8; 20_000]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress: ProgressFn = Box::new(move |pct| sink.lock().unwrap().push(pct));

        let id = use_case
            .submit_file(&path, &UploadOptions::default(), Some(progress))
            .unwrap();

        let job = api.job(&id).unwrap();
        assert_eq!(job.file_name, "talk.mp3");
        assert_eq!(job.file_type, "audio/mpeg");
        assert_eq!(cache.job(&id).unwrap().status, JobStatus::Processing);

        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|p| (0.0..=100.0).contains(p)));
        assert_eq!(*seen.last().unwrap(), 100.0);
    }

    #[test]
    fn test_missing_file_is_local_error() {
        let (api, _, use_case) = setup();
        let err = use_case
            .submit_file(Path::new("/definitely/not/here.mp3"), &UploadOptions::default(), None)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(ValidationError::FileNotFound(_))));
        assert_eq!(api.call_count("upload_file"), 0);
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let (api, _, use_case) = setup();
        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, "silence.wav", b"");

        let err = use_case.submit_file(&path, &UploadOptions::default(), None).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(ValidationError::EmptyFile(_))));
        assert_eq!(api.call_count("upload_file"), 0);
    }

    #[test]
    fn test_directory_is_rejected() {
        let (_, _, use_case) = setup();
        let tmp = TempDir::new().unwrap();
        let err = use_case
            .submit_file(tmp.path(), &UploadOptions::default(), None)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(ValidationError::NotAFile(_))));
    }

    #[test]
    fn test_non_media_file_is_rejected() {
        let (api, _, use_case) = setup();
        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, "notes.txt", b"hello");

        let err = use_case.submit_file(&path, &UploadOptions::default(), None).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::UnsupportedMediaType(_))
        ));
        assert_eq!(api.call_count("upload_file"), 0);
    }

    #[test]
    fn test_invalid_url_never_reaches_the_service() {
        let (api, _, use_case) = setup();
        let err = use_case
            .submit_url("not-a-url", &UploadOptions::default())
            .unwrap_err();

        assert!(err.is_local());
        assert!(matches!(err, WorkflowError::Validation(ValidationError::InvalidUrl(_))));
        assert_eq!(api.call_count("upload_url"), 0);
    }

    #[test]
    fn test_empty_url_never_reaches_the_service() {
        let (api, _, use_case) = setup();
        let err = use_case.submit_url("   ", &UploadOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a URL");
        assert_eq!(api.call_count("upload_url"), 0);
    }

    #[test]
    fn test_submit_url_returns_job_id() {
        let (api, _, use_case) = setup();
        let id = use_case
            .submit_url(" https://example.com/podcast.mp3 ", &UploadOptions::default())
            .unwrap();
        assert_eq!(api.job(&id).unwrap().file_name, "podcast.mp3");
        assert_eq!(api.call_count("upload_url"), 1);
    }

    struct FailingUploads;

    impl TranscriptionApi for FailingUploads {
        fn upload_file(
            &self,
            _: FilePayload,
            _: &UploadOptions,
            _: Option<ProgressFn>,
        ) -> Result<TranscriptionJob, ApiError> {
            Err(ApiError::from_response(400, r#"{"detail": "Unsupported file type"}"#))
        }

        fn upload_url(&self, _: &str, _: &UploadOptions) -> Result<TranscriptionJob, ApiError> {
            Err(ApiError::Transport("connection refused".into()))
        }

        fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
            Ok(Vec::new())
        }

        fn get_job(&self, _: &str) -> Result<TranscriptionJob, ApiError> {
            unreachable!()
        }

        fn update_job(&self, _: &str, _: &JobUpdate) -> Result<TranscriptionJob, ApiError> {
            unreachable!()
        }

        fn export_job(&self, _: &str, _: ExportFormat) -> Result<Vec<u8>, ApiError> {
            unreachable!()
        }

        fn delete_job(&self, _: &str) -> Result<(), ApiError> {
            unreachable!()
        }
    }

    #[test]
    fn test_backend_failure_surfaces_message_and_keeps_list() {
        let cache = Arc::new(QueryCache::new());
        cache.put_job_list(Vec::new());
        let use_case =
            UploadUseCase::new(TranscriptionQueries::new(Arc::new(FailingUploads), cache.clone()));

        let err = use_case
            .submit_url("https://example.com/a.mp3", &UploadOptions::default())
            .unwrap_err();
        assert!(!err.is_local());
        assert_eq!(err.to_string(), "connection refused");

        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, "a.wav", b"RIFF");
        let err = use_case.submit_file(&path, &UploadOptions::default(), None).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type");

        // A failed upload leaves the cached list untouched.
        assert!(cache.is_fresh(&QueryKey::JobList, Duration::from_secs(30)));
    }
}
