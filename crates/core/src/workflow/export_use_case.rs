use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::workflow_error::WorkflowError;
use crate::query::transcription_queries::TranscriptionQueries;
use crate::transcription::domain::transcription_api::ExportFormat;

/// Downloads a transcript export and writes it to disk.
pub struct ExportUseCase {
    queries: TranscriptionQueries,
}

impl ExportUseCase {
    pub fn new(queries: TranscriptionQueries) -> Self {
        Self { queries }
    }

    pub fn execute(
        &self,
        job_id: &str,
        format: ExportFormat,
        output: &Path,
    ) -> Result<u64, WorkflowError> {
        let bytes = self.queries.export_job(job_id, format)?;
        write_atomic(output, &bytes)?;
        log::info!("exported transcription {job_id} as {format} to {}", output.display());
        Ok(bytes.len() as u64)
    }
}

/// `<stem of file_name>.<format>`, falling back to the job id when the
/// file name is empty.
pub fn default_export_path(file_name: &str, job_id: &str, format: ExportFormat) -> PathBuf {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| job_id.to_string());
    PathBuf::from(format!("{stem}.{}", format.as_str()))
}

fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), WorkflowError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| WorkflowError::Io { path, source }
    };

    // Write to a temp file first, then rename for atomicity
    let mut temp_name = dest.as_os_str().to_owned();
    temp_name.push(".part");
    let temp_path = PathBuf::from(temp_name);

    let mut file = fs::File::create(&temp_path).map_err(io_err(&temp_path))?;
    file.write_all(bytes).map_err(io_err(&temp_path))?;
    file.flush().map_err(io_err(&temp_path))?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(io_err(dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::query_cache::QueryCache;
    use crate::transcription::domain::job::{JobStatus, TranscriptionJob};
    use crate::transcription::domain::segment::Segment;
    use crate::transcription::infrastructure::in_memory_transcription_api::InMemoryTranscriptionApi;
    use rstest::rstest;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn use_case() -> ExportUseCase {
        let mut job = TranscriptionJob::new("a", JobStatus::Completed, "talk.mp3", "audio/mpeg");
        job.segments = vec![Segment::new("s1", 0.0, 1.0, "Hello")];
        let api = Arc::new(InMemoryTranscriptionApi::new().with_job(job));
        ExportUseCase::new(TranscriptionQueries::new(api, Arc::new(QueryCache::new())))
    }

    #[test]
    fn test_export_writes_file() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("talk.srt");

        let written = use_case().execute("a", ExportFormat::Srt, &dest).unwrap();

        let content = fs::read_to_string(&dest).unwrap();
        assert_eq!(written, content.len() as u64);
        assert!(content.contains("00:00:00,000 --> 00:00:01,000"));
        assert!(!tmp.path().join("talk.srt.part").exists());
    }

    #[test]
    fn test_export_of_missing_job_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("missing.txt");

        let err = use_case().execute("missing", ExportFormat::Txt, &dest).unwrap_err();
        assert!(matches!(err, WorkflowError::Api(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn test_export_into_missing_directory_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("nope").join("talk.txt");
        let err = use_case().execute("a", ExportFormat::Txt, &dest).unwrap_err();
        assert!(matches!(err, WorkflowError::Io { .. }));
    }

    #[rstest]
    #[case::audio("talk.mp3", ExportFormat::Srt, "talk.srt")]
    #[case::dotted("my.interview.wav", ExportFormat::Docx, "my.interview.docx")]
    #[case::empty("", ExportFormat::Txt, "job-7.txt")]
    fn test_default_export_path(
        #[case] file_name: &str,
        #[case] format: ExportFormat,
        #[case] expected: &str,
    ) {
        assert_eq!(
            default_export_path(file_name, "job-7", format),
            PathBuf::from(expected)
        );
    }
}
