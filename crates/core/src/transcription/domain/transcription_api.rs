use std::fmt;
use std::io::Read;
use std::str::FromStr;

use super::api_error::ApiError;
use super::job::{JobSummary, JobUpdate, TranscriptionJob};

/// Upload progress callback, called with a percentage in `0.0..=100.0`.
pub type ProgressFn = Box<dyn Fn(f64) + Send>;

/// Options sent alongside an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub language: Option<String>,
    pub detect_speakers: bool,
}

/// A local media file ready to be streamed to the service.
pub struct FilePayload {
    pub file_name: String,
    pub media_type: String,
    pub size: u64,
    pub reader: Box<dyn Read + Send>,
}

impl fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePayload")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Docx,
    Srt,
}

impl ExportFormat {
    pub const ALL: &[ExportFormat] = &[ExportFormat::Txt, ExportFormat::Docx, ExportFormat::Srt];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Docx => "docx",
            ExportFormat::Srt => "srt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" => Ok(ExportFormat::Txt),
            "docx" => Ok(ExportFormat::Docx),
            "srt" => Ok(ExportFormat::Srt),
            other => Err(format!(
                "unknown export format '{other}' (expected txt, docx or srt)"
            )),
        }
    }
}

/// Domain interface to the remote transcription service.
///
/// This is a port: the HTTP client is the production implementation, and the
/// in-memory implementation stands in for the service in tests.
pub trait TranscriptionApi: Send + Sync {
    fn upload_file(
        &self,
        payload: FilePayload,
        options: &UploadOptions,
        progress: Option<ProgressFn>,
    ) -> Result<TranscriptionJob, ApiError>;

    fn upload_url(&self, url: &str, options: &UploadOptions)
        -> Result<TranscriptionJob, ApiError>;

    fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError>;

    fn get_job(&self, id: &str) -> Result<TranscriptionJob, ApiError>;

    fn update_job(&self, id: &str, update: &JobUpdate) -> Result<TranscriptionJob, ApiError>;

    fn export_job(&self, id: &str, format: ExportFormat) -> Result<Vec<u8>, ApiError>;

    fn delete_job(&self, id: &str) -> Result<(), ApiError>;
}
