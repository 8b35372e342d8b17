use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::progress_reader::ProgressReader;
use crate::shared::constants::{
    DEFAULT_API_URL, DEFAULT_LANGUAGE, REQUEST_TIMEOUT, TRANSCRIPTIONS_PATH,
};
use crate::transcription::domain::api_error::ApiError;
use crate::transcription::domain::job::{JobSummary, JobUpdate, TranscriptionJob};
use crate::transcription::domain::transcription_api::{
    ExportFormat, FilePayload, ProgressFn, TranscriptionApi, UploadOptions,
};

/// Connection settings for [`HttpTranscriptionApi`].
#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HttpApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[derive(Serialize)]
struct UrlUploadBody<'a> {
    url: &'a str,
    language: &'a str,
    detect_speakers: bool,
}

/// REST client for the transcription service.
pub struct HttpTranscriptionApi {
    client: Client,
    base_url: String,
}

impl HttpTranscriptionApi {
    pub fn new(config: HttpApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, TRANSCRIPTIONS_PATH, suffix)
    }

    fn job_url(&self, id: &str) -> String {
        self.collection_url(&format!("/{}", id.trim()))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);
        log::debug!("request failed with {status}: {err}");
        Err(err)
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.send(request)?
            .json::<T>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_decode() {
        ApiError::Decode(e.to_string())
    } else {
        ApiError::Transport(e.to_string())
    }
}

impl TranscriptionApi for HttpTranscriptionApi {
    fn upload_file(
        &self,
        payload: FilePayload,
        options: &UploadOptions,
        progress: Option<ProgressFn>,
    ) -> Result<TranscriptionJob, ApiError> {
        let FilePayload {
            file_name,
            media_type,
            size,
            reader,
        } = payload;
        log::debug!("uploading {file_name} ({size} bytes, {media_type})");

        let part = Part::reader_with_length(ProgressReader::new(reader, size, progress), size)
            .file_name(file_name)
            .mime_str(&media_type)
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let mut form = Form::new().part("file", part);
        if let Some(ref language) = options.language {
            form = form.text("language", language.clone());
        }
        if options.detect_speakers {
            form = form.text("detect_speakers", "true");
        }

        self.send_json(self.client.post(self.collection_url("/upload")).multipart(form))
    }

    fn upload_url(&self, url: &str, options: &UploadOptions) -> Result<TranscriptionJob, ApiError> {
        let body = UrlUploadBody {
            url,
            language: options.language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
            detect_speakers: options.detect_speakers,
        };
        self.send_json(self.client.post(self.collection_url("/upload-url")).json(&body))
    }

    fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        self.send_json(self.client.get(self.collection_url("")))
    }

    fn get_job(&self, id: &str) -> Result<TranscriptionJob, ApiError> {
        self.send_json(self.client.get(self.job_url(id)))
    }

    fn update_job(&self, id: &str, update: &JobUpdate) -> Result<TranscriptionJob, ApiError> {
        self.send_json(self.client.patch(self.job_url(id)).json(update))
    }

    fn export_job(&self, id: &str, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        let url = format!("{}/export?format={}", self.job_url(id), format.as_str());
        let bytes = self
            .send(self.client.get(url))?
            .bytes()
            .map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }

    fn delete_job(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.client.delete(self.job_url(id)))?;
        Ok(())
    }
}
