use std::collections::{HashMap, VecDeque};
use std::io::Read;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use super::progress_reader::ProgressReader;
use crate::shared::constants::DEFAULT_LANGUAGE;
use crate::transcription::domain::api_error::ApiError;
use crate::transcription::domain::job::{
    JobMetadata, JobStatus, JobSummary, JobUpdate, TranscriptionJob,
};
use crate::transcription::domain::segment::Segment;
use crate::transcription::domain::transcription_api::{
    ExportFormat, FilePayload, ProgressFn, TranscriptionApi, UploadOptions,
};

const UPLOAD_CHUNK_SIZE: usize = 8 * 1024;

#[derive(Default)]
struct State {
    jobs: Vec<TranscriptionJob>,
    scripted: HashMap<String, VecDeque<TranscriptionJob>>,
    fetch_failures: VecDeque<ApiError>,
    fetch_delay: Option<Duration>,
    calls: HashMap<&'static str, usize>,
    next_id: usize,
}

impl State {
    fn record(&mut self, op: &'static str) {
        *self.calls.entry(op).or_default() += 1;
    }

    fn position(&self, id: &str) -> Result<usize, ApiError> {
        self.jobs
            .iter()
            .position(|j| j.id == id)
            .ok_or_else(not_found)
    }

    fn insert(&mut self, job: TranscriptionJob) {
        match self.jobs.iter_mut().find(|j| j.id == job.id) {
            Some(existing) => *existing = job,
            None => self.jobs.push(job),
        }
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("job-{}", self.next_id)
    }
}

fn not_found() -> ApiError {
    ApiError::Http {
        status: 404,
        message: "Transcription not found".to_string(),
    }
}

/// Transcription service held entirely in memory.
///
/// Behaves like the remote service for every REST operation and adds hooks to
/// drive job state from the outside: scripted snapshots, status transitions,
/// injected fetch failures and per-operation call counters.
#[derive(Default)]
pub struct InMemoryTranscriptionApi {
    state: Mutex<State>,
}

impl InMemoryTranscriptionApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job(self, job: TranscriptionJob) -> Self {
        self.insert_job(job);
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_job(&self, job: TranscriptionJob) {
        self.state().insert(job);
    }

    pub fn job(&self, id: &str) -> Option<TranscriptionJob> {
        self.state().jobs.iter().find(|j| j.id == id).cloned()
    }

    pub fn set_status(&self, id: &str, status: JobStatus) {
        let mut state = self.state();
        if let Some(job) = state.jobs.iter_mut().find(|j| j.id == id) {
            job.status = status;
        }
    }

    /// Moves a job to `completed` with the given transcript.
    pub fn complete(&self, id: &str, segments: Vec<Segment>) {
        let mut state = self.state();
        if let Some(job) = state.jobs.iter_mut().find(|j| j.id == id) {
            job.status = JobStatus::Completed;
            job.segments = segments;
        }
    }

    /// Moves a job to `failed`, optionally recording a detail message.
    pub fn fail(&self, id: &str, detail: Option<&str>) {
        let mut state = self.state();
        if let Some(job) = state.jobs.iter_mut().find(|j| j.id == id) {
            job.status = JobStatus::Failed;
            if let Some(detail) = detail {
                job.metadata.get_or_insert_with(JobMetadata::default).error =
                    Some(detail.to_string());
            }
        }
    }

    /// Queues snapshots served, in order, by subsequent `get_job` calls for
    /// `id`. Each served snapshot becomes the stored job.
    pub fn script(&self, id: &str, snapshots: Vec<TranscriptionJob>) {
        self.state()
            .scripted
            .entry(id.to_string())
            .or_default()
            .extend(snapshots);
    }

    /// Makes the next `get_job` or `list_jobs` call fail with `err`.
    pub fn fail_next_fetch(&self, err: ApiError) {
        self.state().fetch_failures.push_back(err);
    }

    /// Delays every `get_job` and `list_jobs` call.
    pub fn set_fetch_delay(&self, delay: Duration) {
        self.state().fetch_delay = Some(delay);
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.state().calls.get(op).copied().unwrap_or(0)
    }

    fn begin_fetch(&self, op: &'static str) -> Result<(), ApiError> {
        let delay = {
            let mut state = self.state();
            state.record(op);
            if let Some(err) = state.fetch_failures.pop_front() {
                return Err(err);
            }
            state.fetch_delay
        };
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        Ok(())
    }
}

impl TranscriptionApi for InMemoryTranscriptionApi {
    fn upload_file(
        &self,
        payload: FilePayload,
        options: &UploadOptions,
        progress: Option<ProgressFn>,
    ) -> Result<TranscriptionJob, ApiError> {
        self.state().record("upload_file");

        let mut reader = ProgressReader::new(payload.reader, payload.size, progress);
        let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => return Err(ApiError::Transport(e.to_string())),
            }
        }
        if reader.bytes_read() != payload.size {
            return Err(ApiError::Transport(format!(
                "upload of {} ended after {} of {} bytes",
                payload.file_name,
                reader.bytes_read(),
                payload.size
            )));
        }

        let mut state = self.state();
        let id = state.allocate_id();
        let mut job = TranscriptionJob::new(
            &id,
            JobStatus::Processing,
            &payload.file_name,
            &payload.media_type,
        );
        job.language = Some(
            options
                .language
                .clone()
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        );
        state.insert(job.clone());
        Ok(job)
    }

    fn upload_url(&self, url: &str, options: &UploadOptions) -> Result<TranscriptionJob, ApiError> {
        let mut state = self.state();
        state.record("upload_url");

        let id = state.allocate_id();
        let file_name = url.rsplit('/').next().unwrap_or(url);
        let mut job = TranscriptionJob::new(&id, JobStatus::Processing, file_name, "");
        job.language = Some(
            options
                .language
                .clone()
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        );
        job.metadata = Some(JobMetadata {
            source_url: Some(url.to_string()),
            ..Default::default()
        });
        state.insert(job.clone());
        Ok(job)
    }

    fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        self.begin_fetch("list_jobs")?;
        Ok(self.state().jobs.iter().map(TranscriptionJob::summary).collect())
    }

    fn get_job(&self, id: &str) -> Result<TranscriptionJob, ApiError> {
        self.begin_fetch("get_job")?;
        let mut state = self.state();
        let next = state.scripted.get_mut(id).and_then(VecDeque::pop_front);
        if let Some(snapshot) = next {
            state.insert(snapshot);
        }
        let idx = state.position(id)?;
        Ok(state.jobs[idx].clone())
    }

    fn update_job(&self, id: &str, update: &JobUpdate) -> Result<TranscriptionJob, ApiError> {
        let mut state = self.state();
        state.record("update_job");
        let idx = state.position(id)?;
        state.jobs[idx].segments = update.segments.clone();
        Ok(state.jobs[idx].clone())
    }

    fn export_job(&self, id: &str, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        let mut state = self.state();
        state.record("export_job");
        let idx = state.position(id)?;
        let job = &state.jobs[idx];
        let text = match format {
            ExportFormat::Srt => render_srt(&job.segments),
            ExportFormat::Txt | ExportFormat::Docx => render_txt(&job.segments),
        };
        Ok(text.into_bytes())
    }

    fn delete_job(&self, id: &str) -> Result<(), ApiError> {
        let mut state = self.state();
        state.record("delete_job");
        let idx = state.position(id)?;
        state.jobs.remove(idx);
        state.scripted.remove(id);
        Ok(())
    }
}

fn render_txt(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| match s.speaker.as_deref() {
            Some(speaker) if !speaker.is_empty() => format!("[{speaker}]: {}\n", s.text),
            _ => format!("{}\n", s.text),
        })
        .collect()
}

fn srt_time(seconds: f64) -> String {
    let ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = ms / 3_600_000;
    let mins = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    format!("{hours:02}:{mins:02}:{secs:02},{millis:03}")
}

fn render_srt(segments: &[Segment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{}\n{} --> {}\n{}\n\n",
                i + 1,
                srt_time(s.start_time),
                srt_time(s.end_time),
                s.text
            )
        })
        .collect()
}
