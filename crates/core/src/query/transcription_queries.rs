use std::sync::Arc;
use std::time::{Duration, Instant};

use super::query_cache::{QueryCache, QueryKey};
use super::retry_policy::RetryPolicy;
use crate::shared::constants::JOB_LIST_STALE_TIME;
use crate::transcription::domain::api_error::ApiError;
use crate::transcription::domain::job::{JobSummary, JobUpdate, TranscriptionJob};
use crate::transcription::domain::transcription_api::{
    ExportFormat, FilePayload, ProgressFn, TranscriptionApi, UploadOptions,
};

/// Cached, deduplicated access to the transcription service.
///
/// Reads go through the [`QueryCache`] and are retried per the
/// [`RetryPolicy`]; mutations run once and apply the cache rules:
///
/// - upload: invalidate the job list, seed the new job
/// - edit: overwrite the job entry
/// - delete: drop the job entry, invalidate the job list
#[derive(Clone)]
pub struct TranscriptionQueries {
    api: Arc<dyn TranscriptionApi>,
    cache: Arc<QueryCache>,
    retry: RetryPolicy,
    list_stale_time: Duration,
}

impl TranscriptionQueries {
    pub fn new(api: Arc<dyn TranscriptionApi>, cache: Arc<QueryCache>) -> Self {
        Self {
            api,
            cache,
            retry: RetryPolicy::default(),
            list_stale_time: JOB_LIST_STALE_TIME,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_list_stale_time(mut self, stale_time: Duration) -> Self {
        self.list_stale_time = stale_time;
        self
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// All jobs, served from cache while the cached list is fresh.
    pub fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        let key = QueryKey::JobList;
        loop {
            if self.cache.is_fresh(&key, self.list_stale_time) {
                if let Some(jobs) = self.cache.job_list() {
                    return Ok(jobs);
                }
            }
            let Some(_guard) = self.cache.begin_fetch(&key) else {
                // Another fetch settled; re-check freshness.
                if let Some(jobs) = self.cache.job_list() {
                    if self.cache.is_fresh(&key, self.list_stale_time) {
                        return Ok(jobs);
                    }
                }
                continue;
            };
            log::debug!("fetching job list");
            let jobs = self.retry.run("list jobs", || self.api.list_jobs())?;
            self.cache.put_job_list(jobs.clone());
            return Ok(jobs);
        }
    }

    /// Fetches one job from the service.
    ///
    /// Concurrent callers for the same id share one request. A snapshot that
    /// would move a finished job back to an earlier status is discarded in
    /// favor of the cached one.
    pub fn fetch_job(&self, id: &str) -> Result<TranscriptionJob, ApiError> {
        let key = QueryKey::job(id);
        loop {
            let waited_from = Instant::now();
            let Some(_guard) = self.cache.begin_fetch(&key) else {
                if let Some(job) = self.cache.job_fetched_since(id, waited_from) {
                    return Ok(job);
                }
                continue;
            };
            log::debug!("fetching transcription {id}");
            let fetched = self.retry.run("fetch transcription", || self.api.get_job(id))?;
            return Ok(self.observe(fetched));
        }
    }

    fn observe(&self, fetched: TranscriptionJob) -> TranscriptionJob {
        if let Some(cached) = self.cache.job(&fetched.id) {
            if !cached.status.can_transition_to(fetched.status) {
                log::warn!(
                    "ignoring {} snapshot for transcription {}: already {}",
                    fetched.status.as_str(),
                    fetched.id,
                    cached.status.as_str()
                );
                // Re-store so callers waiting on this fetch can reuse it.
                self.cache.put_job(cached.clone());
                return cached;
            }
        }
        self.cache.put_job(fetched.clone());
        fetched
    }

    pub fn upload_file(
        &self,
        payload: FilePayload,
        options: &UploadOptions,
        progress: Option<ProgressFn>,
    ) -> Result<TranscriptionJob, ApiError> {
        let job = self.api.upload_file(payload, options, progress)?;
        self.after_upload(&job);
        Ok(job)
    }

    pub fn upload_url(
        &self,
        url: &str,
        options: &UploadOptions,
    ) -> Result<TranscriptionJob, ApiError> {
        let job = self.api.upload_url(url, options)?;
        self.after_upload(&job);
        Ok(job)
    }

    fn after_upload(&self, job: &TranscriptionJob) {
        log::info!("created transcription {} for {}", job.id, job.file_name);
        self.cache.invalidate(&QueryKey::JobList);
        self.cache.put_job(job.clone());
    }

    pub fn update_job(&self, id: &str, update: &JobUpdate) -> Result<TranscriptionJob, ApiError> {
        let job = self.api.update_job(id, update)?;
        self.cache.put_job(job.clone());
        Ok(job)
    }

    pub fn delete_job(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_job(id)?;
        self.cache.remove(&QueryKey::job(id));
        self.cache.invalidate(&QueryKey::JobList);
        log::info!("deleted transcription {id}");
        Ok(())
    }

    pub fn export_job(&self, id: &str, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        self.api.export_job(id, format)
    }
}
