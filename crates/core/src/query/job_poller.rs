use std::time::Duration;

use super::transcription_queries::TranscriptionQueries;
use crate::shared::constants::POLL_INTERVAL;
use crate::transcription::domain::api_error::ApiError;
use crate::transcription::domain::job::{JobStatus, TranscriptionJob};

/// Local view of one job as seen by a poller.
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    /// No job id to poll.
    Idle,
    /// First fetch has not settled yet.
    Loading,
    Ready(TranscriptionJob),
    /// The last fetch failed. `last` keeps the previous snapshot, if any.
    Error {
        error: ApiError,
        last: Option<TranscriptionJob>,
    },
}

impl PollState {
    pub fn job(&self) -> Option<&TranscriptionJob> {
        match self {
            PollState::Ready(job) => Some(job),
            PollState::Error { last, .. } => last.as_ref(),
            PollState::Idle | PollState::Loading => None,
        }
    }
}

/// Decides when the next fetch is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Delay before refetching a job last seen in `status`; `None` stops
    /// polling. Only `processing` keeps the poller running.
    pub fn next_delay(&self, status: JobStatus) -> Option<Duration> {
        match status {
            JobStatus::Processing => Some(self.interval),
            JobStatus::Pending | JobStatus::Completed | JobStatus::Failed => None,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(POLL_INTERVAL)
    }
}

/// Polling state machine for a single job.
///
/// Each [`JobPoller::poll_once`] issues exactly one fetch and reports when
/// the next one is due; scheduling is left to the caller so fetches for a job
/// never overlap.
pub struct JobPoller {
    queries: TranscriptionQueries,
    job_id: Option<String>,
    policy: PollPolicy,
    state: PollState,
}

impl JobPoller {
    pub fn new(queries: TranscriptionQueries, job_id: Option<&str>, policy: PollPolicy) -> Self {
        let job_id = job_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let state = match job_id {
            None => PollState::Idle,
            Some(ref id) => queries
                .cache()
                .job(id)
                .map(PollState::Ready)
                .unwrap_or(PollState::Loading),
        };
        Self {
            queries,
            job_id,
            policy,
            state,
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Fetches the job once and returns the delay before the next fetch, or
    /// `None` when polling should stop.
    ///
    /// A failed fetch keeps polling only if the last known snapshot was still
    /// processing.
    pub fn poll_once(&mut self) -> Option<Duration> {
        let Some(id) = self.job_id.clone() else {
            self.state = PollState::Idle;
            return None;
        };

        match self.queries.fetch_job(&id) {
            Ok(job) => {
                let next = self.policy.next_delay(job.status);
                if next.is_none() {
                    log::info!("transcription {id} is {}, polling stopped", job.status.as_str());
                }
                self.state = PollState::Ready(job);
                next
            }
            Err(error) => {
                let last = self.state.job().cloned();
                let next = last
                    .as_ref()
                    .and_then(|job| self.policy.next_delay(job.status));
                log::warn!("failed to fetch transcription {id}: {error}");
                self.state = PollState::Error { error, last };
                next
            }
        }
    }
}
