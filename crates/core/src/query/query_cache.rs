use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::transcription::domain::job::{JobSummary, TranscriptionJob};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    JobList,
    Job(String),
}

impl QueryKey {
    pub fn job(id: &str) -> Self {
        QueryKey::Job(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum CachedValue {
    JobList(Vec<JobSummary>),
    Job(TranscriptionJob),
}

struct Entry {
    value: CachedValue,
    fetched_at: Instant,
    invalidated: bool,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    in_flight: HashSet<QueryKey>,
}

/// Keyed store of server responses shared by every view.
///
/// Besides the entries themselves it tracks which keys have a fetch in
/// flight, so concurrent readers of one key share a single request.
pub struct QueryCache {
    inner: Mutex<Inner>,
    settled: Condvar,
}

/// Exclusive right to fetch one key; releases the key when dropped.
pub struct InFlightGuard<'a> {
    cache: &'a QueryCache,
    key: QueryKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.cache.inner().in_flight.remove(&self.key);
        self.cache.settled.notify_all();
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            settled: Condvar::new(),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn put(&self, key: QueryKey, value: CachedValue) {
        self.inner().entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    pub fn job(&self, id: &str) -> Option<TranscriptionJob> {
        match self.inner().entries.get(&QueryKey::job(id)) {
            Some(Entry {
                value: CachedValue::Job(job),
                ..
            }) => Some(job.clone()),
            _ => None,
        }
    }

    /// The cached job, only if it was stored at or after `since`.
    pub fn job_fetched_since(&self, id: &str, since: Instant) -> Option<TranscriptionJob> {
        match self.inner().entries.get(&QueryKey::job(id)) {
            Some(Entry {
                value: CachedValue::Job(job),
                fetched_at,
                ..
            }) if *fetched_at >= since => Some(job.clone()),
            _ => None,
        }
    }

    pub fn job_list(&self) -> Option<Vec<JobSummary>> {
        match self.inner().entries.get(&QueryKey::JobList) {
            Some(Entry {
                value: CachedValue::JobList(jobs),
                ..
            }) => Some(jobs.clone()),
            _ => None,
        }
    }

    /// Stores a job snapshot, replacing whatever was cached (last write wins).
    pub fn put_job(&self, job: TranscriptionJob) {
        self.put(QueryKey::job(&job.id), CachedValue::Job(job));
    }

    pub fn put_job_list(&self, jobs: Vec<JobSummary>) {
        self.put(QueryKey::JobList, CachedValue::JobList(jobs));
    }

    /// Whether `key` holds a value younger than `stale_time` that has not
    /// been invalidated.
    pub fn is_fresh(&self, key: &QueryKey, stale_time: Duration) -> bool {
        self.inner()
            .entries
            .get(key)
            .is_some_and(|e| !e.invalidated && e.fetched_at.elapsed() < stale_time)
    }

    /// Marks `key` stale; the value stays readable until the next fetch.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.inner().entries.get_mut(key) {
            entry.invalidated = true;
            log::info!("invalidated {key:?}");
        }
    }

    pub fn remove(&self, key: &QueryKey) {
        self.inner().entries.remove(key);
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner().in_flight.contains(key)
    }

    /// Claims the fetch of `key`.
    ///
    /// Returns a guard when no other fetch of `key` is in flight. Otherwise
    /// blocks until that fetch settles and returns `None`; the caller should
    /// then read the cache instead of issuing its own request.
    pub fn begin_fetch(&self, key: &QueryKey) -> Option<InFlightGuard<'_>> {
        let mut inner = self.inner();
        if inner.in_flight.insert(key.clone()) {
            return Some(InFlightGuard {
                cache: self,
                key: key.clone(),
            });
        }
        while inner.in_flight.contains(key) {
            inner = self
                .settled
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        None
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
