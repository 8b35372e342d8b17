pub mod infrastructure;
pub mod job_poller;
pub mod query_cache;
pub mod retry_policy;
pub mod transcription_queries;
