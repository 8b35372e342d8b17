pub mod presentation;
pub mod query;
pub mod shared;
pub mod transcription;
pub mod workflow;
