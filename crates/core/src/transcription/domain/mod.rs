pub mod api_error;
pub mod job;
pub mod segment;
pub mod transcription_api;
