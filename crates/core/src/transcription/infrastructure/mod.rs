pub mod http_transcription_api;
pub mod in_memory_transcription_api;
pub mod progress_reader;
