use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Uploads are transcribed inside the request, so the backend can hold a
/// connection open for a long time.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(900);

/// Refetch interval while a job is still processing.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// How long a fetched job list is served from cache before refetching.
pub const JOB_LIST_STALE_TIME: Duration = Duration::from_secs(30);

pub const DEFAULT_LANGUAGE: &str = "en";

/// `(label, code)` pairs offered for the language hint.
pub const LANGUAGE_OPTIONS: &[(&str, &str)] = &[
    ("English", "en"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
];

/// `(extension, media type)` pairs accepted for file uploads.
pub const SUPPORTED_MEDIA_TYPES: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("m4a", "audio/mp4"),
    ("flac", "audio/flac"),
    ("aac", "audio/aac"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
];

pub const TRANSCRIPTIONS_PATH: &str = "/api/transcriptions";
