use std::path::Path;

use reqwest::Url;

use super::workflow_error::ValidationError;
use crate::shared::constants::{LANGUAGE_OPTIONS, SUPPORTED_MEDIA_TYPES};
use crate::transcription::domain::transcription_api::UploadOptions;

/// Checks a user-entered media URL.
///
/// The input must be a syntactically valid absolute URL. Returns the trimmed
/// URL to submit.
pub fn validate_url(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    Url::parse(trimmed)
        .map(|_| trimmed.to_string())
        .map_err(|e| ValidationError::InvalidUrl(e.to_string()))
}

/// Media type for an upload, derived from the file extension.
pub fn media_type_for(path: &Path) -> Result<&'static str, ValidationError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    SUPPORTED_MEDIA_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, media_type)| *media_type)
        .ok_or(ValidationError::UnsupportedMediaType(ext))
}

/// Builds upload options, accepting only the offered language codes.
pub fn upload_options(
    language: Option<&str>,
    detect_speakers: bool,
) -> Result<UploadOptions, ValidationError> {
    let language = match language.map(str::trim).filter(|l| !l.is_empty()) {
        None => None,
        Some(code) => {
            let code = code.to_ascii_lowercase();
            if !LANGUAGE_OPTIONS.iter().any(|(_, known)| *known == code) {
                return Err(ValidationError::UnsupportedLanguage(code));
            }
            Some(code)
        }
    };
    Ok(UploadOptions {
        language,
        detect_speakers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case::https("https://example.com/audio.mp3")]
    #[case::http_with_port("http://localhost:8080/a.wav")]
    #[case::padded("  https://example.com/a.mp3  ")]
    #[case::other_scheme("ftp://files.example.com/talk.ogg")]
    fn test_valid_urls(#[case] input: &str) {
        assert_eq!(validate_url(input).unwrap(), input.trim());
    }

    #[rstest]
    #[case::plain_word("not-a-url")]
    #[case::relative("/media/a.mp3")]
    #[case::missing_scheme("example.com/a.mp3")]
    fn test_invalid_urls(#[case] input: &str) {
        assert!(matches!(validate_url(input), Err(ValidationError::InvalidUrl(_))));
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn test_empty_url(#[case] input: &str) {
        assert_eq!(validate_url(input), Err(ValidationError::EmptyUrl));
    }

    #[rstest]
    #[case::mp3("talk.mp3", "audio/mpeg")]
    #[case::upper_case("TALK.WAV", "audio/wav")]
    #[case::m4a("memo.m4a", "audio/mp4")]
    #[case::mkv("movie.mkv", "video/x-matroska")]
    #[case::mov("clip.MOV", "video/quicktime")]
    fn test_media_type_for(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(media_type_for(&PathBuf::from(name)).unwrap(), expected);
    }

    #[rstest]
    #[case::document("notes.pdf")]
    #[case::no_extension("README")]
    fn test_unsupported_media(#[case] name: &str) {
        assert!(matches!(
            media_type_for(&PathBuf::from(name)),
            Err(ValidationError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn test_upload_options() {
        let options = upload_options(Some("FR"), true).unwrap();
        assert_eq!(options.language.as_deref(), Some("fr"));
        assert!(options.detect_speakers);

        assert_eq!(upload_options(None, false).unwrap(), UploadOptions::default());
        assert_eq!(upload_options(Some(" "), false).unwrap().language, None);
        assert_eq!(
            upload_options(Some("xx"), false),
            Err(ValidationError::UnsupportedLanguage("xx".into()))
        );
    }
}
