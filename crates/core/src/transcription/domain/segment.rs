use serde::{Deserialize, Serialize};

/// One time-bounded, speaker-attributed span of transcript text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    #[serde(alias = "startTime")]
    pub start_time: f64,
    #[serde(alias = "endTime")]
    pub end_time: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap_seconds: Option<f64>,
}

impl Segment {
    pub fn new(id: &str, start_time: f64, end_time: f64, text: &str) -> Self {
        Self {
            id: id.to_string(),
            start_time,
            end_time,
            text: text.to_string(),
            speaker: None,
            confidence: None,
            overlap_seconds: None,
        }
    }

    pub fn with_speaker(mut self, speaker: &str) -> Self {
        self.speaker = Some(speaker.to_string());
        self
    }

    /// Segment length in seconds; zero for a segment whose end precedes its start.
    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }
}
