use std::fmt::Write;

use super::job_list_view::{JobListView, EMPTY_LIST_MESSAGE, LIST_ERROR_MESSAGE, LIST_TITLE};
use super::results_view::{
    ResultsView, SegmentBlock, FAILED_HINT, FAILED_TITLE, LOAD_ERROR_MESSAGE,
    NO_SEGMENTS_MESSAGE, NO_SELECTION_MESSAGE, PENDING_MESSAGE, PROCESSING_HINT,
    PROCESSING_TITLE,
};
use super::status_badge::{status_badge, Severity, StatusBadge};
use crate::transcription::domain::job::JobStatus;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const SEGMENT_TEXT_FG: &str = "\x1b[38;2;33;33;33m";

pub const UPLOAD_DONE_MESSAGE: &str = "Processing your audio... this may take a few minutes";

/// Renders views as terminal text, with optional ANSI styling.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render_results(&self, view: &ResultsView) -> String {
        let mut out = String::new();
        match view {
            ResultsView::NoSelection => line(&mut out, NO_SELECTION_MESSAGE),
            ResultsView::Loading => line(&mut out, "Loading transcription..."),
            ResultsView::LoadError { detail } => {
                line(&mut out, &self.paint(LOAD_ERROR_MESSAGE, Severity::Danger));
                line(&mut out, &self.dim(detail));
            }
            ResultsView::Pending { file_name } => {
                self.header(&mut out, file_name, None, &status_badge(JobStatus::Pending));
                line(&mut out, PENDING_MESSAGE);
            }
            ResultsView::Processing {
                file_name,
                duration,
            } => {
                let badge = status_badge(JobStatus::Processing);
                self.header(&mut out, file_name, Some(duration), &badge);
                line(&mut out, &self.bold(PROCESSING_TITLE));
                line(&mut out, PROCESSING_HINT);
            }
            ResultsView::Failed { file_name, detail } => {
                self.header(&mut out, file_name, None, &status_badge(JobStatus::Failed));
                line(&mut out, &self.paint(FAILED_TITLE, Severity::Danger));
                line(&mut out, detail.as_deref().unwrap_or(FAILED_HINT));
            }
            ResultsView::Completed {
                file_name,
                duration,
                segments,
            } => {
                let badge = status_badge(JobStatus::Completed);
                self.header(&mut out, file_name, Some(duration), &badge);
                line(&mut out, &self.bold("Segments:"));
                if segments.is_empty() {
                    line(&mut out, NO_SEGMENTS_MESSAGE);
                }
                for block in segments {
                    out.push('\n');
                    self.segment(&mut out, block);
                }
            }
        }
        out
    }

    pub fn render_job_list(&self, view: &JobListView) -> String {
        let mut out = String::new();
        line(&mut out, &self.bold(LIST_TITLE));
        match view {
            JobListView::Loading => line(&mut out, "Loading transcriptions..."),
            JobListView::Error { detail } => {
                line(&mut out, &self.paint(LIST_ERROR_MESSAGE, Severity::Danger));
                line(&mut out, &self.dim(detail));
            }
            JobListView::Empty => line(&mut out, EMPTY_LIST_MESSAGE),
            JobListView::Rows(rows) => {
                let id_w = column_width("ID", rows.iter().map(|r| r.id.as_str()));
                let name_w = column_width("File Name", rows.iter().map(|r| r.file_name.as_str()));
                let status_w = column_width("Status", rows.iter().map(|r| r.badge.label)) + 2;

                let _ = writeln!(
                    out,
                    "{:<id_w$}  {:<name_w$}  {:<status_w$}  Duration",
                    "ID", "File Name", "Status"
                );
                for row in rows {
                    let status = format!("{} {}", row.badge.icon, row.badge.label);
                    let padded = format!("{status:<status_w$}");
                    let _ = writeln!(
                        out,
                        "{:<id_w$}  {:<name_w$}  {}  {}",
                        row.id,
                        row.file_name,
                        self.paint(&padded, row.badge.severity),
                        row.duration
                    );
                }
            }
        }
        out
    }

    /// Progress line for an upload; 100% switches to the server-side notice.
    pub fn render_upload_progress(&self, percent: f64) -> String {
        if percent >= 100.0 {
            UPLOAD_DONE_MESSAGE.to_string()
        } else {
            format!("Uploading... {}%", percent.clamp(0.0, 100.0).floor() as u32)
        }
    }

    fn header(
        &self,
        out: &mut String,
        file_name: &str,
        duration: Option<&String>,
        badge: &StatusBadge,
    ) {
        line(out, &self.bold("Transcription Results"));
        line(out, &format!("File: {file_name}"));
        if let Some(duration) = duration {
            line(out, &format!("Duration: {duration}"));
        }
        line(out, &format!("Status: {}", self.paint(badge.label, badge.severity)));
    }

    fn segment(&self, out: &mut String, block: &SegmentBlock) {
        let _ = write!(out, "[{}]", block.time_range);
        if let Some(speaker) = &block.speaker {
            let _ = write!(out, " {}", self.bold(speaker));
        }
        out.push('\n');
        if self.color {
            let (r, g, b) = hex_to_rgb(block.color);
            let _ = writeln!(
                out,
                "\x1b[48;2;{r};{g};{b}m{SEGMENT_TEXT_FG} {} {RESET}",
                block.text
            );
        } else {
            line(out, &block.text);
        }
    }

    fn paint(&self, text: &str, severity: Severity) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = match severity {
            Severity::Secondary => "90",
            Severity::Info => "36",
            Severity::Success => "32",
            Severity::Danger => "31",
        };
        format!("\x1b[{code}m{text}{RESET}")
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            format!("{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            format!("{DIM}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn column_width<'a>(title: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(title.len()))
        .max()
        .unwrap_or(0)
}

/// Parses `#RRGGBB`; anything else maps to white.
fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return (255, 255, 255);
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(255);
    (channel(0), channel(2), channel(4))
}
