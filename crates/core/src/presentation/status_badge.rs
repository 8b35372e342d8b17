use crate::transcription::domain::job::JobStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Secondary,
    Info,
    Success,
    Danger,
}

/// How a job status is shown in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub severity: Severity,
    pub icon: &'static str,
}

pub fn status_badge(status: JobStatus) -> StatusBadge {
    match status {
        JobStatus::Pending => StatusBadge {
            label: "Pending",
            severity: Severity::Secondary,
            icon: "◷",
        },
        JobStatus::Processing => StatusBadge {
            label: "Processing",
            severity: Severity::Info,
            icon: "⟳",
        },
        JobStatus::Completed => StatusBadge {
            label: "Completed",
            severity: Severity::Success,
            icon: "✓",
        },
        JobStatus::Failed => StatusBadge {
            label: "Failed",
            severity: Severity::Danger,
            icon: "✗",
        },
    }
}
