/// Formats a time offset in seconds as `MM:SS.ss`.
///
/// Minutes are zero-padded to two digits and never roll over into an hours
/// field: one hour and one second renders as `61:01.00`. Negative and
/// non-finite inputs are treated as zero.
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = seconds % 60.0;
    format!("{minutes:02}:{secs:05.2}")
}

/// Formats a `start - end` range with [`format_time`].
pub fn format_time_range(start: f64, end: f64) -> String {
    format!("{} - {}", format_time(start), format_time(end))
}
