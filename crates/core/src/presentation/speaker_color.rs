/// Light background colors assigned to numbered speakers.
pub const SPEAKER_COLORS: [&str; 9] = [
    "#FFE6E6", // light red
    "#E6F7FF", // light blue
    "#FFF7E6", // light orange
    "#F0FFE6", // light green
    "#FFE6F7", // light pink
    "#E6FFFA", // light teal
    "#FFF0E6", // light peach
    "#F0E6FF", // light purple
    "#FFFAE6", // light yellow
];

/// Color for segments without a usable speaker label.
pub const DEFAULT_SPEAKER_COLOR: &str = "#F5F5F5";

/// Label the diarizer uses when it could not attribute a segment.
pub const UNKNOWN_SPEAKER: &str = "UNKNOWN";

/// Maps a speaker label to its display color.
///
/// Missing, blank and `UNKNOWN` labels get [`DEFAULT_SPEAKER_COLOR`]. Other
/// labels use their trailing number (`SPEAKER_03` → 3) modulo the palette
/// size; labels without a trailing number use the first palette entry.
pub fn speaker_color(speaker: Option<&str>) -> &'static str {
    match speaker {
        None => DEFAULT_SPEAKER_COLOR,
        Some(label) if label.trim().is_empty() || label == UNKNOWN_SPEAKER => {
            DEFAULT_SPEAKER_COLOR
        }
        Some(label) => SPEAKER_COLORS[palette_index(label)],
    }
}

fn palette_index(label: &str) -> usize {
    let digits_start = label
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);
    let Some(start) = digits_start else {
        return 0;
    };
    // Reduce digit by digit so arbitrarily long suffixes cannot overflow.
    label[start..].bytes().fold(0, |acc, b| {
        (acc * 10 + usize::from(b - b'0')) % SPEAKER_COLORS.len()
    })
}
