pub mod ass;
pub mod srt;

use crate::error::{Result, SubgifError};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>|\{.*?\}").expect("valid tag regex"));

/// One caption read from a subtitle file. `text` keeps its original markup.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

impl SubtitleEntry {
    /// Display time of this caption.
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

/// Remove HTML-like (`<i>`) and brace (`{\an8}`) tags and surrounding whitespace.
pub fn strip_tags(text: &str) -> String {
    TAG_REGEX.replace_all(text, "").trim().to_string()
}

/// Parse a subtitle file, choosing the parser from its extension.
pub fn parse_file(path: &Path) -> Result<Vec<SubtitleEntry>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SubgifError::SubtitleParse(format!("Cannot read {}: {e}", path.display()))
    })?;
    let contents = contents.trim_start_matches('\u{feff}');

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "ass" | "ssa" => ass::parse(contents),
        _ => srt::parse(contents),
    }
}

/// Format as `HH:MM:SS.mmm`, the form FFmpeg accepts for `-ss` and `-t`.
pub fn format_ffmpeg_time(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
