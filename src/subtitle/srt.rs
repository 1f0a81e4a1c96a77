// SubRip reading and the single-caption fragments handed to FFmpeg
use super::SubtitleEntry;
use crate::error::{Result, SubgifError};
use regex::Regex;
use std::io::Write;
use std::sync::LazyLock;
use std::time::Duration;

static TIMING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d+):(\d{2}):(\d{2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{1,3})",
    )
    .expect("valid timing regex")
});

/// Parse SubRip text into entries, numbered in file order from 0.
pub fn parse(contents: &str) -> Result<Vec<SubtitleEntry>> {
    let normalized = contents.replace("\r\n", "\n");
    let mut entries = Vec::new();

    for block in normalized.split("\n\n") {
        let mut lines = block.lines().map(str::trim_end).skip_while(|l| l.trim().is_empty());

        let Some(mut first) = lines.next() else {
            continue;
        };
        // Counter line is optional
        if !first.contains("-->") {
            match lines.next() {
                Some(next) => first = next,
                None => continue,
            }
        }

        let Some(caps) = TIMING_REGEX.captures(first.trim()) else {
            continue;
        };
        let start = timestamp_from(&caps, 1)?;
        let end = timestamp_from(&caps, 5)?;

        let text = lines.collect::<Vec<_>>().join("\n");
        if text.trim().is_empty() {
            continue;
        }

        entries.push(SubtitleEntry {
            index: entries.len(),
            start,
            end,
            text,
        });
    }

    Ok(entries)
}

fn timestamp_from(caps: &regex::Captures, first: usize) -> Result<Duration> {
    let field = |i: usize| -> Result<u64> {
        caps[first + i]
            .parse::<u64>()
            .map_err(|e| SubgifError::SubtitleParse(format!("Bad timestamp field: {e}")))
    };
    let hours = field(0)?;
    let minutes = field(1)?;
    let seconds = field(2)?;
    // "5" and "500" both mean half a second
    let frac = &caps[first + 3];
    let millis = field(3)? * 10u64.pow(3 - frac.len() as u32);

    if minutes >= 60 || seconds >= 60 {
        return Err(SubgifError::SubtitleParse(format!(
            "Timestamp out of range: {}",
            &caps[0]
        )));
    }

    Ok(Duration::from_millis(
        ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis,
    ))
}

pub fn format_timestamp(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Write a one-entry SubRip document showing `text` from zero to `duration`.
pub fn write_fragment<W: Write>(writer: &mut W, duration: Duration, text: &str) -> std::io::Result<()> {
    write!(
        writer,
        "1\n{} --> {}\n{}\n",
        format_timestamp(Duration::ZERO),
        format_timestamp(duration),
        text
    )
}
