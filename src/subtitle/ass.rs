// Advanced SubStation Alpha: only the [Events] Dialogue lines are read
use super::SubtitleEntry;
use crate::error::{Result, SubgifError};
use std::time::Duration;

const DEFAULT_FORMAT: &[&str] = &[
    "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
];

pub fn parse(contents: &str) -> Result<Vec<SubtitleEntry>> {
    let mut entries = Vec::new();
    let mut in_events = false;
    let mut format: Vec<String> = DEFAULT_FORMAT.iter().map(|s| s.to_string()).collect();

    for line in contents.lines() {
        let line = line.trim();

        if line.starts_with('[') {
            in_events = line.eq_ignore_ascii_case("[events]");
            continue;
        }
        if !in_events {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Format:") {
            format = rest.split(',').map(|f| f.trim().to_lowercase()).collect();
            continue;
        }

        let Some(rest) = line.strip_prefix("Dialogue:") else {
            continue;
        };

        let position = |name: &str| format.iter().position(|f| f == name);
        let (Some(start_at), Some(end_at), Some(text_at)) =
            (position("start"), position("end"), position("text"))
        else {
            return Err(SubgifError::SubtitleParse(
                "ASS Format line lacks Start, End or Text".to_string(),
            ));
        };

        // Text is always last and may itself contain commas
        let fields: Vec<&str> = rest.trim_start().splitn(format.len(), ',').collect();
        if fields.len() <= text_at.max(start_at).max(end_at) {
            continue;
        }

        let text = fields[text_at].replace("\\N", "\n").replace("\\n", "\n");
        if text.trim().is_empty() {
            continue;
        }

        entries.push(SubtitleEntry {
            index: entries.len(),
            start: parse_time(fields[start_at])?,
            end: parse_time(fields[end_at])?,
            text,
        });
    }

    Ok(entries)
}

/// `H:MM:SS.cc` (centiseconds).
fn parse_time(value: &str) -> Result<Duration> {
    let bad = || SubgifError::SubtitleParse(format!("Bad ASS timestamp: {value}"));

    let mut parts = value.trim().splitn(3, ':');
    let (Some(h), Some(m), Some(s)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(bad());
    };
    let (s, frac) = s.split_once('.').unwrap_or((s, "0"));
    if frac.is_empty() || frac.len() > 3 {
        return Err(bad());
    }

    let hours: u64 = h.parse().map_err(|_| bad())?;
    let minutes: u64 = m.parse().map_err(|_| bad())?;
    let seconds: u64 = s.parse().map_err(|_| bad())?;
    let millis = frac.parse::<u64>().map_err(|_| bad())? * 10u64.pow(3 - frac.len() as u32);
    if minutes >= 60 || seconds >= 60 {
        return Err(bad());
    }

    Ok(Duration::from_millis(
        ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis,
    ))
}
