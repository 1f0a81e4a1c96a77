// Per-video metadata.json listing generated clips in clip-number order
use crate::clip::ClipMetadata;
use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "metadata.json";

/// Clip number encoded in the file name prefix (`000012-…` → 12).
pub fn clip_number(path: &str) -> Option<u64> {
    Path::new(path)
        .file_name()?
        .to_str()?
        .split('-')
        .next()?
        .parse()
        .ok()
}

pub fn sort_clips(clips: &mut [ClipMetadata]) {
    clips.sort_by_key(|c| clip_number(&c.path).unwrap_or(u64::MAX));
}

/// Sort `clips` and write them to `<dir>/metadata.json`, replacing any previous manifest.
pub fn write_manifest(dir: &Path, clips: &mut [ClipMetadata]) -> Result<PathBuf> {
    sort_clips(clips);

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    clips.serialize(&mut serializer)?;

    let path = dir.join(MANIFEST_FILE);
    fs::write(&path, buf)?;
    Ok(path)
}

pub fn read_manifest(dir: &Path) -> Result<Vec<ClipMetadata>> {
    let contents = fs::read_to_string(dir.join(MANIFEST_FILE))?;
    Ok(serde_json::from_str(&contents)?)
}
