use crate::config::Config;
use crate::error::{Result, SubgifError};
use crate::subtitle::{srt, strip_tags, SubtitleEntry};
use crate::transcode::{build_clip_args, ClipRequest, Transcoder};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, error};

/// Longest slug kept in a clip file name.
const MAX_SLUG_CHARS: usize = 100;

/// One generated clip as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipMetadata {
    /// Original caption text, markup included.
    pub text: String,
    pub path: String,
}

impl ClipMetadata {
    fn new(text: &str, path: &Path) -> Self {
        Self {
            text: text.to_string(),
            path: path.to_string_lossy().to_string(),
        }
    }
}

/// Turn caption text into a file-name-safe slug of lowercase ASCII letters,
/// digits and single dashes. Anything else separates words.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len().min(MAX_SLUG_CHARS));
    let mut pending_dash = false;

    for c in text.chars().filter(|c| *c != '\'' && *c != '\u{2019}') {
        if c.is_ascii_alphanumeric() {
            if slug.len() >= MAX_SLUG_CHARS {
                break;
            }
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(MAX_SLUG_CHARS);
    slug.truncate(slug.trim_end_matches('-').len());
    slug
}

/// `000042-some-caption.gif`
pub fn clip_file_name(index: usize, text: &str) -> String {
    format!("{:06}-{}.gif", index, slugify(text))
}

fn escape_caption(text: &str) -> String {
    text.replace('"', "\\\"")
}

async fn non_empty_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Create the single-caption subtitle file next to the clip. It is deleted
/// when the returned handle drops.
async fn write_fragment_file(
    output_dir: &Path,
    index: usize,
    duration: Duration,
    caption: String,
) -> Result<NamedTempFile> {
    let output_dir = output_dir.to_path_buf();
    let created = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        let mut fragment = tempfile::Builder::new()
            .prefix(&format!("temp_sub_{index}_"))
            .suffix(".srt")
            .tempfile_in(&output_dir)?;
        srt::write_fragment(&mut fragment, duration, &caption)?;
        fragment.flush()?;
        Ok(fragment)
    })
    .await
    .map_err(|e| SubgifError::Transcode(format!("Fragment task failed: {e}")))?;

    created.map_err(|e| {
        SubgifError::Transcode(format!("Error writing temporary subtitle file: {e}"))
    })
}

/// Cuts one GIF per subtitle entry through a [`Transcoder`].
#[derive(Clone)]
pub struct ClipGenerator {
    transcoder: Arc<dyn Transcoder>,
    config: Arc<Config>,
}

impl ClipGenerator {
    pub fn new(transcoder: Arc<dyn Transcoder>, config: Arc<Config>) -> Self {
        Self { transcoder, config }
    }

    /// Generate the clip for `entry`, logging failures instead of returning them.
    pub async fn generate(
        &self,
        entry: &SubtitleEntry,
        video: &Path,
        output_dir: &Path,
    ) -> Option<ClipMetadata> {
        match self.try_generate(entry, video, output_dir).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                error!("Error generating GIF for subtitle {}: {}", entry.index, e);
                None
            }
        }
    }

    /// Generate the clip for `entry`.
    ///
    /// An existing non-empty clip is reused without running the transcoder.
    /// The temporary caption file is removed on every path out of this call.
    pub async fn try_generate(
        &self,
        entry: &SubtitleEntry,
        video: &Path,
        output_dir: &Path,
    ) -> Result<ClipMetadata> {
        let text = strip_tags(&entry.text);
        let output: PathBuf = output_dir.join(clip_file_name(entry.index, &text));

        if non_empty_file(&output).await {
            debug!("Subtitle {} already rendered, skipping", entry.index);
            return Ok(ClipMetadata::new(&entry.text, &output));
        }

        let duration = entry.duration();

        let fragment =
            write_fragment_file(output_dir, entry.index, duration, escape_caption(&text)).await?;

        let request = ClipRequest {
            video,
            fragment: fragment.path(),
            output: &output,
            start: entry.start,
            duration,
        };
        let args = build_clip_args(&request, &self.config);
        debug!("Subtitle {}: {} {:?}", entry.index, self.transcoder.name(), args);

        let result = self.transcoder.run(&args).await?;
        if !result.success {
            let code = result
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(SubgifError::Transcode(format!(
                "{} exited with {}: {}",
                self.transcoder.name(),
                code,
                result.stderr
            )));
        }

        if !non_empty_file(&output).await {
            return Err(SubgifError::EmptyOutput(output.display().to_string()));
        }

        Ok(ClipMetadata::new(&entry.text, &output))
    }
}
