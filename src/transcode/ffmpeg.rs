use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, SubgifError};
use crate::subtitle::format_ffmpeg_time;

use super::{TranscodeOutput, Transcoder};

/// Locate the transcoder binary on `PATH` (or at the given path).
pub fn check_transcoder(binary: &str) -> Result<PathBuf> {
    let path = which::which(binary).map_err(|e| {
        SubgifError::TranscoderNotFound(format!(
            "'{binary}' is not installed or not in your PATH. Install FFmpeg and make sure it is accessible. ({e})"
        ))
    })?;

    debug!("Using transcoder at {}", path.display());
    Ok(path)
}

/// Runs the real FFmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn run(&self, args: &[String]) -> Result<TranscodeOutput> {
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SubgifError::Transcode(format!("Failed to run FFmpeg: {e}")))?;

        Ok(TranscodeOutput {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "FFmpeg"
    }
}

/// Everything needed to cut one captioned clip.
#[derive(Debug, Clone)]
pub struct ClipRequest<'a> {
    pub video: &'a Path,
    /// Single-caption subtitle file burned into the clip.
    pub fragment: &'a Path,
    pub output: &'a Path,
    pub start: Duration,
    pub duration: Duration,
}

/// Path as the transcoder should see it: forward slashes on every platform,
/// since backslashes break the filter-graph syntax.
pub fn tool_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn filter_chain(fragment: &Path, config: &Config) -> String {
    format!(
        "fps={fps},scale={width}:-1:flags=lanczos,\
         subtitles='{fragment}':force_style='FontName={font},FontSize={size},\
         PrimaryColour=&HFFFFFF,OutlineColour=&H000000,BorderStyle=1,Outline={outline},\
         Shadow=1,Alignment=2,MarginV=20'",
        fps = config.fps,
        width = config.width,
        fragment = tool_path(fragment),
        font = config.font_name,
        size = config.font_size,
        outline = config.outline,
    )
}

/// Build the FFmpeg argument list for one clip.
pub fn build_clip_args(request: &ClipRequest<'_>, config: &Config) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format_ffmpeg_time(request.start),
        "-i".to_string(),
        tool_path(request.video),
        "-t".to_string(),
        format_ffmpeg_time(request.duration),
        "-vf".to_string(),
        filter_chain(request.fragment, config),
        "-f".to_string(),
        "gif".to_string(),
        request.output.to_string_lossy().to_string(),
    ]
}
