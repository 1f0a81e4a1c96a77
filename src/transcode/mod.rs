pub mod ffmpeg;

pub use ffmpeg::{build_clip_args, check_transcoder, tool_path, ClipRequest, FfmpegTranscoder};

use crate::error::Result;
use async_trait::async_trait;

/// Outcome of one external transcoder run.
#[derive(Debug, Clone, Default)]
pub struct TranscodeOutput {
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Captured diagnostic output.
    pub stderr: String,
}

impl TranscodeOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stderr: stderr.into(),
        }
    }
}

/// Something that can run a transcoding command line.
///
/// `args` are passed as-is, so implementations never see a shell.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn run(&self, args: &[String]) -> Result<TranscodeOutput>;
    fn name(&self) -> &'static str;
}
