pub mod clip;
pub mod config;
pub mod discover;
pub mod error;
pub mod filter;
pub mod manifest;
pub mod pipeline;
pub mod processor;
pub mod subtitle;
pub mod transcode;

pub use clip::{ClipGenerator, ClipMetadata};
pub use config::Config;
pub use discover::{find_video_pairs, VideoPair};
pub use error::{Result, SubgifError};
pub use filter::SkipFilter;
pub use pipeline::{print_summary, run_batch, BatchSummary};
pub use processor::{VideoProcessor, VideoReport};
pub use transcode::{FfmpegTranscoder, TranscodeOutput, Transcoder};
