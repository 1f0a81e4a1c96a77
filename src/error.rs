use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubgifError {
    #[error("Transcoder not found: {0}")]
    TranscoderNotFound(String),

    #[error("Input directory '{0}' created. Add video and subtitle files to it and run again.")]
    InputDirCreated(String),

    #[error("No matching video and subtitle files found in {0}")]
    NoPairs(String),

    #[error("Failed to parse subtitles: {0}")]
    SubtitleParse(String),

    #[error("Transcoding failed: {0}")]
    Transcode(String),

    #[error("Empty output generated: {0}")]
    EmptyOutput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid skip pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, SubgifError>;
