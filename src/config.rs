use crate::error::{Result, SubgifError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lines matching any of these (after tag stripping) do not become clips.
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &[
    r".*[a-z]$",  // ends with a lowercase letter
    r".*,$",      // ends with a comma
    r".*:$",      // ends with a colon
    r"^[a-z].*",  // starts with a lowercase letter
    r"^\.\.\.",   // starts with an ellipsis
];

pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov"];
pub const DEFAULT_SUBTITLE_EXTENSIONS: &[&str] = &["srt", "sub", "ass"];

/// Runtime configuration shared (read-only) by every stage of the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output frame rate of every clip.
    pub fps: u32,
    /// Output width in pixels; height follows the source aspect ratio.
    pub width: u32,
    pub font_name: String,
    pub font_size: u32,
    pub outline: u32,
    /// Maximum number of transcoder processes running at once for one video.
    pub workers: usize,
    pub skip_enabled: bool,
    pub skip_patterns: Vec<String>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub video_extensions: Vec<String>,
    pub subtitle_extensions: Vec<String>,
    /// Name or path of the FFmpeg binary.
    pub ffmpeg_path: String,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps: 15,
            width: 800,
            font_name: "Arial".to_string(),
            font_size: 24,
            outline: 2,
            workers: default_workers(),
            skip_enabled: true,
            skip_patterns: to_strings(DEFAULT_SKIP_PATTERNS),
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("gifs"),
            video_extensions: to_strings(DEFAULT_VIDEO_EXTENSIONS),
            subtitle_extensions: to_strings(DEFAULT_SUBTITLE_EXTENSIONS),
            ffmpeg_path: "ffmpeg".to_string(),
            show_progress: true,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// One worker per available processing unit.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Config {
    /// Load configuration from defaults, a TOML file and `SUBGIF_*` environment variables.
    ///
    /// An explicit `path` must exist and parse. Without one, the user config file
    /// (`<config dir>/subgif/config.toml`) is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    SubgifError::Config(format!("Cannot read {}: {e}", path.display()))
                })?;
                toml::from_str::<Config>(&contents)?
            }
            None => Self::load_user_file(),
        };

        config.apply_env();
        Ok(config)
    }

    fn load_user_file() -> Self {
        let Some(config_path) = Self::config_file_path() else {
            return Self::default();
        };
        if !config_path.exists() {
            return Self::default();
        }

        debug!("Loading config from {}", config_path.display());
        match std::fs::read_to_string(&config_path)
            .map_err(SubgifError::from)
            .and_then(|contents| toml::from_str::<Config>(&contents).map_err(SubgifError::from))
        {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring {}: {}", config_path.display(), e);
                Self::default()
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("SUBGIF_INPUT_DIR") {
            self.input_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("SUBGIF_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(workers) = std::env::var("SUBGIF_WORKERS") {
            if let Ok(w) = workers.parse() {
                self.workers = w;
            }
        }
        if let Ok(ffmpeg) = std::env::var("SUBGIF_FFMPEG") {
            self.ffmpeg_path = ffmpeg;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SubgifError::Config(
                "Workers must be greater than 0".to_string(),
            ));
        }
        if self.fps == 0 {
            return Err(SubgifError::Config("FPS must be greater than 0".to_string()));
        }
        if self.width == 0 {
            return Err(SubgifError::Config(
                "Width must be greater than 0".to_string(),
            ));
        }
        if self.font_size == 0 {
            return Err(SubgifError::Config(
                "Font size must be greater than 0".to_string(),
            ));
        }
        if self.video_extensions.is_empty() || self.subtitle_extensions.is_empty() {
            return Err(SubgifError::Config(
                "At least one video and one subtitle extension are required".to_string(),
            ));
        }
        for pattern in &self.skip_patterns {
            regex::Regex::new(pattern)?;
        }

        Ok(())
    }

    pub fn is_video(&self, path: &Path) -> bool {
        has_extension(path, &self.video_extensions)
    }

    pub fn is_subtitle(&self, path: &Path) -> bool {
        has_extension(path, &self.subtitle_extensions)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("subgif").join("config.toml"))
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}
