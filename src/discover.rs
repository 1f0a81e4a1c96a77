use crate::config::Config;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A video and one subtitle file to caption it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPair {
    pub video: PathBuf,
    pub subtitle: PathBuf,
}

/// Find video/subtitle pairs under `root`.
///
/// Videos directly in `root` pair only with the root subtitle of the same file
/// stem. Videos in a subdirectory pair with every subtitle in that
/// subdirectory, whatever its name. Names are compared exactly.
pub fn find_video_pairs(root: &Path, config: &Config) -> Result<Vec<VideoPair>> {
    let mut videos = Vec::new();
    let mut subtitles = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if config.is_video(&path) {
            videos.push(path);
        } else if config.is_subtitle(&path) {
            subtitles.push(path);
        }
    }

    debug!(
        "Found {} video and {} subtitle files under {}",
        videos.len(),
        subtitles.len(),
        root.display()
    );

    let mut pairs = Vec::new();
    for video in videos {
        let video_dir = video.parent().unwrap_or(root);
        let in_same_dir = |sub: &&PathBuf| sub.parent() == Some(video_dir);

        if video_dir == root {
            let stem = video.file_stem();
            match subtitles
                .iter()
                .filter(in_same_dir)
                .find(|sub| sub.file_stem() == stem)
            {
                Some(subtitle) => pairs.push(VideoPair {
                    video: video.clone(),
                    subtitle: subtitle.clone(),
                }),
                None => debug!("No subtitle named after {}, skipping", video.display()),
            }
        } else {
            for subtitle in subtitles.iter().filter(in_same_dir) {
                pairs.push(VideoPair {
                    video: video.clone(),
                    subtitle: subtitle.clone(),
                });
            }
        }
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_root_pairs_by_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("movie.mp4"));
        touch(&root.join("movie.srt"));
        touch(&root.join("other.srt"));

        let pairs = find_video_pairs(root, &Config::default()).unwrap();
        assert_eq!(
            pairs,
            vec![VideoPair {
                video: root.join("movie.mp4"),
                subtitle: root.join("movie.srt"),
            }]
        );
    }

    #[test]
    fn test_root_video_without_match_is_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("movie.mp4"));
        touch(&root.join("Movie.srt"));
        // Same stem in a subfolder does not count for a root video
        touch(&root.join("sub/movie.srt"));

        let pairs = find_video_pairs(root, &Config::default()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_subfolder_pairs_with_every_subtitle() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("show/clip.mkv"));
        touch(&root.join("show/a.srt"));
        touch(&root.join("show/b.sub"));
        touch(&root.join("show/notes.txt"));
        touch(&root.join("elsewhere/c.srt"));

        let pairs = find_video_pairs(root, &Config::default()).unwrap();
        assert_eq!(
            pairs,
            vec![
                VideoPair {
                    video: root.join("show/clip.mkv"),
                    subtitle: root.join("show/a.srt"),
                },
                VideoPair {
                    video: root.join("show/clip.mkv"),
                    subtitle: root.join("show/b.sub"),
                },
            ]
        );
    }

    #[test]
    fn test_extension_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("Film.MOV"));
        touch(&root.join("Film.SRT"));

        let pairs = find_video_pairs(root, &Config::default()).unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_missing_root_is_error() {
        let result = find_video_pairs(Path::new("/nonexistent/subgif-input"), &Config::default());
        assert!(result.is_err());
    }
}
