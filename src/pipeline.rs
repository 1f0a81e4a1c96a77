use crate::config::Config;
use crate::discover::find_video_pairs;
use crate::error::{Result, SubgifError};
use crate::processor::{VideoProcessor, VideoReport};
use crate::transcode::Transcoder;
use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Result of a whole batch run.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub pairs_found: usize,
    /// One report per pair that got past subtitle parsing.
    pub reports: Vec<VideoReport>,
    /// Pairs aborted before clip generation (e.g. unreadable subtitles).
    pub failed_pairs: usize,
    pub total_time: Duration,
}

impl BatchSummary {
    pub fn clips_generated(&self) -> usize {
        self.reports.iter().map(|r| r.generated).sum()
    }

    pub fn clips_failed(&self) -> usize {
        self.reports.iter().map(|r| r.failed).sum()
    }
}

/// Make sure the input folder exists. On first run it is created and the
/// batch stops so the user can fill it.
fn prepare_directories(config: &Config) -> Result<()> {
    if !config.input_dir.exists() {
        fs::create_dir_all(&config.input_dir)?;
        info!(
            "Input directory '{}' created. Please add video and subtitle files to it.",
            config.input_dir.display()
        );
        return Err(SubgifError::InputDirCreated(
            config.input_dir.display().to_string(),
        ));
    }

    fs::create_dir_all(&config.output_dir)?;
    Ok(())
}

/// Generate clips for every video/subtitle pair under the input folder.
///
/// Pairs are processed one after another. A pair whose subtitles cannot be
/// read is logged and skipped; individual clip failures never stop the batch.
pub async fn run_batch(transcoder: Arc<dyn Transcoder>, config: Arc<Config>) -> Result<BatchSummary> {
    let start_time = Instant::now();

    prepare_directories(&config)?;

    let pairs = find_video_pairs(&config.input_dir, &config)?;
    if pairs.is_empty() {
        return Err(SubgifError::NoPairs(config.input_dir.display().to_string()));
    }
    info!("Found {} video/subtitle pairs", pairs.len());

    let processor = VideoProcessor::new(transcoder, config.clone())?;
    let mut reports = Vec::with_capacity(pairs.len());
    let mut failed_pairs = 0;

    for pair in &pairs {
        match processor.process(pair).await {
            Ok(report) => {
                if report.all_failed() {
                    warn!("No clips could be generated for {}", report.video_name);
                }
                reports.push(report);
            }
            Err(e) => {
                error!(
                    "Skipping {} with {}: {}",
                    pair.video.display(),
                    pair.subtitle.display(),
                    e
                );
                failed_pairs += 1;
            }
        }
    }

    info!("All videos have been processed.");

    Ok(BatchSummary {
        pairs_found: pairs.len(),
        reports,
        failed_pairs,
        total_time: start_time.elapsed(),
    })
}

/// Print a summary of the batch.
pub fn print_summary(summary: &BatchSummary) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                       GIF Generation Complete                  ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    for report in &summary.reports {
        println!(
            "  {:<30} {:>5}/{:<5} gifs  ({:.1}s)",
            report.video_name,
            report.generated,
            report.filtered_entries,
            report.elapsed.as_secs_f64()
        );
    }
    println!();
    println!("  Pairs:      {}", summary.pairs_found);
    if summary.failed_pairs > 0 {
        println!("  Skipped:    {}", summary.failed_pairs);
    }
    println!("  Generated:  {}", summary.clips_generated());
    if summary.clips_failed() > 0 {
        println!("  Failed:     {}", summary.clips_failed());
    }
    println!("  Total:      {:.2}s", summary.total_time.as_secs_f64());
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::TranscodeOutput;
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::TempDir;

    struct WritingTranscoder;

    #[async_trait]
    impl Transcoder for WritingTranscoder {
        async fn run(&self, args: &[String]) -> Result<TranscodeOutput> {
            fs::write(args.last().unwrap(), b"GIF89a")?;
            Ok(TranscodeOutput::ok())
        }

        fn name(&self) -> &'static str {
            "Writing"
        }
    }

    fn config_in(root: &Path) -> Arc<Config> {
        Arc::new(Config {
            input_dir: root.join("input"),
            output_dir: root.join("gifs"),
            show_progress: false,
            workers: 2,
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn test_first_run_creates_input_dir() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());

        let result = run_batch(Arc::new(WritingTranscoder), config.clone()).await;

        assert!(matches!(result, Err(SubgifError::InputDirCreated(_))));
        assert!(config.input_dir.is_dir());
        assert!(!config.output_dir.exists());
    }

    #[tokio::test]
    async fn test_no_pairs_is_error() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("lonely.mp4"), b"x").unwrap();

        let result = run_batch(Arc::new(WritingTranscoder), config.clone()).await;

        assert!(matches!(result, Err(SubgifError::NoPairs(_))));
        assert!(config.output_dir.is_dir());
    }

    #[tokio::test]
    async fn test_bad_pair_does_not_stop_batch() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let input = &config.input_dir;
        fs::create_dir_all(input).unwrap();
        fs::write(input.join("good.mp4"), b"x").unwrap();
        fs::write(input.join("good.srt"), "1\n00:00:01,000 --> 00:00:02,000\nGood!\n").unwrap();
        fs::write(input.join("bad.mp4"), b"x").unwrap();
        fs::write(input.join("bad.srt"), [0xff, 0xfe, 0x00, 0xd8]).unwrap();

        let summary = run_batch(Arc::new(WritingTranscoder), config.clone())
            .await
            .unwrap();

        assert_eq!(summary.pairs_found, 2);
        assert_eq!(summary.failed_pairs, 1);
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.clips_generated(), 1);
        assert!(config.output_dir.join("good").join("000000-good.gif").exists());
    }
}
