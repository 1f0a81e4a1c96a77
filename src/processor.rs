use crate::clip::{ClipGenerator, ClipMetadata};
use crate::config::Config;
use crate::discover::VideoPair;
use crate::error::Result;
use crate::filter::SkipFilter;
use crate::manifest::write_manifest;
use crate::subtitle::{parse_file, SubtitleEntry};
use crate::transcode::Transcoder;
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// What happened to one video/subtitle pair.
#[derive(Debug, Clone)]
pub struct VideoReport {
    pub video_name: String,
    pub output_dir: PathBuf,
    /// Entries in the subtitle file.
    pub total_entries: usize,
    /// Entries left after the skip filter.
    pub filtered_entries: usize,
    pub generated: usize,
    pub failed: usize,
    /// Written only when at least one clip exists.
    pub manifest: Option<PathBuf>,
    pub elapsed: Duration,
}

impl VideoReport {
    /// True when there was work to do and none of it succeeded.
    pub fn all_failed(&self) -> bool {
        self.generated == 0 && self.filtered_entries > 0
    }
}

/// Generates all clips for one pair, running clip jobs concurrently.
pub struct VideoProcessor {
    generator: ClipGenerator,
    filter: SkipFilter,
    config: Arc<Config>,
}

impl VideoProcessor {
    /// Fails on an invalid configuration, e.g. zero workers, which would
    /// leave every clip job waiting for a permit.
    pub fn new(transcoder: Arc<dyn Transcoder>, config: Arc<Config>) -> Result<Self> {
        config.validate()?;
        let filter = SkipFilter::from_config(&config)?;
        Ok(Self {
            generator: ClipGenerator::new(transcoder, config.clone()),
            filter,
            config,
        })
    }

    /// Output folder for a video: `<output_dir>/<video file stem>`.
    pub fn output_dir_for(&self, video: &Path) -> PathBuf {
        let stem = video.file_stem().unwrap_or_default();
        self.config.output_dir.join(stem)
    }

    pub async fn process(&self, pair: &VideoPair) -> Result<VideoReport> {
        let start_time = Instant::now();
        let output_dir = self.output_dir_for(&pair.video);
        let video_name = output_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        fs::create_dir_all(&output_dir)?;

        info!("Processing video: {}", video_name);

        let subs = parse_file(&pair.subtitle).map_err(|e| {
            error!(
                "Error reading subtitle file {}: {}",
                pair.subtitle.display(),
                e
            );
            e
        })?;
        let total_entries = subs.len();
        let filtered = self.filter.filter_entries(subs);

        info!("Total subtitles: {}", total_entries);
        info!("Filtered subtitles: {}", filtered.len());

        let filtered_entries = filtered.len();
        let mut clips = self
            .generate_all(&filtered, &pair.video, &output_dir, &video_name)
            .await;
        let generated = clips.len();

        let manifest = if clips.is_empty() {
            None
        } else {
            match write_manifest(&output_dir, &mut clips) {
                Ok(path) => Some(path),
                Err(e) => {
                    error!("Error writing metadata file: {}", e);
                    None
                }
            }
        };

        let elapsed = start_time.elapsed();
        info!(
            "Completed processing {}: {}/{} clips in {:.2}s",
            video_name,
            generated,
            filtered_entries,
            elapsed.as_secs_f64()
        );

        Ok(VideoReport {
            video_name,
            output_dir,
            total_entries,
            filtered_entries,
            generated,
            failed: filtered_entries - generated,
            manifest,
            elapsed,
        })
    }

    /// Run one clip job per entry, at most `workers` at a time. Results come
    /// back in completion order.
    async fn generate_all(
        &self,
        entries: &[SubtitleEntry],
        video: &Path,
        output_dir: &Path,
        video_name: &str,
    ) -> Vec<ClipMetadata> {
        if entries.is_empty() {
            return Vec::new();
        }

        let progress_bar = if self.config.show_progress {
            let pb = ProgressBar::new(entries.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} gifs ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb.set_prefix(format!("Processing {video_name}"));
            Some(pb)
        } else {
            None
        };

        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut futures = FuturesUnordered::new();

        for entry in entries {
            let sem = semaphore.clone();
            let generator = &self.generator;

            futures.push(async move {
                // A closed semaphore would only mean no limit; run anyway
                let _permit = sem.acquire().await.ok();
                debug!("Starting clip {}", entry.index);
                generator.generate(entry, video, output_dir).await
            });
        }

        let mut clips = Vec::with_capacity(entries.len());
        while let Some(result) = futures.next().await {
            if let Some(metadata) = result {
                clips.push(metadata);
            }
            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("done");
        }

        clips
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubgifError;
    use crate::manifest::read_manifest;
    use crate::transcode::TranscodeOutput;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Succeeds for every clip except number `fail_on_index`.
    /// Later indices finish first so completion order differs from submission order.
    struct MockTranscoder {
        call_count: AtomicUsize,
        running: AtomicUsize,
        max_running: AtomicUsize,
        fail_on_index: Option<usize>,
    }

    impl MockTranscoder {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                running: AtomicUsize::new(0),
                max_running: AtomicUsize::new(0),
                fail_on_index: None,
            }
        }

        fn failing_on(index: usize) -> Self {
            Self {
                fail_on_index: Some(index),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl Transcoder for MockTranscoder {
        async fn run(&self, args: &[String]) -> Result<TranscodeOutput> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);

            let output = PathBuf::from(args.last().unwrap());
            let name = output.file_name().unwrap().to_string_lossy().to_string();
            let index: usize = name[..6].parse().unwrap();

            tokio::time::sleep(Duration::from_millis(5 * (10 - index.min(10) as u64))).await;
            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on_index == Some(index) {
                return Ok(TranscodeOutput::failed(1, format!("mock failure {index}")));
            }
            std::fs::write(&output, b"GIF89a").unwrap();
            Ok(TranscodeOutput::ok())
        }

        fn name(&self) -> &'static str {
            "Mock"
        }
    }

    fn write_srt(path: &Path, lines: &[&str]) {
        let body: Vec<String> = lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                format!(
                    "{}\n00:00:{:02},000 --> 00:00:{:02},500\n{}\n",
                    i + 1,
                    i,
                    i,
                    text
                )
            })
            .collect();
        std::fs::write(path, body.join("\n")).unwrap();
    }

    fn setup(workers: usize) -> (TempDir, Arc<Config>, VideoPair) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        std::fs::create_dir_all(&input).unwrap();
        let config = Arc::new(Config {
            output_dir: dir.path().join("gifs"),
            input_dir: input.clone(),
            workers,
            show_progress: false,
            ..Config::default()
        });
        let pair = VideoPair {
            video: input.join("movie.mp4"),
            subtitle: input.join("movie.srt"),
        };
        (dir, config, pair)
    }

    #[tokio::test]
    async fn test_process_writes_sorted_manifest() {
        let (_dir, config, pair) = setup(4);
        write_srt(
            &pair.subtitle,
            &["One!", "skip this one", "Two.", "Three?", "Four!"],
        );
        let mock = Arc::new(MockTranscoder::new());
        let processor = VideoProcessor::new(mock.clone(), config.clone()).unwrap();

        let report = processor.process(&pair).await.unwrap();

        assert_eq!(report.total_entries, 5);
        assert_eq!(report.filtered_entries, 4);
        assert_eq!(report.generated, 4);
        assert_eq!(report.failed, 0);
        assert_eq!(report.output_dir, config.output_dir.join("movie"));

        let manifest = read_manifest(&report.output_dir).unwrap();
        let texts: Vec<&str> = manifest.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["One!", "Two.", "Three?", "Four!"]);
        assert!(manifest[0].path.ends_with("000000-one.gif"));
        assert!(manifest[3].path.ends_with("000003-four.gif"));
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let (_dir, config, pair) = setup(2);
        write_srt(&pair.subtitle, &["A!", "B!", "C!", "D!", "E!"]);
        let mock = Arc::new(MockTranscoder::failing_on(3));
        let processor = VideoProcessor::new(mock.clone(), config).unwrap();

        let report = processor.process(&pair).await.unwrap();

        assert_eq!(report.generated, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(mock.call_count.load(Ordering::SeqCst), 5);

        let manifest = read_manifest(&report.output_dir).unwrap();
        let texts: Vec<&str> = manifest.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["A!", "B!", "C!", "E!"]);
    }

    #[tokio::test]
    async fn test_respects_worker_limit() {
        let (_dir, config, pair) = setup(2);
        write_srt(&pair.subtitle, &["A!", "B!", "C!", "D!", "E!", "F!"]);
        let mock = Arc::new(MockTranscoder::new());
        let processor = VideoProcessor::new(mock.clone(), config).unwrap();

        processor.process(&pair).await.unwrap();

        assert!(mock.max_running.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_no_manifest_when_nothing_generated() {
        let (_dir, config, pair) = setup(2);
        write_srt(&pair.subtitle, &["all lowercase", "another one"]);
        let mock = Arc::new(MockTranscoder::new());
        let processor = VideoProcessor::new(mock.clone(), config).unwrap();

        let report = processor.process(&pair).await.unwrap();

        assert_eq!(report.filtered_entries, 0);
        assert!(report.manifest.is_none());
        assert!(!report.output_dir.join("metadata.json").exists());
        assert_eq!(mock.call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_subtitle_aborts_pair() {
        let (_dir, config, pair) = setup(2);
        let processor = VideoProcessor::new(Arc::new(MockTranscoder::new()), config).unwrap();

        let result = processor.process(&pair).await;
        assert!(matches!(result, Err(SubgifError::SubtitleParse(_))));
    }

    #[tokio::test]
    async fn test_rerun_skips_existing_clips() {
        let (_dir, config, pair) = setup(3);
        write_srt(&pair.subtitle, &["A!", "B!", "C!"]);
        let mock = Arc::new(MockTranscoder::new());
        let processor = VideoProcessor::new(mock.clone(), config).unwrap();

        processor.process(&pair).await.unwrap();
        let report = processor.process(&pair).await.unwrap();

        assert_eq!(report.generated, 3);
        assert_eq!(mock.call_count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let (_dir, config, _pair) = setup(2);
        let config = Arc::new(Config {
            workers: 0,
            ..(*config).clone()
        });

        let result = VideoProcessor::new(Arc::new(MockTranscoder::new()), config);
        assert!(matches!(result, Err(SubgifError::Config(_))));
    }

    #[test]
    fn test_all_failed_report() {
        let report = VideoReport {
            video_name: "movie".to_string(),
            output_dir: PathBuf::from("gifs/movie"),
            total_entries: 3,
            filtered_entries: 2,
            generated: 0,
            failed: 2,
            manifest: None,
            elapsed: Duration::ZERO,
        };
        assert!(report.all_failed());
    }
}
