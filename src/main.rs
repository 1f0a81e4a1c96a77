use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use subgif::config::Config;
use subgif::pipeline::{print_summary, run_batch};
use subgif::transcode::{check_transcoder, FfmpegTranscoder};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "subgif")]
#[command(version, about = "Turn subtitle lines into captioned GIF clips")]
#[command(long_about = "Scan a folder of videos and subtitles and generate one captioned GIF per \
subtitle line using FFmpeg. Videos in the input folder pair with the subtitle of the same name; \
videos in a subfolder pair with every subtitle in that subfolder.")]
struct Cli {
    /// Input folder with videos and subtitles
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output folder for generated GIFs
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of FFmpeg processes per video
    #[arg(short, long)]
    workers: Option<usize>,

    /// GIF frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// GIF width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Caption font size
    #[arg(long)]
    font_size: Option<u32>,

    /// Render every subtitle line, ignoring skip patterns
    #[arg(long)]
    no_skip: bool,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(ref input) = cli.input {
        config.input_dir = input.clone();
    }
    if let Some(ref output) = cli.output {
        config.output_dir = output.clone();
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(fps) = cli.fps {
        config.fps = fps;
    }
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(font_size) = cli.font_size {
        config.font_size = font_size;
    }
    if cli.no_skip {
        config.skip_enabled = false;
    }
    if cli.no_progress {
        config.show_progress = false;
    }
    config
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = apply_overrides(config, &cli);
    config
        .validate()
        .context("Configuration validation failed")?;

    let ffmpeg = check_transcoder(&config.ffmpeg_path)?;

    info!("Input:   {}", config.input_dir.display());
    info!("Output:  {}", config.output_dir.display());
    info!("Workers: {}", config.workers);

    let summary = run_batch(Arc::new(FfmpegTranscoder::new(ffmpeg)), Arc::new(config)).await?;
    print_summary(&summary);

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
