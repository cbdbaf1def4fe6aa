use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use framesift::{
    BatchDriver, DecodeSession, HttpFetcher, LinksFile, SampleOptions, SiftError, VideoListing,
};

const CLI_AFTER_HELP: &str = "Examples:\n  framesift probe input.mp4 --json\n  framesift sample input.mp4 --out dataset --start-after 60 --cut-last 60\n  framesift build video-links.txt --downloads downloads --out dataset --progress";

#[derive(Debug, Parser)]
#[command(
    name = "framesift",
    version,
    about = "Download archive videos and sample time-windowed frames into an image dataset",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Show additional logging output.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download every listed video and sample its frames.
    #[command(
        about = "Build a dataset from a links file",
        after_help = "Examples:\n  framesift build video-links.txt --out dataset\n  framesift build video-links.txt --ext mp4 --ext mkv --keep-sources --progress"
    )]
    Build {
        /// Newline-separated file of direct-download video URLs.
        links_file: PathBuf,
        /// Directory videos are downloaded into.
        #[arg(long, default_value = "downloads")]
        downloads: PathBuf,
        /// Output directory for frame images.
        #[arg(long, default_value = "dataset")]
        out: PathBuf,
        /// Seconds to skip at the start of each video.
        #[arg(long, default_value_t = 60.0)]
        start_after: f64,
        /// Seconds to drop at the end of each video.
        #[arg(long, default_value_t = 60.0)]
        cut_last: f64,
        /// Keep downloaded videos instead of deleting them after sampling.
        #[arg(long)]
        keep_sources: bool,
        /// Accepted file extension (repeatable). Defaults to mp4 and mpeg.
        #[arg(long = "ext")]
        extensions: Vec<String>,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
    },

    /// Sample frames from a single local video.
    #[command(
        about = "Sample one video into frame images",
        after_help = "Examples:\n  framesift sample input.mp4 --out frames\n  framesift sample input.mp4 --out frames --ordinal 3 --delete-after"
    )]
    Sample {
        /// Input video path.
        input: PathBuf,
        /// Output directory for frame images.
        #[arg(long, default_value = "dataset")]
        out: PathBuf,
        /// Ordinal used in output filenames ({ordinal}-frame{index}.png).
        #[arg(long, default_value_t = 0)]
        ordinal: u64,
        /// Seconds to skip at the start.
        #[arg(long, default_value_t = 60.0)]
        start_after: f64,
        /// Seconds to drop at the end.
        #[arg(long, default_value_t = 60.0)]
        cut_last: f64,
        /// Delete the source video after a successful run.
        #[arg(long)]
        delete_after: bool,
    },

    /// Print stream metadata for a video (alias: info).
    #[command(
        about = "Print video stream metadata",
        visible_alias = "info",
        after_help = "Examples:\n  framesift probe input.mp4\n  framesift probe input.mp4 --json"
    )]
    Probe {
        /// Input video path.
        input: PathBuf,
        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), SiftError> {
    match command {
        Commands::Build {
            links_file,
            downloads,
            out,
            start_after,
            cut_last,
            keep_sources,
            extensions,
            progress,
        } => build(
            links_file,
            downloads,
            out,
            start_after,
            cut_last,
            keep_sources,
            extensions,
            progress,
        ),
        Commands::Sample {
            input,
            out,
            ordinal,
            start_after,
            cut_last,
            delete_after,
        } => {
            let options = SampleOptions::new()
                .with_start_after(Duration::from_secs_f64(start_after))
                .with_cut_last(Duration::from_secs_f64(cut_last))
                .with_delete_after(delete_after);

            let written = framesift::sample(&input, &out, ordinal, &options)?;
            println!(
                "{} {} frames written to {}",
                "done:".green().bold(),
                written,
                out.display(),
            );
            Ok(())
        }
        Commands::Probe { input, json } => probe(input, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn build(
    links_file: PathBuf,
    downloads: PathBuf,
    out: PathBuf,
    start_after: f64,
    cut_last: f64,
    keep_sources: bool,
    extensions: Vec<String>,
    progress: bool,
) -> Result<(), SiftError> {
    let listing = if extensions.is_empty() {
        LinksFile::new(&links_file)
    } else {
        LinksFile::with_extensions(&links_file, extensions)
    };
    let urls = listing.list_video_urls()?;

    let options = SampleOptions::new()
        .with_start_after(Duration::from_secs_f64(start_after))
        .with_cut_last(Duration::from_secs_f64(cut_last))
        .with_delete_after(!keep_sources);

    let driver = BatchDriver::new(HttpFetcher::new())
        .with_download_dir(&downloads)
        .with_output_dir(&out)
        .with_options(options);

    let bar = if progress {
        let bar = ProgressBar::new(urls.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} videos ({msg})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let mut processed = 0usize;
    let mut failed = 0usize;
    let mut frames: u64 = 0;

    for (ordinal, url) in urls.iter().enumerate() {
        if let Some(bar) = &bar {
            bar.set_message(format!("{frames} frames"));
        }

        match driver.process(url, ordinal as u64) {
            Ok(written) => {
                processed += 1;
                frames += written;
            }
            Err(error) => {
                log::warn!("Skipping {url}: {error}");
                failed += 1;
            }
        }

        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let failed_display = failed.to_string();
    let failed_display = if failed > 0 {
        failed_display.as_str().yellow().to_string()
    } else {
        failed_display
    };
    println!(
        "{} {} videos processed, {} failed, {} frames written to {}",
        "done:".green().bold(),
        processed,
        failed_display,
        frames,
        out.display(),
    );

    Ok(())
}

fn probe(input: PathBuf, as_json: bool) -> Result<(), SiftError> {
    let session = DecodeSession::open(&input)?;

    if as_json {
        let value = json!({
            "path": input.display().to_string(),
            "codec": session.codec(),
            "width": session.width(),
            "height": session.height(),
            "frame_rate": session.frame_rate(),
            "duration_seconds": session.duration().as_secs_f64(),
            "frame_count_estimate": session.frame_count_estimate(),
        });
        println!("{value:#}");
    } else {
        println!("{}", input.display().to_string().bold());
        println!("  {:<22} {}", "codec:".cyan(), session.codec());
        println!(
            "  {:<22} {}x{}",
            "resolution:".cyan(),
            session.width(),
            session.height(),
        );
        println!("  {:<22} {:.3} fps", "frame rate:".cyan(), session.frame_rate());
        println!(
            "  {:<22} {:.2} s",
            "duration:".cyan(),
            session.duration().as_secs_f64(),
        );
        println!(
            "  {:<22} ~{}",
            "frame estimate:".cyan(),
            session.frame_count_estimate(),
        );
    }

    Ok(())
}
