//! Command-line entry point for yt-seo-etl

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yt_seo_etl::analysis::{OpenAiClient, SeoAnalyzer};
use yt_seo_etl::utils::extract_video_id;
use yt_seo_etl::{
    Config, ObjectStoreWriter, OutputFormat, Pipeline, Result, RunOptions, S3ObjectStore,
    UploadOutcome, VideoRun, YouTubeClient,
};

#[derive(Parser)]
#[command(name = "yt-seo-etl")]
#[command(about = "Fetch YouTube comments, upload them to S3 and build SEO reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, persist and upload comments for one or more videos
    Run {
        /// Video IDs or watch URLs, processed in order
        #[arg(required = true)]
        video_ids: Vec<String>,

        /// Artifact format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        output: OutputFormat,

        /// Stop fetching once at least this many comments are collected
        #[arg(long)]
        max_comments: Option<usize>,

        /// Directory for local artifacts and reports
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Also write an SEO report (requires OPENAI_API_KEY)
        #[arg(short, long)]
        report: bool,
    },

    /// Download one object from the bucket
    Download {
        /// Object key
        key: String,

        /// Local destination (default: the key's file name)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Display already includes every nested cause
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Run {
            video_ids,
            output,
            max_comments,
            output_dir,
            report,
        } => {
            config.require_youtube_key()?;
            config.output_dir = output_dir;
            let video_ids = video_ids
                .iter()
                .map(|input| extract_video_id(input))
                .collect::<Result<Vec<_>>>()?;
            let options = RunOptions {
                output_dir: config.output_dir.clone(),
                format: output,
                max_comments,
            };

            let youtube = YouTubeClient::new(config.youtube.clone(), config.retry.clone())?;
            let writer = ObjectStoreWriter::new(S3ObjectStore::new(&config.storage)?, &config.storage);
            let pipeline = Pipeline::new(youtube, writer, options);

            let runs = if report {
                config.require_llm_key()?;
                let client = OpenAiClient::new(config.llm.clone(), config.retry.clone())?;
                let analyzer = SeoAnalyzer::new(client, config.analysis.clone(), &config.llm);
                pipeline.with_analyzer(analyzer).run(&video_ids).await?
            } else {
                let mut pipeline = pipeline;
                pipeline.run(&video_ids).await?
            };

            for run in &runs {
                print_summary(run);
            }
        }
        Commands::Download { key, dest } => {
            let writer = ObjectStoreWriter::new(S3ObjectStore::new(&config.storage)?, &config.storage);
            let path = writer.download_file(&key, dest.as_deref()).await?;
            println!("Downloaded {key} to {}", path.display());
        }
    }

    Ok(())
}

fn print_summary(run: &VideoRun) {
    let title = run
        .details
        .as_ref()
        .map(|d| d.title.as_str())
        .unwrap_or("(details unavailable)");
    println!("{}: {title}", run.video_id);
    println!("  comments: {}", run.comments.len());
    println!("  artifact: {}", run.artifact.display());
    match &run.upload {
        UploadOutcome::Skipped { key } => println!("  upload:   skipped, {key} already exists"),
        UploadOutcome::Uploaded { key, bytes, parts } => {
            println!("  upload:   {key} ({bytes} bytes, {parts} parts)")
        }
    }
    if let Some(report) = &run.report {
        println!("  report:   {}", report.display());
    }
}
