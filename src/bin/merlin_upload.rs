use clap::Parser;
use dotenvy::dotenv;
use merlin_uploader::client::{
    ApiClient, PollOutcome, PollPolicy, SelectedFile, UploadOrchestrator,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upload video and script files, then wait for the stitched video.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Video and text files to upload, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Base URL of the upload API
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,

    /// Seconds between checks for the stitched video
    #[arg(long, default_value_t = 30)]
    interval_secs: u64,

    /// Multiply the wait by this factor after every unsuccessful check
    #[arg(long, default_value_t = 1.0)]
    backoff: f64,

    /// Upper bound for the wait between checks when backing off
    #[arg(long, default_value_t = 300)]
    max_interval_secs: u64,

    /// Stop after this many checks (default: keep checking)
    #[arg(long)]
    max_attempts: Option<u32>,
}

impl Args {
    fn poll_policy(&self) -> PollPolicy {
        let mut policy = PollPolicy::fixed(Duration::from_secs(self.interval_secs));
        if self.backoff > 1.0 {
            policy = policy.with_backoff(self.backoff, Duration::from_secs(self.max_interval_secs));
        }
        if let Some(attempts) = self.max_attempts {
            policy = policy.with_max_attempts(attempts);
        }
        policy
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "merlin_upload=info,merlin_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let files = args
        .files
        .iter()
        .map(|path| SelectedFile::from_path(path.as_path()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut orchestrator = UploadOrchestrator::new(ApiClient::new(&args.server)?, args.poll_policy());
    orchestrator.select(files)?;

    let folder = orchestrator.upload().await?;
    println!("Files have been uploaded to folder: {}", folder);
    info!("⏳ Waiting for stitched video... This may take a few minutes.");

    let handle = orchestrator.start_polling()?;
    let watched = handle.folder().clone();
    let outcome = tokio::select! {
        outcome = handle.wait() => outcome?,
        _ = tokio::signal::ctrl_c() => {
            warn!("⌨️  Ctrl+C received, no longer waiting for {}", watched);
            PollOutcome::Cancelled
        }
    };
    orchestrator.finish(&outcome);

    match outcome {
        PollOutcome::Available(url) => {
            println!("Stitched video: {}", url);
            Ok(())
        }
        PollOutcome::Cancelled => anyhow::bail!("stopped waiting for folder {}", folder),
        PollOutcome::Exhausted { attempts } => {
            anyhow::bail!("stitched video for {} not ready after {} checks", folder, attempts)
        }
    }
}
