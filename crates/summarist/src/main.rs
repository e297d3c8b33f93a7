use anyhow::{Context, Result};
use clap::Parser;
use shared::{Config, Services, Session};
use std::io;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "summarist")]
#[command(about = "Summarize text, PDF, Word and text files with Gemini, then save or email the result")]
struct Args {
    /// Directory the summary_output.* files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Gemini model to use (overrides GEMINI_MODEL)
    #[arg(short, long)]
    model: Option<String>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("summarist=warn,shared=warn"));

    // Logs go to stderr so they never interleave with prompts on stdout
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = Config::from_env()?;
    config.output_dir = args.output_dir;
    if let Some(model) = args.model {
        config.gemini_model = model;
    }

    if !config.output_dir.is_dir() {
        anyhow::bail!(
            "Output directory does not exist: {}",
            config.output_dir.display()
        );
    }

    tracing::info!(
        "Starting session with model {} (output: {})",
        config.gemini_model,
        config.output_dir.display()
    );

    let services = Services::from_config(&config).context("Failed to set up services")?;
    let mut session = Session::new(services, io::stdout());
    session.start()?;

    session
        .run(BufReader::new(tokio::io::stdin()))
        .await
        .context("Failed to read input")?;

    Ok(())
}
