use anyhow::Result;
use clap::Parser;
use drover_common::observability::{init_logging, LogConfig};
use drover_config::DroverConfigLoader;
use std::path::PathBuf;

mod repl;

/// Interactive browser session driven from the terminal.
#[derive(Parser)]
#[command(name = "drover", version, about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "drover.yaml")]
    config: PathBuf,

    /// Run the browser headless regardless of the config file.
    #[arg(long)]
    headless: bool,

    /// Navigate to this URL before handing over the prompt.
    #[arg(long)]
    open: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config first (env wins over file), then logging from it.
    let mut cfg = DroverConfigLoader::new().with_file(&cli.config).load()?;
    if cli.headless {
        cfg.browser.headless = true;
    }

    let log_path = init_logging(LogConfig::default())?;
    tracing::info!(path = %log_path.display(), "logging initialised");

    let session = drover_browser::connect(&cfg.browser).await?;

    let llm = match &cfg.llm {
        Some(llm_cfg) => Some(drover_llm::ensure_llm_ready(llm_cfg).await?),
        None => None,
    };

    if let Some(url) = &cli.open {
        session.navigate(url).await?;
    }

    match repl::run(session, llm).await? {
        repl::SessionOutcome::Quit => tracing::info!("session closed"),
        repl::SessionOutcome::Interrupted => {
            tracing::info!("interrupted by user");
            println!("Interrupted.");
        }
    }

    Ok(())
}
