use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedloom::app::AppContext;
use feedloom::cli::{commands, Cli, Commands};
use feedloom::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Serve { bind } => {
            commands::serve(ctx, bind).await?;
        }
        Commands::Feed { url } => {
            commands::fetch_feed(&ctx, &url).await?;
        }
        Commands::Feeds { urls, opml } => {
            commands::fetch_feeds(&ctx, urls, opml.as_deref()).await?;
        }
        Commands::Extract { url, html_out } => {
            commands::extract_article(&ctx, &url, html_out.as_deref()).await?;
        }
    }

    Ok(())
}
