use castdrop::cli::Cli;
use castdrop::cli::Commands;
use castdrop::AppConfig;
use castdrop::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up NEYNAR_API_KEY from a local .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    if cli.verbose {
        castdrop::logging::init_logging_with_level("debug")?;
    } else {
        castdrop::logging::init_logging_with_level(config.log_level())?;
    }
    tracing::debug!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Airdrop {
            ticker,
            search_text,
            token_address,
            output,
            no_cache,
        } => {
            castdrop::cli::handle_airdrop_command(
                &config,
                ticker,
                search_text,
                token_address,
                output,
                no_cache,
            )
            .await?;
        }
        Commands::Fetch => {
            castdrop::cli::handle_fetch_command()?;
        }
    }

    Ok(())
}
