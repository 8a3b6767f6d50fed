//! CLI command definitions and argument parsing

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "castdrop")]
#[command(about = "Find Farcaster users who posted about a token but do not hold it on-chain")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the airdrop eligibility list for a token
    Airdrop {
        /// Token ticker/symbol to search for (e.g. "elizaOS", "DEGEN", "HIGHER")
        #[arg(long, default_value = "elizaOS")]
        ticker: String,
        /// Custom search text (overrides the `$<ticker>` query). Use for exact phrases.
        #[arg(long)]
        search_text: Option<String>,
        /// Token contract address on the Base chain
        #[arg(long, default_value = "0xea17df5cf6d172224892b5477a16acb111182478")]
        token_address: String,
        /// Output CSV filename (auto-generated from the ticker if not specified)
        #[arg(short, long)]
        output: Option<String>,
        /// Disable caching and fetch fresh data
        #[arg(long)]
        no_cache: bool,
    },
    /// Fetch casts by channel criteria (deprecated, use `airdrop`)
    Fetch,
}
