//! Airdrop eligibility pipeline handler
//!
//! Runs the four stages strictly in order, each stage fully materializing
//! its output before the next begins: crawl casts, deduplicate users,
//! verify balances, write the report.

use crate::cache::KeyedCache;
use crate::chain::BalanceVerifier;
use crate::chain::EthBalanceClient;
use crate::chain::RetryPolicy;
use crate::cli::output::print_error;
use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::config::AppConfig;
use crate::report::write_eligibility_report;
use crate::search::CastSearchFetcher;
use crate::search::CrawlPacing;
use crate::search::NeynarClient;
use crate::users::dedupe_users;
use crate::CastdropError;
use crate::Result;

/// Handle the `airdrop` command
///
/// # Errors
/// Returns an error when the API key is missing or the final report cannot
/// be written. Upstream flakiness (rate limits, RPC failures) degrades to a
/// smaller result instead of failing the run.
pub async fn handle_airdrop_command(
    config: &AppConfig,
    ticker: String,
    search_text: Option<String>,
    token_address: String,
    output: Option<String>,
    no_cache: bool,
) -> Result<()> {
    let search_text = search_text.unwrap_or_else(|| format!("${ticker}"));
    let output_file =
        output.unwrap_or_else(|| format!("{}_airdrop_eligible.csv", ticker.to_lowercase()));
    let use_cache = !no_cache;

    // The credential is a precondition for the whole run, checked before
    // any network activity
    let api_key = std::env::var("NEYNAR_API_KEY")
        .map_err(|_| CastdropError::MissingCredential("NEYNAR_API_KEY"))?;

    println!("Social Airdrop Eligibility Finder");
    println!("=================================");
    print_info(&format!("Ticker: \"{ticker}\""));
    print_info(&format!("Search text: \"{search_text}\""));
    print_info(&format!("Token address: {token_address}"));
    print_info(&format!("Output file: {output_file}"));
    print_info(&format!("Cache enabled: {use_cache}"));

    // Stage 1: crawl every cast matching the search text
    println!("\n🔍 Stage 1: Searching casts...");
    let fetcher = CastSearchFetcher::new(
        NeynarClient::new(config.search_endpoint(), &api_key, config.search_page_size()),
        KeyedCache::file(config.cache_dir()),
        CrawlPacing::from_config(&config.search),
        use_cache,
    );
    let casts = fetcher.fetch(&search_text).await?;
    if casts.is_empty() {
        print_error("No casts found. Try a different search term.");
        return Ok(());
    }

    // Stage 2: one canonical user per author
    println!("\n👥 Stage 2: Extracting unique users...");
    let (users, dedupe) = dedupe_users(&casts);
    print_info(&format!(
        "Found {} unique users (removed {} duplicate casts)",
        dedupe.unique_users, dedupe.duplicate_casts
    ));
    if users.is_empty() {
        print_error("No users found in casts.");
        return Ok(());
    }

    // Stage 3: who already holds the token
    println!("\n💰 Stage 3: Checking wallet token balances...");
    let verifier = BalanceVerifier::new(
        EthBalanceClient::new(),
        config.rpc_urls().to_vec(),
        RetryPolicy::from_config(&config.chain),
        config.chain.exhausted_fallback,
        KeyedCache::file(config.cache_dir()),
        use_cache,
    );
    let eligible = verifier.verify(&users, &token_address).await?;
    if eligible.is_empty() {
        print_info("All users already have the token!");
        return Ok(());
    }

    // Stage 4: materialize the list
    println!("\n📄 Stage 4: Generating CSV...");
    let written = write_eligibility_report(&eligible, &output_file)?;

    println!();
    print_success("Airdrop eligibility run complete");
    print_info(&format!("Total casts found: {}", casts.len()));
    print_info(&format!("Unique users: {}", users.len()));
    print_info(&format!("Eligible for airdrop: {}", eligible.len()));
    print_info(&format!("CSV records: {written}"));
    print_info(&format!("Output: {output_file}"));
    print_info(&format!(
        "Run again to reuse cached data from {}/",
        config.cache_dir()
    ));

    Ok(())
}
