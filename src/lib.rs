//! castdrop - Farcaster airdrop eligibility finder
//!
//! Discovers users who publicly mentioned a token ticker on Farcaster and
//! determines which of them do not yet hold that token on-chain, producing
//! a deduplicated eligibility list as a CSV file.
//!
//! The work runs as a four-stage batch pipeline, each stage fully
//! materializing its output before the next begins:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Cast search  │ → │ User dedup   │ → │ Balance      │ → │ CSV      │
//! │ crawl        │   │              │   │ verification │   │ report   │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────┘
//! ```
//!
//! Both external systems are unreliable: the search API is paginated and
//! rate-limited, the public RPC endpoints are flaky. The crawl and the
//! balance stage therefore pace themselves, retry with backoff, and
//! checkpoint progress into a local JSON cache so an interrupted run
//! resumes instead of re-paying completed work.
//!
//! # Quick Start
//!
//! ```bash
//! export NEYNAR_API_KEY=your_key
//! castdrop airdrop --ticker DEGEN --token-address 0x4ed4...
//! ```
//!
//! # Modules
//!
//! - [`cache`]: persistent keyed JSON cache with pluggable stores
//! - [`search`]: cast search client and checkpointed crawl
//! - [`users`]: canonical user deduplication
//! - [`chain`]: on-chain balance verification with endpoint rotation
//! - [`report`]: eligibility CSV materialization
//! - [`cli`]: command-line interface
//! - [`config`]: TOML configuration

pub mod cache;
pub mod chain;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod report;
pub mod search;
pub mod users;

pub use config::AppConfig;
pub use errors::CastdropError;
pub use errors::Result;
pub use models::CanonicalUser;
pub use models::Cast;
pub use models::EligibilityReason;
pub use models::EligibilityRecord;
