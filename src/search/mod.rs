//! Cast search crawling: API client and checkpointed fetcher

pub mod client;
pub mod fetcher;

pub use client::CastSearchClient;
pub use client::NeynarClient;
pub use client::SearchPage;
pub use fetcher::CastSearchFetcher;
pub use fetcher::CrawlPacing;
pub use fetcher::CrawlState;
