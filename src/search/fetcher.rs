//! Cursor-paginated, checkpointed cast crawling
//!
//! The crawl survives rate limits and transient failures by pacing and
//! retrying, and survives process restarts by checkpointing accumulated
//! pages (with the current cursor) into the keyed cache. Only an
//! unauthorized response halts pagination outright.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tokio::time::sleep;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::cache::cast_cache_key;
use crate::cache::KeyedCache;
use crate::config::SearchConfig;
use crate::models::Cast;
use crate::search::client::CastSearchClient;
use crate::CastdropError;
use crate::Result;

/// Pacing and retry policy for the crawl loop
#[derive(Debug, Clone)]
pub struct CrawlPacing {
    /// Delay between successful page requests
    pub page_interval: Duration,
    /// Delay after an HTTP 429 before retrying the same page
    pub rate_limit_backoff: Duration,
    /// Delay after a transient failure before retrying the same page
    pub error_backoff: Duration,
    /// Consecutive failures tolerated before the crawl aborts
    pub max_consecutive_errors: u32,
    /// Checkpoint accumulated progress every N pages
    pub checkpoint_pages: u32,
}

impl CrawlPacing {
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            page_interval: Duration::from_millis(config.page_interval_ms),
            rate_limit_backoff: Duration::from_millis(config.rate_limit_backoff_ms),
            error_backoff: Duration::from_millis(config.error_backoff_ms),
            max_consecutive_errors: config.max_consecutive_errors,
            checkpoint_pages: config.checkpoint_pages,
        }
    }

    /// Zero-delay pacing, for deterministic tests
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            page_interval: Duration::ZERO,
            rate_limit_backoff: Duration::ZERO,
            error_backoff: Duration::ZERO,
            max_consecutive_errors: 3,
            checkpoint_pages: 10,
        }
    }
}

impl Default for CrawlPacing {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

/// Checkpointed crawl progress. The cursor points at the next page to
/// request, so an interrupted crawl resumes where it stopped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlState {
    pub casts: Vec<Cast>,
    pub cursor: Option<String>,
    pub page_count: u32,
}

/// Drives pagination against the cast search endpoint
pub struct CastSearchFetcher<C> {
    client: C,
    cache: KeyedCache,
    pacing: CrawlPacing,
    use_cache: bool,
}

impl<C: CastSearchClient> CastSearchFetcher<C> {
    #[must_use]
    pub fn new(client: C, cache: KeyedCache, pacing: CrawlPacing, use_cache: bool) -> Self {
        Self {
            client,
            cache,
            pacing,
            use_cache,
        }
    }

    /// Fetch every cast matching `search_text`, from cache where possible.
    ///
    /// Classifiable upstream failures (401/429/transient) never surface as
    /// errors; the crawl degrades to returning what was accumulated.
    pub async fn fetch(&self, search_text: &str) -> Result<Vec<Cast>> {
        let key = cast_cache_key(search_text);
        let mut state = CrawlState::default();

        if self.use_cache {
            if let Some(record) = self.cache.load_record::<CrawlState>(&key) {
                if record.complete && !record.payload.casts.is_empty() {
                    info!(
                        "Loaded {} casts from cache (saved at {})",
                        record.payload.casts.len(),
                        record.saved_at
                    );
                    info!("Use --no-cache to fetch fresh data");
                    return Ok(record.payload.casts);
                }
                if record.payload.cursor.is_some() {
                    info!(
                        "Resuming interrupted crawl at page {} ({} casts already fetched)",
                        record.payload.page_count + 1,
                        record.payload.casts.len()
                    );
                    state = record.payload;
                }
            }
        }

        info!("Searching casts for \"{search_text}\"");
        let complete = self.crawl(search_text, &mut state).await;
        self.cache.save_record(&key, &state, complete);

        info!(
            "Found {} casts across {} pages",
            state.casts.len(),
            state.page_count
        );
        Ok(state.casts)
    }

    /// Page through the endpoint until the cursor is exhausted. Returns
    /// `true` on natural completion, `false` when the crawl was aborted.
    async fn crawl(&self, search_text: &str, state: &mut CrawlState) -> bool {
        let key = cast_cache_key(search_text);
        let mut consecutive_errors = 0u32;

        loop {
            let page = self
                .client
                .search_page(search_text, state.cursor.as_deref())
                .await;

            match page {
                Ok(page) => {
                    consecutive_errors = 0;

                    if page.casts.is_empty() {
                        info!("No more results");
                        return true;
                    }

                    state.page_count += 1;
                    info!(
                        "Page {}: +{} casts (total: {})",
                        state.page_count,
                        page.casts.len(),
                        state.casts.len() + page.casts.len()
                    );
                    state.casts.extend(page.casts);
                    state.cursor = page.next_cursor;

                    if self.pacing.checkpoint_pages > 0
                        && state.page_count % self.pacing.checkpoint_pages == 0
                    {
                        self.cache.save_record(&key, state, false);
                        info!(
                            "Progress saved ({} pages, {} casts)",
                            state.page_count,
                            state.casts.len()
                        );
                    }

                    if state.cursor.is_none() {
                        return true;
                    }

                    sleep(self.pacing.page_interval).await;
                }
                Err(CastdropError::Unauthorized) => {
                    error!("Unauthorized (401): check the NEYNAR_API_KEY value");
                    return false;
                }
                Err(CastdropError::RateLimited) => {
                    warn!(
                        "Rate limit exceeded, waiting {:?}",
                        self.pacing.rate_limit_backoff
                    );
                    sleep(self.pacing.rate_limit_backoff).await;
                }
                Err(e) => {
                    consecutive_errors += 1;
                    warn!("Error fetching page {}: {e}", state.page_count + 1);
                    if consecutive_errors >= self.pacing.max_consecutive_errors {
                        error!("Too many consecutive errors, stopping the crawl");
                        return false;
                    }
                    sleep(self.pacing.error_backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::cache::CacheRecord;
    use crate::cache::CacheStore;
    use crate::cache::MemoryCacheStore;
    use crate::models::CastAuthor;
    use crate::search::client::SearchPage;

    /// Replays a scripted sequence of page responses and records the
    /// cursor each request was made with
    struct ScriptedClient {
        responses: Mutex<VecDeque<Result<SearchPage>>>,
        cursors_seen: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<SearchPage>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                cursors_seen: Mutex::new(Vec::new()),
            })
        }

        fn cursors_seen(&self) -> Vec<Option<String>> {
            self.cursors_seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CastSearchClient for ScriptedClient {
        async fn search_page(&self, _query: &str, cursor: Option<&str>) -> Result<SearchPage> {
            self.cursors_seen
                .lock()
                .unwrap()
                .push(cursor.map(ToString::to_string));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted client ran out of responses")
        }
    }

    fn cast(fid: u64) -> Cast {
        Cast {
            author: Some(CastAuthor {
                fid,
                username: Some(format!("user{fid}")),
                display_name: None,
                follower_count: 0,
                pfp_url: None,
                verified_addresses: Default::default(),
            }),
            text: "$TEST".to_string(),
            hash: None,
        }
    }

    fn page(fids: std::ops::Range<u64>, next_cursor: Option<&str>) -> SearchPage {
        SearchPage {
            casts: fids.map(cast).collect(),
            next_cursor: next_cursor.map(ToString::to_string),
        }
    }

    fn load_state(store: &MemoryCacheStore, key: &str) -> CacheRecord<CrawlState> {
        serde_json::from_str(&store.load(key).expect("no cache record")).unwrap()
    }

    #[tokio::test]
    async fn test_crawl_accumulates_pages_until_exhausted() {
        let client = ScriptedClient::new(vec![
            Ok(page(0..100, Some("c1"))),
            Ok(page(100..200, Some("c2"))),
            Ok(page(200..200, None)),
        ]);
        let store = Arc::new(MemoryCacheStore::new());
        let fetcher = CastSearchFetcher::new(
            client.clone(),
            KeyedCache::new(Box::new(store.clone())),
            CrawlPacing::immediate(),
            true,
        );

        let casts = fetcher.fetch("$TEST").await.unwrap();
        assert_eq!(casts.len(), 200);

        let record = load_state(&store, &cast_cache_key("$TEST"));
        assert!(record.complete);
        assert_eq!(record.payload.casts.len(), 200);
        assert_eq!(record.payload.page_count, 2);

        // The third request carried the second page's cursor
        assert_eq!(
            client.cursors_seen(),
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_rate_limit_retries_same_page_without_counting() {
        // With a ceiling of one error, the crawl only completes if the
        // 429 left the consecutive-error counter untouched
        let client = ScriptedClient::new(vec![
            Err(CastdropError::RateLimited),
            Ok(page(0..2, None)),
        ]);
        let pacing = CrawlPacing {
            max_consecutive_errors: 1,
            ..CrawlPacing::immediate()
        };
        let store = Arc::new(MemoryCacheStore::new());
        let fetcher = CastSearchFetcher::new(
            client.clone(),
            KeyedCache::new(Box::new(store.clone())),
            pacing,
            true,
        );

        let casts = fetcher.fetch("$TEST").await.unwrap();
        assert_eq!(casts.len(), 2);
        assert!(load_state(&store, &cast_cache_key("$TEST")).complete);

        // Same page requested twice (no cursor advance on 429)
        assert_eq!(client.cursors_seen(), vec![None, None]);
    }

    #[tokio::test]
    async fn test_unauthorized_halts_but_keeps_accumulated_casts() {
        let client = ScriptedClient::new(vec![
            Ok(page(0..5, Some("c1"))),
            Err(CastdropError::Unauthorized),
        ]);
        let store = Arc::new(MemoryCacheStore::new());
        let fetcher = CastSearchFetcher::new(
            client.clone(),
            KeyedCache::new(Box::new(store.clone())),
            CrawlPacing::immediate(),
            true,
        );

        let casts = fetcher.fetch("$TEST").await.unwrap();
        assert_eq!(casts.len(), 5);
        assert_eq!(client.cursors_seen().len(), 2);

        let record = load_state(&store, &cast_cache_key("$TEST"));
        assert!(!record.complete);
        assert_eq!(record.payload.cursor.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_consecutive_errors_abort_the_crawl() {
        let client = ScriptedClient::new(vec![
            Err(CastdropError::Http("boom".into())),
            Err(CastdropError::Http("boom".into())),
            Err(CastdropError::Http("boom".into())),
        ]);
        let store = Arc::new(MemoryCacheStore::new());
        let fetcher = CastSearchFetcher::new(
            client.clone(),
            KeyedCache::new(Box::new(store.clone())),
            CrawlPacing::immediate(),
            true,
        );

        let casts = fetcher.fetch("$TEST").await.unwrap();
        assert!(casts.is_empty());
        // Exactly three attempts, then abort
        assert_eq!(client.cursors_seen().len(), 3);
        assert!(!load_state(&store, &cast_cache_key("$TEST")).complete);
    }

    #[tokio::test]
    async fn test_resumes_from_checkpointed_cursor() {
        let store = Arc::new(MemoryCacheStore::new());
        {
            let cache = KeyedCache::new(Box::new(store.clone()));
            let checkpoint = CrawlState {
                casts: (0..10).map(cast).collect(),
                cursor: Some("c10".to_string()),
                page_count: 1,
            };
            cache.save_record(&cast_cache_key("$TEST"), &checkpoint, false);
        }

        let client = ScriptedClient::new(vec![Ok(page(10..15, None))]);
        let fetcher = CastSearchFetcher::new(
            client.clone(),
            KeyedCache::new(Box::new(store.clone())),
            CrawlPacing::immediate(),
            true,
        );

        let casts = fetcher.fetch("$TEST").await.unwrap();
        assert_eq!(casts.len(), 15);

        // The single request resumed from the checkpointed cursor
        assert_eq!(client.cursors_seen(), vec![Some("c10".to_string())]);
        let record = load_state(&store, &cast_cache_key("$TEST"));
        assert!(record.complete);
        assert_eq!(record.payload.page_count, 2);
    }

    #[tokio::test]
    async fn test_complete_cache_short_circuits() {
        let store = Arc::new(MemoryCacheStore::new());
        {
            let cache = KeyedCache::new(Box::new(store.clone()));
            let state = CrawlState {
                casts: (0..3).map(cast).collect(),
                cursor: None,
                page_count: 1,
            };
            cache.save_record(&cast_cache_key("$TEST"), &state, true);
        }

        let client = ScriptedClient::new(vec![]);
        let fetcher = CastSearchFetcher::new(
            client.clone(),
            KeyedCache::new(Box::new(store)),
            CrawlPacing::immediate(),
            true,
        );

        let casts = fetcher.fetch("$TEST").await.unwrap();
        assert_eq!(casts.len(), 3);
        assert!(client.cursors_seen().is_empty());
    }

    #[tokio::test]
    async fn test_no_cache_flag_recrawls() {
        let store = Arc::new(MemoryCacheStore::new());
        {
            let cache = KeyedCache::new(Box::new(store.clone()));
            let state = CrawlState {
                casts: (0..3).map(cast).collect(),
                cursor: None,
                page_count: 1,
            };
            cache.save_record(&cast_cache_key("$TEST"), &state, true);
        }

        let client = ScriptedClient::new(vec![Ok(page(0..7, None))]);
        let fetcher = CastSearchFetcher::new(
            client.clone(),
            KeyedCache::new(Box::new(store)),
            CrawlPacing::immediate(),
            false,
        );

        let casts = fetcher.fetch("$TEST").await.unwrap();
        assert_eq!(casts.len(), 7);
        assert_eq!(client.cursors_seen(), vec![None]);
    }
}
