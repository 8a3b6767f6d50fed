//! Token possession checks with endpoint rotation and a persistent cache
//!
//! Each candidate address is checked at most once per token: verdicts land
//! in a cache keyed `address#token` (both lowercase) that is persisted
//! periodically, so a re-run pays nothing for already-checked addresses.

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::time::sleep;
use tracing::info;
use tracing::warn;

use crate::cache::balance_cache_key;
use crate::cache::KeyedCache;
use crate::chain::client::BalanceClient;
use crate::config::ChainConfig;
use crate::config::ExhaustedFallback;
use crate::models::CanonicalUser;
use crate::models::EligibilityReason;
use crate::models::EligibilityRecord;
use crate::models::NO_VERIFIED_ADDRESS;
use crate::Result;

/// Retry and pacing policy for on-chain checks
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Each configured endpoint is tried roughly this many times
    pub attempts_per_endpoint: u32,
    /// First retry backoff, doubled on every attempt
    pub base_backoff: Duration,
    /// Backoff ceiling
    pub max_backoff: Duration,
    /// Delay after each fresh (uncached) check, bounding the RPC rate
    pub check_interval: Duration,
    /// Persist the balance cache every N users
    pub checkpoint_users: usize,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &ChainConfig) -> Self {
        Self {
            attempts_per_endpoint: config.attempts_per_endpoint,
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            check_interval: Duration::from_millis(config.check_interval_ms),
            checkpoint_users: config.checkpoint_users,
        }
    }

    /// Zero-delay policy, for deterministic tests
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            attempts_per_endpoint: 2,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            check_interval: Duration::ZERO,
            checkpoint_users: 25,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ChainConfig::default())
    }
}

/// Determines which users do not hold the token on any verified address
pub struct BalanceVerifier<B> {
    client: B,
    rpc_urls: Vec<String>,
    /// Round-robin cursor over `rpc_urls`, advanced on failure only
    rotation: AtomicUsize,
    policy: RetryPolicy,
    exhausted_fallback: ExhaustedFallback,
    cache: KeyedCache,
    use_cache: bool,
}

impl<B: BalanceClient> BalanceVerifier<B> {
    #[must_use]
    pub fn new(
        client: B,
        rpc_urls: Vec<String>,
        policy: RetryPolicy,
        exhausted_fallback: ExhaustedFallback,
        cache: KeyedCache,
        use_cache: bool,
    ) -> Self {
        Self {
            client,
            rpc_urls,
            rotation: AtomicUsize::new(0),
            policy,
            exhausted_fallback,
            cache,
            use_cache,
        }
    }

    /// How many times the endpoint rotation has advanced
    #[must_use]
    pub fn rotation(&self) -> usize {
        self.rotation.load(Ordering::Relaxed)
    }

    /// Check every user and return records for the non-holders only.
    /// Holders are silently excluded.
    pub async fn verify(
        &self,
        users: &[CanonicalUser],
        token_address: &str,
    ) -> Result<Vec<EligibilityRecord>> {
        let key = balance_cache_key(token_address);
        let token = token_address.to_lowercase();

        let mut balances: HashMap<String, bool> = HashMap::new();
        if self.use_cache {
            if let Some(record) = self.cache.load_record::<HashMap<String, bool>>(&key) {
                info!("Loaded {} cached balance checks", record.payload.len());
                balances = record.payload;
            }
        }

        let mut results = Vec::new();
        let mut checked = 0usize;
        let mut cache_hits = 0usize;
        let mut new_checks = 0usize;

        for user in users {
            checked += 1;
            if self.policy.checkpoint_users > 0 && checked % self.policy.checkpoint_users == 0 {
                info!("Progress: {}/{} users", checked, users.len());
                self.cache.save_record(&key, &balances, false);
            }

            let eth_addresses = &user.verified_addresses.eth_addresses;
            if eth_addresses.is_empty() {
                results.push(EligibilityRecord {
                    user: user.clone(),
                    wallet_address: NO_VERIFIED_ADDRESS.to_string(),
                    reason: EligibilityReason::NoAddress,
                });
                continue;
            }

            let mut holds = false;
            let mut checked_address = eth_addresses[0].clone();

            for address in eth_addresses {
                let cache_key = format!("{}#{}", address.to_lowercase(), token);

                if let Some(&cached) = balances.get(&cache_key) {
                    holds = cached;
                    cache_hits += 1;
                } else {
                    holds = self.check_address(address, token_address).await;
                    balances.insert(cache_key, holds);
                    new_checks += 1;
                    sleep(self.policy.check_interval).await;
                }

                checked_address = address.clone();
                if holds {
                    // A holder on any address is a holder
                    break;
                }
            }

            if !holds {
                results.push(EligibilityRecord {
                    user: user.clone(),
                    wallet_address: checked_address,
                    reason: EligibilityReason::NoToken,
                });
            }
        }

        self.cache.save_record(&key, &balances, true);

        info!(
            "Balance check complete: {} users, {} cache hits, {} new checks, {} eligible",
            checked,
            cache_hits,
            new_checks,
            results.len()
        );
        Ok(results)
    }

    /// Resolve a single address to a holdings verdict. Never raises:
    /// exhausting every endpoint falls back to the configured verdict.
    async fn check_address(&self, wallet_address: &str, token_address: &str) -> bool {
        let max_attempts = self.rpc_urls.len() as u32 * self.policy.attempts_per_endpoint;

        for attempt in 0..max_attempts {
            let index = self.rotation.load(Ordering::Relaxed) % self.rpc_urls.len();
            let rpc_url = &self.rpc_urls[index];

            match self
                .client
                .holds_token(rpc_url, token_address, wallet_address)
                .await
            {
                Ok(holds) => return holds,
                Err(e) => {
                    // Rotate to the next provider rather than hammering this one
                    self.rotation.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "Balance check via {rpc_url} failed (attempt {}/{max_attempts}): {e}",
                        attempt + 1
                    );
                    if attempt + 1 < max_attempts {
                        sleep(exponential_backoff(
                            self.policy.base_backoff,
                            attempt,
                            self.policy.max_backoff,
                        ))
                        .await;
                    }
                }
            }
        }

        warn!(
            "All RPC attempts failed for {wallet_address}, falling back to {:?}",
            self.exhausted_fallback
        );
        matches!(self.exhausted_fallback, ExhaustedFallback::Holder)
    }
}

fn exponential_backoff(base: Duration, attempt: u32, max: Duration) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt)).min(max)
}
