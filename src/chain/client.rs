//! Read-only token balance reads over JSON-RPC

use std::sync::Arc;

use async_trait::async_trait;
use ethers::prelude::abigen;
use ethers::providers::Http;
use ethers::providers::Provider;
use ethers::types::Address;
use ethers::types::U256;

use crate::CastdropError;
use crate::Result;

abigen!(
    IERC20,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
    ]"#
);

/// A token balance source behind a single RPC endpoint
#[async_trait]
pub trait BalanceClient: Send + Sync {
    /// Whether `wallet_address` holds a strictly-positive balance of the
    /// token at `token_address`, read through `rpc_url`
    async fn holds_token(
        &self,
        rpc_url: &str,
        token_address: &str,
        wallet_address: &str,
    ) -> Result<bool>;
}

#[async_trait]
impl<B: BalanceClient + ?Sized> BalanceClient for Arc<B> {
    async fn holds_token(
        &self,
        rpc_url: &str,
        token_address: &str,
        wallet_address: &str,
    ) -> Result<bool> {
        (**self).holds_token(rpc_url, token_address, wallet_address).await
    }
}

/// ERC-20 `balanceOf` client. A fresh provider is built per call so a bad
/// endpoint never poisons later attempts against another one.
#[derive(Debug, Clone, Copy, Default)]
pub struct EthBalanceClient;

impl EthBalanceClient {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BalanceClient for EthBalanceClient {
    async fn holds_token(
        &self,
        rpc_url: &str,
        token_address: &str,
        wallet_address: &str,
    ) -> Result<bool> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| CastdropError::Rpc(format!("invalid RPC url {rpc_url}: {e}")))?;

        let token: Address = token_address
            .parse()
            .map_err(|e| CastdropError::Rpc(format!("invalid token address {token_address}: {e}")))?;
        let wallet: Address = wallet_address
            .parse()
            .map_err(|e| CastdropError::Rpc(format!("invalid wallet address {wallet_address}: {e}")))?;

        let contract = IERC20::new(token, Arc::new(provider));
        let balance: U256 = contract
            .balance_of(wallet)
            .call()
            .await
            .map_err(|e| CastdropError::Rpc(format!("balanceOf via {rpc_url} failed: {e}")))?;

        Ok(balance > U256::zero())
    }
}
