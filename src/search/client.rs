//! Cast search API client

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::Cast;
use crate::CastdropError;
use crate::Result;

/// One page of search results plus the cursor to the next one
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub casts: Vec<Cast>,
    pub next_cursor: Option<String>,
}

/// A cursor-paginated cast search endpoint
#[async_trait]
pub trait CastSearchClient: Send + Sync {
    /// Fetch one page of casts matching `query`, starting at `cursor`
    async fn search_page(&self, query: &str, cursor: Option<&str>) -> Result<SearchPage>;
}

#[async_trait]
impl<C: CastSearchClient + ?Sized> CastSearchClient for Arc<C> {
    async fn search_page(&self, query: &str, cursor: Option<&str>) -> Result<SearchPage> {
        (**self).search_page(query, cursor).await
    }
}

/// Neynar cast search client
pub struct NeynarClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl NeynarClient {
    #[must_use]
    pub fn new(base_url: &str, api_key: &str, page_size: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Option<SearchResult>,
    #[serde(default)]
    casts: Option<Vec<Cast>>,
    #[serde(default)]
    next: Option<NextCursor>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    casts: Vec<Cast>,
    #[serde(default)]
    next: Option<NextCursor>,
}

#[derive(Debug, Deserialize)]
struct NextCursor {
    #[serde(default)]
    cursor: Option<String>,
}

impl SearchResponse {
    /// Casts live under `result.casts`; some responses put them top-level
    fn into_page(self) -> SearchPage {
        let (casts, next) = match self.result {
            Some(result) => (result.casts, result.next),
            None => (self.casts.unwrap_or_default(), self.next),
        };
        SearchPage {
            casts,
            next_cursor: next.and_then(|n| n.cursor),
        }
    }
}

#[async_trait]
impl CastSearchClient for NeynarClient {
    async fn search_page(&self, query: &str, cursor: Option<&str>) -> Result<SearchPage> {
        let page_size = self.page_size.to_string();
        let mut params = vec![
            ("q", query),
            ("limit", page_size.as_str()),
            ("mode", "literal"),
            ("sort_type", "desc_chron"),
        ];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }

        let response = self
            .client
            .get(&self.base_url)
            .header("api_key", &self.api_key)
            .header("accept", "application/json")
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CastdropError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CastdropError::RateLimited);
        }
        if !status.is_success() {
            return Err(CastdropError::Http(format!(
                "Cast search failed: HTTP {status}"
            )));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.into_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_nested_result_shape() {
        let body: SearchResponse = serde_json::from_str(
            r#"{
                "result": {
                    "casts": [{"author": {"fid": 1, "username": "alice"}, "text": "gm"}],
                    "next": {"cursor": "abc123"}
                }
            }"#,
        )
        .unwrap();

        let page = body.into_page();
        assert_eq!(page.casts.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_parses_top_level_shape() {
        let body: SearchResponse = serde_json::from_str(
            r#"{
                "casts": [{"text": "gm"}, {"text": "gn"}],
                "next": {"cursor": null}
            }"#,
        )
        .unwrap();

        let page = body.into_page();
        assert_eq!(page.casts.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_parses_empty_response() {
        let body: SearchResponse = serde_json::from_str("{}").unwrap();
        let page = body.into_page();
        assert!(page.casts.is_empty());
        assert!(page.next_cursor.is_none());
    }
}
