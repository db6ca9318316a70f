//! HTTP client for the remote menu endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::models::{MenuItem, MenuResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Canonical location of the menu document.
pub const DEFAULT_MENU_URL: &str =
    "https://raw.githubusercontent.com/Meta-Mobile-Developer-PC/Working-With-Data-API/main/capstone.json";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Anything that can produce the canonical menu.
///
/// Implementations are best-effort: failures are logged and reported as an
/// empty menu, never as an error.
#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn fetch_menu(&self) -> Vec<MenuItem>;
}

/// Client for the menu endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct MenuClient {
    client: Client,
    menu_url: String,
}

impl MenuClient {
    pub fn new(menu_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            menu_url: menu_url.into(),
        })
    }

    pub fn menu_url(&self) -> &str {
        &self.menu_url
    }

    /// Fetch the menu, reporting failures to the caller.
    pub async fn try_fetch_menu(&self) -> Result<Vec<MenuItem>, ApiError> {
        let body = self.get_text(&self.menu_url).await?;
        let items = parse_menu(&body)?;
        debug!(count = items.len(), "Menu fetched");
        Ok(items)
    }

    /// GET a URL as text, backing off on rate limiting.
    async fn get_text(&self, url: &str) -> Result<String, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.text().await?);
            }

            if status.as_u16() == 429 {
                retries += 1;
                if retries > MAX_RATE_LIMIT_RETRIES {
                    return Err(ApiError::RateLimited);
                }
                warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2; // Exponential backoff
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
    }
}

#[async_trait]
impl MenuSource for MenuClient {
    async fn fetch_menu(&self) -> Vec<MenuItem> {
        match self.try_fetch_menu().await {
            Ok(items) => items,
            Err(e) => {
                warn!(url = %self.menu_url, error = %e, "Failed to fetch menu, continuing with empty menu");
                Vec::new()
            }
        }
    }
}

/// Parse the menu document. Image fields are left as remote file names.
pub fn parse_menu(body: &str) -> Result<Vec<MenuItem>, ApiError> {
    let parsed: MenuResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse menu: {}", e)))?;
    Ok(parsed.menu)
}

// ============================================================================
// Tests
// ============================================================================
