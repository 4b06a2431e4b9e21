//! Click analytics for movie cards.
//!
//! Tracking is best effort. Callers never see an error from this module:
//! a missing endpoint is logged and skipped, a failed request is logged
//! and dropped, and the response body is never read.

use reqwest::{Client, Url};
use thiserror::Error;

use crate::config::AppConfig;

pub const ELEMENT_TYPE: &str = "movie_card";
pub const DIRECT_REFERRER: &str = "direct";

#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("analytics endpoint not configured")]
    NotConfigured,
    #[error("invalid analytics endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("http error: {0}")]
    Http(String),
}

/// Where the click happened. Owned by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub page_url: String,
    pub user_agent: String,
    pub referrer: Option<String>,
}

impl PageContext {
    pub fn from_config(config: &AppConfig, user_agent: impl Into<String>) -> Self {
        Self {
            page_url: config.page_url().to_string(),
            user_agent: user_agent.into(),
            referrer: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardClick {
    pub element_name: String,
    pub page_url: String,
    pub user_agent: String,
    pub referrer: Option<String>,
}

impl CardClick {
    pub fn new(element_name: impl Into<String>, page: &PageContext) -> Self {
        Self {
            element_name: element_name.into(),
            page_url: page.page_url.clone(),
            user_agent: page.user_agent.clone(),
            referrer: page.referrer.clone(),
        }
    }

    fn referrer_or_direct(&self) -> &str {
        match self.referrer.as_deref() {
            Some(referrer) if !referrer.is_empty() => referrer,
            _ => DIRECT_REFERRER,
        }
    }
}

/// What happened to a beacon. Only logged and asserted on in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconOutcome {
    Skipped,
    Delivered,
    Failed,
}

#[derive(Clone)]
pub struct ClickBeacon {
    endpoint: Option<String>,
    client: Client,
}

impl ClickBeacon {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        Self {
            endpoint,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.analytics_url.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn request_url(&self, click: &CardClick) -> Result<Url, BeaconError> {
        let endpoint = self.endpoint.as_deref().ok_or(BeaconError::NotConfigured)?;
        Url::parse_with_params(
            endpoint,
            [
                ("element_name", click.element_name.as_str()),
                ("element_type", ELEMENT_TYPE),
                ("page_url", click.page_url.as_str()),
                ("user_agent", click.user_agent.as_str()),
                ("referrer", click.referrer_or_direct()),
            ],
        )
        .map_err(|err| BeaconError::InvalidEndpoint(format!("{endpoint}: {err}")))
    }

    /// Posts the click and reports what happened. Never fails.
    pub async fn send(&self, click: &CardClick) -> BeaconOutcome {
        match self.deliver(click).await {
            Ok(()) => {
                tracing::debug!(title = %click.element_name, "card click tracked");
                BeaconOutcome::Delivered
            }
            Err(err @ (BeaconError::NotConfigured | BeaconError::InvalidEndpoint(_))) => {
                tracing::warn!(title = %click.element_name, "click tracking skipped: {err}");
                BeaconOutcome::Skipped
            }
            Err(err) => {
                tracing::error!(title = %click.element_name, "failed to track card click: {err}");
                BeaconOutcome::Failed
            }
        }
    }

    /// Spawns `send` on the current runtime and returns immediately.
    pub fn fire(&self, click: CardClick) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let beacon = self.clone();
                handle.spawn(async move {
                    beacon.send(&click).await;
                });
            }
            Err(_) => {
                tracing::warn!(title = %click.element_name, "no async runtime, click not tracked");
            }
        }
    }

    async fn deliver(&self, click: &CardClick) -> Result<(), BeaconError> {
        let url = self.request_url(click)?;
        // status and body are opaque to us
        self.client
            .post(url)
            .send()
            .await
            .map_err(|err| BeaconError::Http(err.to_string()))?;
        Ok(())
    }
}
