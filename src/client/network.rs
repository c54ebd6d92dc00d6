//! Outgoing-request observation.
//!
//! Instead of patching the page's fetch function, callers route their HTTP
//! traffic through [`ObservedClient`], which reports each completed request to
//! its listeners. Listeners decide for themselves whether a URL matters.

use regex::Regex;
use reqwest::{Client, Request, RequestBuilder, Response};
use std::sync::Arc;
use tracing::trace;

/// Default cart/checkout API pattern: Store API routes and fragment AJAX.
pub const DEFAULT_API_PATTERN: &str = r"(?i)/wc/store/|[?&]wc-ajax=";

pub fn default_api_pattern() -> Regex {
    Regex::new(DEFAULT_API_PATTERN).expect("default API pattern compiles")
}

pub trait RequestListener: Send + Sync {
    fn request_completed(&self, url: &str);
}

/// HTTP client middleware that notifies listeners when a request completes.
#[derive(Clone, Default)]
pub struct ObservedClient {
    client: Client,
    listeners: Vec<Arc<dyn RequestListener>>,
}

impl ObservedClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            listeners: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn RequestListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    pub async fn send(&self, builder: RequestBuilder) -> reqwest::Result<Response> {
        let request = builder.build()?;
        self.execute(request).await
    }

    /// Listeners hear about a request only once a response arrived; transport
    /// failures are returned without notification.
    pub async fn execute(&self, request: Request) -> reqwest::Result<Response> {
        let url = request.url().to_string();
        let response = self.client.execute(request).await?;

        trace!(%url, status = %response.status(), "observed request completed");
        self.notify(&url);
        Ok(response)
    }

    fn notify(&self, url: &str) {
        for listener in &self.listeners {
            listener.request_completed(url);
        }
    }
}
