use crate::core::CartCount;
use crate::nonce::Nonce;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Action identifier for the live count query.
pub const COUNT_ACTION: &str = "cart_badge_get_count";

/// Action identifier for the fragment-refresh query.
pub const FRAGMENTS_ACTION: &str = "cart_badge_get_fragments";

pub const DEFAULT_AJAX_PATH: &str = "/wp-admin/admin-ajax.php";

pub const DEFAULT_NAV_TEMPLATE: &str = concat!(
    r#"<ul class="menu">"#,
    r#"<li class="menu-item"><a href="/">Home</a></li>"#,
    r#"<li class="menu-item"><a href="/shop/">Shop</a></li>"#,
    r#"<li class="menu-item"><a href="/cart/">Cart</a></li>"#,
    r#"</ul>"#,
);

/// Server configuration
///
/// Constructed once at startup and handed to the router state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Path of the asynchronous action endpoint
    pub ajax_path: String,

    /// Anti-forgery token handed to the page
    pub nonce: Nonce,

    /// Navigation markup produced by the theme
    pub nav_template: String,

    /// Count seeded into the bundled in-memory cart store
    pub initial_count: CartCount,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ajax_path: DEFAULT_AJAX_PATH.to_string(),
            nonce: Nonce::generate(),
            nav_template: DEFAULT_NAV_TEMPLATE.to_string(),
            initial_count: CartCount::ZERO,
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::new();

        if let Ok(host) = env::var("APP_HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("APP_PORT") {
            config.port = port.parse::<u16>().context("APP_PORT must be a valid u16")?;
        }

        if let Ok(path) = env::var("CART_BADGE_AJAX_PATH") {
            if !path.starts_with('/') {
                anyhow::bail!("CART_BADGE_AJAX_PATH must start with '/'");
            }
            config.ajax_path = path;
        }

        if let Ok(secret) = env::var("CART_BADGE_NONCE") {
            config.nonce = Nonce::from_secret(secret).context("CART_BADGE_NONCE is invalid")?;
        }

        if let Ok(path) = env::var("CART_BADGE_NAV_TEMPLATE") {
            config.nav_template = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read navigation template {path}"))?;
        }

        if let Ok(count) = env::var("CART_BADGE_INITIAL_COUNT") {
            let count = count
                .parse::<u64>()
                .context("CART_BADGE_INITIAL_COUNT must be a non-negative integer")?;
            config.initial_count = CartCount::new(count);
        }

        Ok(config)
    }

    /// Set the bind host
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Set the bind port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the action endpoint path
    pub fn ajax_path(mut self, path: &str) -> Self {
        self.ajax_path = path.to_string();
        self
    }

    /// Set the anti-forgery token
    pub fn nonce(mut self, nonce: Nonce) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set the navigation markup
    pub fn nav_template(mut self, markup: &str) -> Self {
        self.nav_template = markup.to_string();
        self
    }

    /// Set the seeded cart count
    pub fn initial_count(mut self, count: CartCount) -> Self {
        self.initial_count = count;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configuration exposed to the page. `origin` is prepended to the
    /// endpoint path; pass an empty string for a same-origin relative URL.
    pub fn client_config(&self, origin: &str) -> ClientConfig {
        ClientConfig {
            ajax_url: format!("{}{}", origin.trim_end_matches('/'), self.ajax_path),
            nonce: self.nonce.as_str().to_string(),
            action: COUNT_ACTION.to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Browser-exposed configuration, injected once per page and immutable for
/// its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub ajax_url: String,
    pub nonce: String,
    pub action: String,
}
