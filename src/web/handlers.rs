use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{
    config::{COUNT_ACTION, ClientConfig, FRAGMENTS_ACTION},
    core::{BADGE_CLASS, CartCount},
    patcher::{badge_fragment, patch},
    web::{AjaxResponse, Result, WebError, state::AppState},
};

/// Element id of the embedded browser configuration.
pub const CONFIG_SCRIPT_ID: &str = "cart-badge-config";

#[derive(Debug, Deserialize)]
pub struct AjaxRequest {
    pub action: Option<String>,
    #[serde(alias = "security", alias = "_ajax_nonce")]
    pub nonce: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FragmentsPayload {
    pub count: CartCount,
    pub fragments: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub async fn healthcheck() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

/// Asynchronous action endpoint. The anti-forgery token is checked before the
/// action is even looked at.
pub async fn ajax(
    State(state): State<AppState>,
    form: std::result::Result<Form<AjaxRequest>, FormRejection>,
) -> Result<Response> {
    let Form(request) = form.map_err(|err| WebError::Input(err.body_text()))?;

    if let Err(err) = state.config.nonce.verify(request.nonce.as_deref()) {
        warn!(action = ?request.action, "rejected action with invalid nonce");
        return Err(err.into());
    }

    let action = request.action.ok_or(WebError::MissingAction)?;
    debug!(%action, "dispatching action");

    match action.as_str() {
        COUNT_ACTION => {
            let count = state.cart.item_count().await?;
            Ok(Json(AjaxResponse::ok(count)).into_response())
        }
        FRAGMENTS_ACTION => {
            let count = state.cart.item_count().await?;
            let mut fragments = BTreeMap::new();
            fragments.insert(format!("span.{BADGE_CLASS}"), badge_fragment(count));
            Ok(Json(AjaxResponse::ok(FragmentsPayload { count, fragments })).into_response())
        }
        _ => Err(WebError::UnknownAction(action)),
    }
}

pub async fn client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(state.config.client_config(""))
}

/// Renders the theme navigation with the live count patched in, followed by
/// the browser configuration for the reconciliation loop.
pub async fn navigation(State(state): State<AppState>) -> Html<String> {
    let count = match state.cart.item_count().await {
        Ok(count) => count,
        Err(err) => {
            warn!(error = %err, "cart count unavailable, rendering navigation without badge");
            CartCount::ZERO
        }
    };

    let nav = patch(&state.config.nav_template, count);
    let config = config_script(&state.config.client_config(""));

    Html(format!("<nav>{nav}</nav>\n{config}"))
}

fn config_script(config: &ClientConfig) -> String {
    // `serde_json` leaves `/` alone, so `</script>` inside a value must be
    // broken up by hand.
    let json = serde_json::to_string(config)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");
    format!(r#"<script id="{CONFIG_SCRIPT_ID}" type="application/json">{json}</script>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_script_cannot_close_early() {
        let script = config_script(&ClientConfig {
            ajax_url: "/ajax</script><script>alert(1)".to_string(),
            nonce: "n".to_string(),
            action: COUNT_ACTION.to_string(),
        });
        assert_eq!(script.matches("</script>").count(), 1);
        assert!(script.starts_with(r#"<script id="cart-badge-config""#));
    }
}
