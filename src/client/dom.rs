//! The slice of the page DOM the reconciliation loop touches: navigation
//! anchors, their badges, the cart/checkout containers and the outgoing
//! notification event.

use crate::core::{BADGE_CLASS, BADGE_UPDATED_EVENT, CartCount};
use crate::patcher::anchor::scan_anchors;
use crate::patcher::{badge_fragment, escape_html};
use regex::Regex;

lazy_static::lazy_static! {
    static ref COUNT_ATTR_RE: Regex =
        Regex::new(r#"(?i)data-cart-count\s*=\s*["']?(\d+)"#).expect("count attr pattern compiles");
}

/// Inline badge element inside a cart anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub class: String,
    /// Value of the `data-cart-count` attribute.
    pub count: CartCount,
    /// Displayed text.
    pub text: String,
}

impl Badge {
    pub fn new(count: CartCount) -> Self {
        Self {
            class: BADGE_CLASS.to_string(),
            count,
            text: count.to_string(),
        }
    }

    pub fn set(&mut self, count: CartCount) {
        self.count = count;
        self.text = count.to_string();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
    pub badge: Option<Badge>,
}

impl Anchor {
    pub fn new(href: &str, text: &str) -> Self {
        Self {
            href: href.to_string(),
            text: text.to_string(),
            badge: None,
        }
    }

    /// Client-side cart link test: `href` or visible text contains "cart".
    pub fn is_cart_link(&self) -> bool {
        self.href.to_ascii_lowercase().contains("cart")
            || self.text.to_lowercase().contains("cart")
    }
}

/// Custom notification event fired after every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeEvent {
    pub name: &'static str,
    pub count: CartCount,
}

impl BadgeEvent {
    pub fn updated(count: CartCount) -> Self {
        Self {
            name: BADGE_UPDATED_EVENT,
            count,
        }
    }
}

/// Page access used by the renderer and the loop.
pub trait Dom: Send + 'static {
    fn anchors(&self) -> &[Anchor];

    fn anchors_mut(&mut self) -> &mut [Anchor];

    /// Class names of cart/checkout containers currently in the page.
    fn containers(&self) -> Vec<String>;

    fn dispatch(&mut self, event: BadgeEvent);
}

/// Headless page model.
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    anchors: Vec<Anchor>,
    containers: Vec<String>,
    events: Vec<BadgeEvent>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the anchor list from server-rendered markup, picking up any
    /// badge the server already embedded.
    pub fn from_markup(markup: &str) -> Self {
        let anchors = scan_anchors(markup)
            .into_iter()
            .map(|span| {
                let badge = span.badge.as_ref().and_then(|range| {
                    let raw = &markup[range.clone()];
                    let caps = COUNT_ATTR_RE.captures(raw)?;
                    let count = caps.get(1)?.as_str().parse::<u64>().ok()?;
                    Some(Badge::new(CartCount::new(count)))
                });
                Anchor {
                    href: span.href.unwrap_or_default(),
                    text: collapse_whitespace(&span.text),
                    badge,
                }
            })
            .collect();

        Self {
            anchors,
            ..Self::default()
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    pub fn with_container(mut self, class: &str) -> Self {
        self.containers.push(class.to_string());
        self
    }

    /// Simulates a container mounted after page load.
    pub fn mount_container(&mut self, class: &str) {
        self.containers.push(class.to_string());
    }

    pub fn events(&self) -> &[BadgeEvent] {
        &self.events
    }

    pub fn badges(&self) -> Vec<&Badge> {
        self.anchors.iter().filter_map(|a| a.badge.as_ref()).collect()
    }

    /// Serializes the anchors back to markup, badges included.
    pub fn to_markup(&self) -> String {
        self.anchors
            .iter()
            .map(|anchor| {
                let mut html = format!(
                    r#"<a href="{}">{}"#,
                    escape_html(&anchor.href),
                    escape_html(&anchor.text)
                );
                if let Some(badge) = &anchor.badge {
                    html.push(' ');
                    html.push_str(&badge_fragment(badge.count));
                }
                html.push_str("</a>");
                html
            })
            .collect()
    }
}

impl Dom for MemoryDom {
    fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    fn anchors_mut(&mut self) -> &mut [Anchor] {
        &mut self.anchors
    }

    fn containers(&self) -> Vec<String> {
        self.containers.clone()
    }

    fn dispatch(&mut self, event: BadgeEvent) {
        self.events.push(event);
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
