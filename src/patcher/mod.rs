//! Server-side navigation markup patcher.
//!
//! Takes the opaque navigation fragment produced by the theme and the live
//! cart count, finds the anchor that represents the cart and places a count
//! badge right before its closing tag. Matching is best-effort: the fragment's
//! shape is owned by the templating layer, so the rules are tried in a fixed
//! fallback order and only the first rule that matches anything is applied.
//!
//! Patching never fails. When nothing matches, the input comes back as-is.

pub mod anchor;

use crate::core::{BADGE_CLASS, BADGE_COUNT_ATTR, CartCount};
use std::borrow::Cow;
use tracing::debug;

pub use anchor::{AnchorRule, AnchorSpan, scan_anchors, select_cart_anchor};

/// Patches `fragment` so its cart anchor shows `count`.
///
/// # Examples
///
/// ```
/// use cartbadge::{CartCount, patcher::patch};
///
/// let html = patch(r#"<a href="/cart">Cart</a>"#, CartCount::new(2));
/// assert_eq!(
///     html,
///     r#"<a href="/cart">Cart <span class="cart-count-badge" data-cart-count="2">2</span></a>"#
/// );
/// ```
pub fn patch(fragment: &str, count: CartCount) -> String {
    if !count.is_visible() {
        return fragment.to_string();
    }

    let anchors = scan_anchors(fragment);
    let Some((rule, anchor)) = select_cart_anchor(&anchors) else {
        debug!(anchors = anchors.len(), "no cart anchor in navigation fragment");
        return fragment.to_string();
    };

    debug!(?rule, href = ?anchor.href, %count, "patching cart anchor");

    let badge = badge_markup(count);
    let mut out = String::with_capacity(fragment.len() + badge.len() + 1);

    match &anchor.badge {
        Some(existing) => {
            out.push_str(&fragment[..existing.start]);
            out.push_str(&badge);
            out.push_str(&fragment[existing.end..]);
        }
        None => {
            out.push_str(&fragment[..anchor.close_start]);
            out.push(' ');
            out.push_str(&badge);
            out.push_str(&fragment[anchor.close_start..]);
        }
    }

    out
}

/// Bare badge markup for fragment-refresh responses. Empty for an empty cart.
pub fn badge_fragment(count: CartCount) -> String {
    if count.is_visible() {
        badge_markup(count)
    } else {
        String::new()
    }
}

fn badge_markup(count: CartCount) -> String {
    let value = count.to_string();
    let value = escape_html(&value);
    format!(r#"<span class="{BADGE_CLASS}" {BADGE_COUNT_ATTR}="{value}">{value}</span>"#)
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }

    let mut escaped = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_is_byte_identical() {
        let nav = r#"<ul><li><a href="/cart">Cart</a></li></ul>"#;
        assert_eq!(patch(nav, CartCount::ZERO), nav);
    }

    #[test]
    fn href_fallback_used_when_no_text_match() {
        let nav = r#"<a href="/">Home</a><a href="/my-cart/">Basket</a>"#;
        let out = patch(nav, CartCount::new(4));
        assert_eq!(
            out,
            r#"<a href="/">Home</a><a href="/my-cart/">Basket <span class="cart-count-badge" data-cart-count="4">4</span></a>"#
        );
    }

    #[test]
    fn repatching_rewrites_existing_badge() {
        let nav = r#"<a href="/cart">Cart</a>"#;
        let once = patch(nav, CartCount::new(1));
        let twice = patch(&once, CartCount::new(9));
        assert_eq!(twice.matches(BADGE_CLASS).count(), 1);
        assert!(twice.contains(r#"data-cart-count="9">9</span>"#));
    }

    #[test]
    fn empty_and_malformed_input_pass_through() {
        assert_eq!(patch("", CartCount::new(3)), "");
        let broken = r#"<a href="/cart">Cart<a"#;
        assert_eq!(patch(broken, CartCount::new(3)), broken);
    }

    #[test]
    fn escape_html_encodes_markup_characters() {
        assert_eq!(escape_html("12"), "12");
        assert_eq!(escape_html(r#"<b a="x">&'"#), "&lt;b a=&quot;x&quot;&gt;&amp;&#x27;");
    }

    #[test]
    fn badge_fragment_is_empty_for_zero() {
        assert_eq!(badge_fragment(CartCount::ZERO), "");
        assert!(badge_fragment(CartCount::new(2)).contains(r#"data-cart-count="2""#));
    }
}
