use regex::Regex;
use std::ops::Range;

lazy_static::lazy_static! {
    static ref ANCHOR_RE: Regex =
        Regex::new(r"(?is)<a\b([^>]*)>(.*?)(</a\s*>)").expect("anchor pattern compiles");
    static ref HREF_RE: Regex =
        Regex::new(r#"(?is)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("href pattern compiles");
    static ref TAG_RE: Regex = Regex::new(r"(?s)<[^>]*>").expect("tag pattern compiles");
    static ref CART_TEXT_RE: Regex = Regex::new(r"(?i)cart").expect("cart text pattern compiles");
    static ref BADGE_SPAN_RE: Regex = Regex::new(
        r#"(?is)<span\b[^>]*\bclass\s*=\s*["'][^"']*\bcart-count-badge\b[^"']*["'][^>]*>.*?</span\s*>"#
    )
    .expect("badge pattern compiles");
}

/// One `<a>...</a>` element located inside a fragment, by byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorSpan {
    /// Byte range of the inner markup.
    pub inner: Range<usize>,
    /// Byte offset where the closing `</a>` tag starts.
    pub close_start: usize,
    /// Raw `href` value if present.
    pub href: Option<String>,
    /// Inner markup with tags and any existing badge stripped.
    pub text: String,
    /// Byte range of an already rendered badge span inside the anchor.
    pub badge: Option<Range<usize>>,
}

impl AnchorSpan {
    pub fn text_names_cart(&self) -> bool {
        CART_TEXT_RE.is_match(&self.text)
    }

    pub fn href_names_cart(&self) -> bool {
        self.href
            .as_deref()
            .is_some_and(|href| href.to_ascii_lowercase().contains("cart"))
    }
}

/// Ordered anchor-matching rules. The first rule with any match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorRule {
    /// Visible inner text contains "cart", tags stripped.
    VisibleText,
    /// `href` attribute contains "cart".
    Href,
}

impl AnchorRule {
    pub const ORDER: [AnchorRule; 2] = [AnchorRule::VisibleText, AnchorRule::Href];

    pub fn matches(self, anchor: &AnchorSpan) -> bool {
        match self {
            AnchorRule::VisibleText => anchor.text_names_cart(),
            AnchorRule::Href => anchor.href_names_cart(),
        }
    }
}

/// Finds every anchor element in document order.
pub fn scan_anchors(fragment: &str) -> Vec<AnchorSpan> {
    ANCHOR_RE
        .captures_iter(fragment)
        .filter_map(|caps| {
            let attrs = caps.get(1)?;
            let inner = caps.get(2)?;
            let close = caps.get(3)?;

            let href = HREF_RE.captures(attrs.as_str()).and_then(|h| {
                h.get(1)
                    .or_else(|| h.get(2))
                    .or_else(|| h.get(3))
                    .map(|m| m.as_str().to_string())
            });

            let badge = BADGE_SPAN_RE
                .find(inner.as_str())
                .map(|m| (inner.start() + m.start())..(inner.start() + m.end()));

            let without_badge = BADGE_SPAN_RE.replace_all(inner.as_str(), " ");
            let text = TAG_RE.replace_all(&without_badge, " ").into_owned();

            Some(AnchorSpan {
                inner: inner.range(),
                close_start: close.start(),
                href,
                text,
                badge,
            })
        })
        .collect()
}

/// Picks the anchor to patch: the first anchor satisfying the first rule that
/// matches anything at all.
pub fn select_cart_anchor(anchors: &[AnchorSpan]) -> Option<(AnchorRule, &AnchorSpan)> {
    AnchorRule::ORDER.iter().find_map(|rule| {
        anchors
            .iter()
            .find(|anchor| rule.matches(anchor))
            .map(|anchor| (*rule, anchor))
    })
}
