//! DOM mutation filtering for client-rendered cart and checkout widgets.
//!
//! Those widgets re-render constantly; only mutations that plausibly reflect
//! a changed item count are allowed to request an update.

use regex::Regex;
use tracing::debug;

lazy_static::lazy_static! {
    static ref CURRENCY_RE: Regex = Regex::new(r"\$[\d,]+(\.\d+)?").expect("currency pattern compiles");
}

pub const DEFAULT_WATCHED_CONTAINERS: &[&str] = &[
    "wp-block-woocommerce-cart",
    "wp-block-woocommerce-checkout",
    "woocommerce-cart-form",
    "woocommerce-checkout",
];

pub const DEFAULT_TOTALS_CLASSES: &[&str] = &[
    "wc-block-components-totals-item",
    "wc-block-components-totals-footer-item",
    "cart-subtotal",
    "order-total",
    "cart_totals",
];

pub const DEFAULT_ITEM_CONTAINERS: &[&str] = &[
    "wc-block-cart-items",
    "wc-block-cart-items__row",
    "woocommerce-cart-form__contents",
    "cart_item",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// One observed mutation, reported against the watched container it
/// happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub container: String,
    pub kind: MutationKind,
    pub target_classes: Vec<String>,
    pub ancestor_classes: Vec<String>,
    /// New text for character-data mutations.
    pub text: Option<String>,
}

impl MutationRecord {
    pub fn new(container: &str, kind: MutationKind) -> Self {
        Self {
            container: container.to_string(),
            kind,
            target_classes: Vec::new(),
            ancestor_classes: Vec::new(),
            text: None,
        }
    }

    pub fn target_class(mut self, class: &str) -> Self {
        self.target_classes.push(class.to_string());
        self
    }

    pub fn within(mut self, class: &str) -> Self {
        self.ancestor_classes.push(class.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    fn touches(&self, classes: &[String]) -> bool {
        self.target_classes
            .iter()
            .chain(self.ancestor_classes.iter())
            .any(|c| classes.contains(c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFilter {
    pub totals_classes: Vec<String>,
    pub item_containers: Vec<String>,
}

impl MutationFilter {
    pub fn is_relevant(&self, record: &MutationRecord) -> bool {
        if record.touches(&self.totals_classes) || record.touches(&self.item_containers) {
            return true;
        }

        record.kind == MutationKind::CharacterData
            && record.text.as_deref().is_some_and(|t| CURRENCY_RE.is_match(t))
    }
}

impl Default for MutationFilter {
    fn default() -> Self {
        Self {
            totals_classes: DEFAULT_TOTALS_CLASSES.iter().map(|c| c.to_string()).collect(),
            item_containers: DEFAULT_ITEM_CONTAINERS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Mutation observation bound to the containers present when it was attached.
/// Containers mounted later are not observed.
#[derive(Debug, Clone)]
pub struct MutationWatch {
    observed: Vec<String>,
    filter: MutationFilter,
}

impl MutationWatch {
    pub fn attach(present: &[String], watched: &[String], filter: MutationFilter) -> Self {
        let mut observed: Vec<String> = Vec::new();
        for class in present.iter().filter(|class| watched.contains(class)) {
            if !observed.contains(class) {
                observed.push(class.clone());
            }
        }

        debug!(?observed, "attached mutation observers");
        Self { observed, filter }
    }

    pub fn observed(&self) -> &[String] {
        &self.observed
    }

    pub fn observes(&self, container: &str) -> bool {
        self.observed.iter().any(|c| c == container)
    }

    /// True if any record is from an observed container and passes the filter.
    pub fn admits(&self, records: &[MutationRecord]) -> bool {
        records
            .iter()
            .any(|record| self.observes(&record.container) && self.filter.is_relevant(record))
    }
}
