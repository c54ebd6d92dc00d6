//! Change-detection inputs and the delay each one waits before reconciling.

use std::time::Duration;

/// Reconciliation delays
///
/// The base delay debounces bursts; the settle delays give the UI action that
/// caused a trigger time to finish its own re-render first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Base debounce delay
    pub debounce: Duration,

    /// Wait after a matching cart/checkout API request completes
    pub network_settle: Duration,

    /// Wait after a remove-item click
    pub remove_settle: Duration,

    /// Wait after a quantity stepper click
    pub stepper_settle: Duration,
}

impl Timings {
    pub fn new() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            network_settle: Duration::from_millis(500),
            remove_settle: Duration::from_millis(800),
            stepper_settle: Duration::from_millis(400),
        }
    }

    /// Set the base debounce delay
    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    /// Set the network settle delay
    pub fn network_settle(mut self, delay: Duration) -> Self {
        self.network_settle = delay;
        self
    }

    /// Set the remove-click settle delay
    pub fn remove_settle(mut self, delay: Duration) -> Self {
        self.remove_settle = delay;
        self
    }

    /// Set the stepper-click settle delay
    pub fn stepper_settle(mut self, delay: Duration) -> Self {
        self.stepper_settle = delay;
        self
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::new()
    }
}

/// Named cart-lifecycle events dispatched by the surrounding page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartEvent {
    AddedToCart,
    RemovedFromCart,
    UpdatedCartTotals,
    FragmentsRefreshed,
}

impl CartEvent {
    pub const ALL: [CartEvent; 4] = [
        CartEvent::AddedToCart,
        CartEvent::RemovedFromCart,
        CartEvent::UpdatedCartTotals,
        CartEvent::FragmentsRefreshed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CartEvent::AddedToCart => "added_to_cart",
            CartEvent::RemovedFromCart => "removed_from_cart",
            CartEvent::UpdatedCartTotals => "updated_cart_totals",
            CartEvent::FragmentsRefreshed => "wc_fragments_refreshed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }
}

/// Why an update was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Loop setup; the page may have been served from a stale cache.
    Init,
    Cart(CartEvent),
    NetworkSettled,
    Mutation,
    QuantityInput,
    RemoveClick,
    StepperClick,
}

impl Trigger {
    pub fn delay(self, timings: &Timings) -> Duration {
        match self {
            Trigger::Init | Trigger::Cart(_) | Trigger::Mutation | Trigger::QuantityInput => {
                timings.debounce
            }
            Trigger::NetworkSettled => timings.network_settle,
            Trigger::RemoveClick => timings.remove_settle,
            Trigger::StepperClick => timings.stepper_settle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Input,
    Change,
    Click,
}

/// The element an interaction landed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Control {
    pub tag: String,
    pub name: Option<String>,
    pub classes: Vec<String>,
    /// Classes of every ancestor, nearest first. Clicks often land on an
    /// icon nested inside the actual button.
    pub ancestor_classes: Vec<String>,
}

impl Control {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn within(mut self, class: &str) -> Self {
        self.ancestor_classes.push(class.to_string());
        self
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// `closest()`-style test against the element and its ancestors.
    fn closest(&self, classes: &[&str]) -> bool {
        self.classes
            .iter()
            .chain(self.ancestor_classes.iter())
            .any(|c| classes.contains(&c.as_str()))
    }

    fn is_quantity_input(&self) -> bool {
        self.tag == "input"
            && (self.has_class("qty")
                || self.has_class("wc-block-components-quantity-selector__input")
                || self
                    .name
                    .as_deref()
                    .is_some_and(|name| name.contains("quantity") || name.contains("[qty]")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub kind: InteractionKind,
    pub target: Control,
}

impl Interaction {
    pub fn new(kind: InteractionKind, target: Control) -> Self {
        Self { kind, target }
    }
}

const REMOVE_CONTROLS: &[&str] = &["remove", "wc-block-cart-item__remove-link"];
const STEPPER_CONTROLS: &[&str] = &["wc-block-components-quantity-selector__button"];

/// Maps a user interaction to the trigger it implies, if any.
pub fn classify_interaction(interaction: &Interaction) -> Option<Trigger> {
    let target = &interaction.target;
    match interaction.kind {
        InteractionKind::Input | InteractionKind::Change if target.is_quantity_input() => {
            Some(Trigger::QuantityInput)
        }
        InteractionKind::Click if target.closest(REMOVE_CONTROLS) => Some(Trigger::RemoveClick),
        InteractionKind::Click if target.closest(STEPPER_CONTROLS) => Some(Trigger::StepperClick),
        _ => None,
    }
}
