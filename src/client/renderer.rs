use crate::client::dom::{Badge, BadgeEvent, Dom};
use crate::core::CartCount;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Existing badges rewritten in place.
    Updated(usize),
    /// No badge existed; one was appended to each cart anchor.
    Created(usize),
    /// Count is zero; this many badges were removed.
    Removed(usize),
    /// Count is positive but the page has no cart anchor.
    NoCartAnchor,
}

/// Brings the page's badges in line with `count`, then fires the
/// `cart_badge_updated` notification.
///
/// Updating wins over creating, so a page that already shows a badge never
/// gains a second one on the same anchor.
pub fn render<D: Dom + ?Sized>(dom: &mut D, count: CartCount) -> RenderOutcome {
    let outcome = if count.is_visible() {
        let mut updated = 0;
        for badge in dom.anchors_mut().iter_mut().filter_map(|a| a.badge.as_mut()) {
            badge.set(count);
            updated += 1;
        }

        if updated > 0 {
            RenderOutcome::Updated(updated)
        } else {
            let mut created = 0;
            for anchor in dom.anchors_mut().iter_mut().filter(|a| a.is_cart_link()) {
                anchor.badge = Some(Badge::new(count));
                created += 1;
            }

            if created > 0 {
                RenderOutcome::Created(created)
            } else {
                RenderOutcome::NoCartAnchor
            }
        }
    } else {
        let removed = dom
            .anchors_mut()
            .iter_mut()
            .filter_map(|a| a.badge.take())
            .count();
        RenderOutcome::Removed(removed)
    };

    dom.dispatch(BadgeEvent::updated(count));
    outcome
}
