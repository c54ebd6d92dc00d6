use async_trait::async_trait;
use cartbadge::CartCount;
use cartbadge::client::{
    Anchor, Control, CountSource, DebounceState, Dom, FetchError, Interaction, InteractionKind,
    LoopSettings, MemoryDom, MutationKind, MutationRecord, ReconciliationLoop,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

const CART_BLOCK: &str = "wp-block-woocommerce-cart";

/// Count source answering from a script; the last entry repeats.
struct ScriptedSource {
    script: Mutex<VecDeque<(Duration, Result<u64, String>)>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    fn new(script: Vec<(Duration, Result<u64, String>)>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            script: Mutex::new(script.into()),
            calls: Arc::clone(&calls),
        };
        (source, calls)
    }

    fn counts(counts: &[u64]) -> (Self, Arc<AtomicUsize>) {
        Self::new(counts.iter().map(|c| (Duration::ZERO, Ok(*c))).collect())
    }

    fn failing() -> (Self, Arc<AtomicUsize>) {
        Self::new(vec![(Duration::ZERO, Err("invalid_nonce".to_string()))])
    }
}

#[async_trait]
impl CountSource for ScriptedSource {
    async fn fetch_count(&self) -> Result<CartCount, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (delay, result) = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        };
        if !delay.is_zero() {
            sleep(delay).await;
        }
        result.map(CartCount::new).map_err(FetchError::Rejected)
    }
}

fn nav_dom() -> Arc<Mutex<MemoryDom>> {
    Arc::new(Mutex::new(
        MemoryDom::new()
            .with_anchor(Anchor::new("/", "Home"))
            .with_anchor(Anchor::new("/cart/", "Cart"))
            .with_container(CART_BLOCK),
    ))
}

fn badge_counts(dom: &Arc<Mutex<MemoryDom>>) -> Vec<u64> {
    dom.lock().unwrap().badges().iter().map(|b| b.count.get()).collect()
}

/// Starts the loop and lets the initial update finish.
async fn started(
    source: ScriptedSource,
    dom: &Arc<Mutex<MemoryDom>>,
) -> ReconciliationLoop<ScriptedSource, MemoryDom> {
    let reconciler = ReconciliationLoop::start(source, Arc::clone(dom), LoopSettings::new());
    sleep(Duration::from_secs(1)).await;
    reconciler
}

#[tokio::test(start_paused = true)]
async fn start_schedules_one_initial_update() {
    let (source, calls) = ScriptedSource::counts(&[2]);
    let dom = nav_dom();

    let reconciler = ReconciliationLoop::start(source, Arc::clone(&dom), LoopSettings::new());
    assert_eq!(reconciler.state(), DebounceState::Scheduled);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    sleep(Duration::from_secs(1)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(reconciler.state(), DebounceState::Idle);
    assert_eq!(badge_counts(&dom), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn burst_of_events_makes_one_call() {
    let (source, calls) = ScriptedSource::counts(&[1, 4]);
    let dom = nav_dom();
    let reconciler = started(source, &dom).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    for name in ["added_to_cart", "updated_cart_totals", "wc_fragments_refreshed", "added_to_cart"] {
        assert!(reconciler.on_cart_event(name));
        sleep(Duration::from_millis(100)).await;
    }
    sleep(Duration::from_secs(1)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(badge_counts(&dom), vec![4]);
    assert_eq!(reconciler.stats().triggers, 5);
    assert_eq!(reconciler.stats().fetches, 2);
}

#[tokio::test(start_paused = true)]
async fn spaced_events_each_make_a_call() {
    let (source, calls) = ScriptedSource::counts(&[1]);
    let dom = nav_dom();
    let reconciler = started(source, &dom).await;

    for _ in 0..3 {
        reconciler.on_cart_event("removed_from_cart");
        sleep(Duration::from_millis(400)).await;
    }

    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn unknown_event_names_are_ignored() {
    let (source, calls) = ScriptedSource::counts(&[1]);
    let dom = nav_dom();
    let reconciler = started(source, &dom).await;

    assert!(!reconciler.on_cart_event("page_scrolled"));
    sleep(Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn rerendering_same_count_keeps_one_badge() {
    let (source, _calls) = ScriptedSource::counts(&[3]);
    let dom = nav_dom();
    let reconciler = started(source, &dom).await;

    for _ in 0..3 {
        reconciler.on_cart_event("updated_cart_totals");
        sleep(Duration::from_millis(500)).await;
    }

    assert_eq!(badge_counts(&dom), vec![3]);
    assert_eq!(dom.lock().unwrap().events().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn zero_after_three_removes_badge() {
    let (source, _calls) = ScriptedSource::counts(&[3, 0]);
    let dom = nav_dom();
    let reconciler = started(source, &dom).await;
    assert_eq!(badge_counts(&dom), vec![3]);

    reconciler.on_cart_event("removed_from_cart");
    sleep(Duration::from_secs(1)).await;

    assert!(badge_counts(&dom).is_empty());
    let last = dom.lock().unwrap().events().last().cloned().unwrap();
    assert_eq!(last.count, CartCount::ZERO);
}

#[tokio::test(start_paused = true)]
async fn failed_query_leaves_badge_untouched() {
    let (source, calls) = ScriptedSource::failing();
    let dom = Arc::new(Mutex::new(MemoryDom::from_markup(
        r#"<a href="/cart/">Cart <span class="cart-count-badge" data-cart-count="3">3</span></a>"#,
    )));

    let reconciler = started(source, &dom).await;
    reconciler.on_cart_event("added_to_cart");
    sleep(Duration::from_secs(1)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(badge_counts(&dom), vec![3]);
    assert!(dom.lock().unwrap().events().is_empty());

    let stats = reconciler.stats();
    assert_eq!(stats.failures, 2);
    assert_eq!(stats.renders, 0);
    assert_eq!(reconciler.state(), DebounceState::Idle);
}

#[tokio::test(start_paused = true)]
async fn matching_request_waits_for_settle_delay() {
    let (source, calls) = ScriptedSource::counts(&[1, 2]);
    let dom = nav_dom();
    let reconciler = started(source, &dom).await;

    assert!(!reconciler.on_request_completed("https://shop.test/wp-json/wp/v2/pages"));
    assert!(reconciler.on_request_completed(
        "https://shop.test/wp-json/wc/store/v1/cart/update-item"
    ));

    sleep(Duration::from_millis(400)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(badge_counts(&dom), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn mutations_only_count_in_containers_present_at_start() {
    let (source, calls) = ScriptedSource::counts(&[1]);
    let dom = nav_dom();
    let reconciler = started(source, &dom).await;
    assert_eq!(reconciler.observed_containers(), &[CART_BLOCK.to_string()]);

    dom.lock().unwrap().mount_container("wp-block-woocommerce-checkout");
    let late = MutationRecord::new("wp-block-woocommerce-checkout", MutationKind::CharacterData)
        .text("$19.99");
    assert!(!reconciler.on_mutations(&[late]));

    let noise = MutationRecord::new(CART_BLOCK, MutationKind::Attributes).target_class("is-loading");
    assert!(!reconciler.on_mutations(&[noise.clone()]));

    let total = MutationRecord::new(CART_BLOCK, MutationKind::CharacterData)
        .within("wc-block-components-totals-footer-item")
        .text("$42.00");
    assert!(reconciler.on_mutations(&[noise, total]));

    sleep(Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn remove_click_waits_longer_than_stepper_click() {
    let (source, calls) = ScriptedSource::counts(&[2]);
    let dom = nav_dom();
    let reconciler = started(source, &dom).await;

    let remove = Interaction::new(
        InteractionKind::Click,
        Control::new("a").class("wc-block-cart-item__remove-link"),
    );
    assert!(reconciler.on_interaction(&remove));

    sleep(Duration::from_millis(700)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let stepper = Interaction::new(
        InteractionKind::Click,
        Control::new("button").class("wc-block-components-quantity-selector__button"),
    );
    assert!(reconciler.on_interaction(&stepper));

    sleep(Duration::from_millis(350)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let unrelated = Interaction::new(InteractionKind::Click, Control::new("a").class("menu-link"));
    assert!(!reconciler.on_interaction(&unrelated));
}

#[tokio::test(start_paused = true)]
async fn quantity_typing_is_debounced() {
    let (source, calls) = ScriptedSource::counts(&[1, 12]);
    let dom = nav_dom();
    let reconciler = started(source, &dom).await;

    let typing = Interaction::new(InteractionKind::Input, Control::new("input").class("qty"));
    for _ in 0..4 {
        assert!(reconciler.on_interaction(&typing));
        sleep(Duration::from_millis(50)).await;
    }
    sleep(Duration::from_secs(1)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(badge_counts(&dom), vec![12]);
}

#[tokio::test(start_paused = true)]
async fn late_response_wins_over_newer_request() {
    let (source, calls) = ScriptedSource::new(vec![
        (Duration::from_millis(1000), Ok(5)),
        (Duration::ZERO, Ok(7)),
    ]);
    let dom = nav_dom();
    let reconciler = ReconciliationLoop::start(source, Arc::clone(&dom), LoopSettings::new());

    // Initial fetch fires at 300ms and is in flight until 1300ms.
    sleep(Duration::from_millis(400)).await;
    reconciler.on_cart_event("added_to_cart");

    sleep(Duration::from_millis(400)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(badge_counts(&dom), vec![7]);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(badge_counts(&dom), vec![5]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_drops_pending_update() {
    let (source, calls) = ScriptedSource::counts(&[1]);
    let dom = nav_dom();
    let reconciler = ReconciliationLoop::start(source, Arc::clone(&dom), LoopSettings::new());

    reconciler.shutdown();
    sleep(Duration::from_secs(1)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(dom.lock().unwrap().anchors().iter().all(|a| a.badge.is_none()));
}
