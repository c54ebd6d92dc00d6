use crate::client::count::CountSource;
use crate::client::debounce::{DebounceState, Debouncer};
use crate::client::dom::Dom;
use crate::client::mutation::{DEFAULT_WATCHED_CONTAINERS, MutationFilter, MutationRecord, MutationWatch};
use crate::client::network::{RequestListener, default_api_pattern};
use crate::client::renderer::{RenderOutcome, render};
use crate::client::triggers::{CartEvent, Interaction, Timings, Trigger, classify_interaction};
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Loop tuning
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub timings: Timings,

    /// Completed requests whose URL matches schedule a settle-delayed update
    pub api_pattern: Regex,

    /// Container classes eligible for mutation observation
    pub watched_containers: Vec<String>,

    pub mutation_filter: MutationFilter,
}

impl LoopSettings {
    pub fn new() -> Self {
        Self {
            timings: Timings::new(),
            api_pattern: default_api_pattern(),
            watched_containers: DEFAULT_WATCHED_CONTAINERS.iter().map(|c| c.to_string()).collect(),
            mutation_filter: MutationFilter::default(),
        }
    }

    pub fn timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn api_pattern(mut self, pattern: Regex) -> Self {
        self.api_pattern = pattern;
        self
    }

    pub fn watch_container(mut self, class: &str) -> Self {
        self.watched_containers.push(class.to_string());
        self
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct LoopMetrics {
    triggers: AtomicU64,
    fetches: AtomicU64,
    renders: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub triggers: u64,
    pub fetches: u64,
    pub renders: u64,
    pub failures: u64,
}

struct Inner<S, D> {
    source: S,
    dom: Arc<Mutex<D>>,
    settings: LoopSettings,
    watch: MutationWatch,
    debouncer: Arc<Debouncer>,
    metrics: LoopMetrics,
}

impl<S: CountSource, D: Dom> Inner<S, D> {
    async fn run_update(&self) {
        self.metrics.fetches.fetch_add(1, Ordering::Relaxed);

        match self.source.fetch_count().await {
            Ok(count) => {
                let outcome = {
                    let mut dom = lock_dom(&self.dom);
                    render(&mut *dom, count)
                };
                self.metrics.renders.fetch_add(1, Ordering::Relaxed);
                if outcome == RenderOutcome::NoCartAnchor {
                    debug!(%count, "no cart anchor on page; badge not shown");
                } else {
                    debug!(%count, ?outcome, "badge rendered");
                }
            }
            Err(err) => {
                self.metrics.failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, "cart count query failed; badge left as is");
            }
        }
    }
}

/// Client-side reconciliation loop.
///
/// Every change-detection channel funnels into [`request_update`], which
/// debounces through a single timer slot; when the timer fires, one count
/// query runs and its result is rendered. A failed query is logged and
/// dropped; the next trigger simply tries again.
///
/// In-flight queries are never cancelled, so if two overlap the response that
/// arrives last is the one left on the page.
///
/// [`request_update`]: ReconciliationLoop::request_update
pub struct ReconciliationLoop<S, D> {
    inner: Arc<Inner<S, D>>,
}

impl<S, D> Clone for ReconciliationLoop<S, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: CountSource, D: Dom> ReconciliationLoop<S, D> {
    /// Attaches mutation observation to the containers present right now and
    /// schedules the initial update. Must be called inside a tokio runtime.
    pub fn start(source: S, dom: Arc<Mutex<D>>, settings: LoopSettings) -> Self {
        let present = lock_dom(&dom).containers();
        let watch = MutationWatch::attach(
            &present,
            &settings.watched_containers,
            settings.mutation_filter.clone(),
        );

        info!(observed = watch.observed().len(), "reconciliation loop started");

        let this = Self {
            inner: Arc::new(Inner {
                source,
                dom,
                settings,
                watch,
                debouncer: Debouncer::new(),
                metrics: LoopMetrics::default(),
            }),
        };

        this.request_update(Trigger::Init);
        this
    }

    /// Replaces any pending update with one due after the trigger's delay.
    pub fn request_update(&self, trigger: Trigger) {
        self.inner.metrics.triggers.fetch_add(1, Ordering::Relaxed);

        let delay = trigger.delay(&self.inner.settings.timings);
        debug!(?trigger, ?delay, "scheduling badge update");

        let inner = Arc::clone(&self.inner);
        self.inner
            .debouncer
            .schedule(delay, async move { inner.run_update().await });
    }

    /// Page-dispatched cart lifecycle event. Unknown names are ignored.
    pub fn on_cart_event(&self, name: &str) -> bool {
        match CartEvent::from_name(name) {
            Some(event) => {
                self.request_update(Trigger::Cart(event));
                true
            }
            None => false,
        }
    }

    /// Completed outgoing request.
    pub fn on_request_completed(&self, url: &str) -> bool {
        if !self.inner.settings.api_pattern.is_match(url) {
            return false;
        }
        self.request_update(Trigger::NetworkSettled);
        true
    }

    /// Batch of mutation records, as one observer callback delivers them.
    pub fn on_mutations(&self, records: &[MutationRecord]) -> bool {
        if !self.inner.watch.admits(records) {
            return false;
        }
        self.request_update(Trigger::Mutation);
        true
    }

    pub fn on_interaction(&self, interaction: &Interaction) -> bool {
        match classify_interaction(interaction) {
            Some(trigger) => {
                self.request_update(trigger);
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.inner.debouncer.state()
    }

    pub fn observed_containers(&self) -> &[String] {
        self.inner.watch.observed()
    }

    pub fn stats(&self) -> LoopStats {
        let metrics = &self.inner.metrics;
        LoopStats {
            triggers: metrics.triggers.load(Ordering::Relaxed),
            fetches: metrics.fetches.load(Ordering::Relaxed),
            renders: metrics.renders.load(Ordering::Relaxed),
            failures: metrics.failures.load(Ordering::Relaxed),
        }
    }

    /// Page teardown: drop the pending update.
    pub fn shutdown(&self) {
        self.inner.debouncer.cancel();
        info!("reconciliation loop stopped");
    }
}

impl<S: CountSource, D: Dom> RequestListener for ReconciliationLoop<S, D> {
    fn request_completed(&self, url: &str) {
        self.on_request_completed(url);
    }
}

fn lock_dom<D>(dom: &Mutex<D>) -> MutexGuard<'_, D> {
    dom.lock().unwrap_or_else(PoisonError::into_inner)
}
