//! Engine tying the pieces together: it owns the items, keeps the latest
//! placement, and re-runs placement whenever the resolved column count
//! changes.

mod config;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::Instant;

use serde_json::json;

use crate::balance::{ColumnBalancer, ColumnLayout, Placement};
use crate::error::{LayoutError, Result};
use crate::estimate::{ContentShape, HeightEstimator};
use crate::identity::KeyResolver;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::{MetricSnapshot, PlacementMetrics};
use crate::responsive::{ResponsiveResolver, Subscription, ViewportSignal};

pub use config::{DEFAULT_GAP, EngineConfig};

pub const ENGINE_TARGET: &str = "masonry::engine";

/// Marks an empty pending-width slot; real widths are `u32`.
const NO_PENDING_WIDTH: u64 = u64::MAX;

struct EngineState<T> {
    items: Vec<T>,
    balancer: ColumnBalancer<T>,
    resolver: ResponsiveResolver,
    layout: ColumnLayout,
    /// Bumped whenever the items are replaced.
    revision: u64,
    delivered: Option<(u64, blake3::Hash)>,
    viewport_width: Option<u32>,
    metrics: PlacementMetrics,
    logger: Option<Logger>,
}

impl<T: ContentShape> EngineState<T> {
    fn columns(&self) -> usize {
        self.resolver
            .current()
            .unwrap_or(self.resolver.fallback_columns())
    }

    /// Full placement pass over the current items.
    fn replace(&mut self) -> Result<()> {
        let columns = self.columns();
        let placement = self.balancer.place(&self.items, columns)?;
        self.layout = placement.layout();
        self.metrics.record_pass(self.items.len());
        self.log(
            LogLevel::Debug,
            "placement_completed",
            [
                json_kv("columns", json!(columns)),
                json_kv("items", json!(self.items.len())),
                json_kv("spread", json!(placement.spread())),
            ],
        );
        Ok(())
    }

    /// Returns whether the width change produced a new placement.
    fn apply_width(&mut self, width: Option<u32>) -> Result<bool> {
        self.viewport_width = width;
        if width.is_some() {
            self.metrics.record_width_signal();
        }

        let previous = self.resolver.current();
        let Some(columns) = self.resolver.update(width) else {
            return Ok(false);
        };

        self.metrics.record_column_change();
        self.log(
            LogLevel::Info,
            "columns_changed",
            [
                json_kv("from", json!(previous)),
                json_kv("to", json!(columns)),
                json_kv("width", json!(width)),
            ],
        );
        self.replace()?;
        Ok(true)
    }

    fn apply_signalled_width(&mut self, width: u32) {
        if let Err(err) = self.apply_width(Some(width)) {
            self.log(
                LogLevel::Error,
                "placement_failed",
                [json_kv("error", json!(err.to_string()))],
            );
        }
    }
}

impl<T> EngineState<T> {
    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            let event = event_with_fields(level, ENGINE_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

/// State reachable from the signal listener.
struct Shared<T> {
    state: Mutex<EngineState<T>>,
    /// Width signalled while `state` was busy, applied by the next engine call.
    pending_width: AtomicU64,
}

impl<T> Shared<T> {
    fn defer_width(&self, width: u32) {
        self.pending_width.store(u64::from(width), Ordering::Release);
    }

    fn take_pending_width(&self) -> Option<u32> {
        match self.pending_width.swap(NO_PENDING_WIDTH, Ordering::AcqRel) {
            NO_PENDING_WIDTH => None,
            width => u32::try_from(width).ok(),
        }
    }
}

/// Responsive masonry engine over an owned item sequence.
///
/// Without a viewport signal the engine places with the configured fallback
/// column count. Once [`attach`](Self::attach)ed it follows the signal; the
/// subscription is released by [`detach`](Self::detach) or when the engine is
/// dropped.
///
/// A width emitted while the engine is busy on the same thread (inside a
/// [`with_placement`](Self::with_placement) closure or a height callback) is
/// parked and applied at the start of the next engine call. Closures handed
/// to the engine must not call back into the engine itself.
pub struct MasonryEngine<T> {
    shared: Arc<Shared<T>>,
    keys: KeyResolver<T>,
    gap: f64,
    metrics_target: String,
    started: Instant,
    subscription: Option<Subscription>,
}

impl<T> fmt::Debug for MasonryEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasonryEngine")
            .field("gap", &self.gap)
            .field("attached", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: ContentShape> MasonryEngine<T> {
    pub fn new(items: Vec<T>, config: EngineConfig) -> Result<Self> {
        Self::with_parts(items, config, ColumnBalancer::new(), KeyResolver::new())
    }

    /// Build with a custom balancer (height callbacks) and key resolver.
    ///
    /// `config.estimator` is installed on the balancer unless the balancer
    /// already carries a non-default estimator of its own.
    pub fn with_parts(
        items: Vec<T>,
        config: EngineConfig,
        balancer: ColumnBalancer<T>,
        keys: KeyResolver<T>,
    ) -> Result<Self> {
        let EngineConfig {
            fallback_columns,
            breakpoints,
            gap,
            estimator,
            logger,
            metrics_target,
        } = config;

        let balancer = if *balancer.estimator() == HeightEstimator::default() {
            balancer.with_estimator(estimator)
        } else {
            balancer
        };

        let mut resolver = ResponsiveResolver::new(breakpoints, fallback_columns)?;
        resolver.update(None);

        let mut state = EngineState {
            items,
            balancer,
            resolver,
            layout: ColumnLayout::default(),
            revision: 0,
            delivered: None,
            viewport_width: None,
            metrics: PlacementMetrics::new(),
            logger,
        };
        state.replace()?;

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                pending_width: AtomicU64::new(NO_PENDING_WIDTH),
            }),
            keys,
            gap: gap.max(0.0),
            metrics_target,
            started: Instant::now(),
            subscription: None,
        })
    }

    /// Lock the state, first applying any width parked by the listener.
    fn lock(&self) -> Result<MutexGuard<'_, EngineState<T>>> {
        let mut guard = self
            .shared
            .state
            .lock()
            .map_err(|_| LayoutError::EngineUnavailable)?;
        if let Some(width) = self.shared.take_pending_width() {
            guard.apply_width(Some(width))?;
        }
        Ok(guard)
    }

    /// Follow `signal`, replacing any previous subscription. The column count
    /// is resolved immediately from the signal's current width.
    pub fn attach(&mut self, signal: &ViewportSignal) -> Result<()>
    where
        T: Send + 'static,
    {
        self.subscription = None;

        let weak = Arc::downgrade(&self.shared);
        let subscription = signal.subscribe(move |width| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            match shared.state.try_lock() {
                Ok(mut guard) => {
                    shared.take_pending_width();
                    guard.apply_signalled_width(width);
                }
                Err(TryLockError::WouldBlock) => shared.defer_width(width),
                Err(TryLockError::Poisoned(_)) => {}
            }
        })?;
        self.subscription = Some(subscription);

        self.lock()?.apply_width(signal.width())?;
        Ok(())
    }

    /// Drop the viewport subscription. Returns whether one was active.
    pub fn detach(&mut self) -> bool {
        let Some(subscription) = self.subscription.take() else {
            return false;
        };
        subscription.cancel();
        if let Ok(guard) = self.lock() {
            guard.log(LogLevel::Debug, "viewport_detached", std::iter::empty());
        }
        true
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Push a width by hand, for callers without a signal. `None` means no
    /// viewport is available. Returns whether placement was re-run.
    pub fn resize(&self, width: Option<u32>) -> Result<bool> {
        self.lock()?.apply_width(width)
    }

    /// Replace the items and re-run placement. Always marks the engine dirty,
    /// even when the new items land in the same slots.
    pub fn set_items(&self, items: Vec<T>) -> Result<()> {
        let mut guard = self.lock()?;
        guard.items = items;
        guard.revision = guard.revision.wrapping_add(1);
        guard.replace()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.items.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn column_count(&self) -> Result<usize> {
        Ok(self.lock()?.layout.column_count())
    }

    pub fn viewport_width(&self) -> Result<Option<u32>> {
        Ok(self.lock()?.viewport_width)
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    pub fn layout(&self) -> Result<ColumnLayout> {
        Ok(self.lock()?.layout.clone())
    }

    /// Run `f` against the latest placement, borrowed from the engine's items.
    pub fn with_placement<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Placement<'_, T>) -> R,
    {
        let guard = self.lock()?;
        let placement = guard.layout.view(&guard.items);
        Ok(f(&placement))
    }

    /// Rendered extent of each column, gap included.
    pub fn column_extents(&self) -> Result<Vec<f64>> {
        let gap = self.gap;
        self.with_placement(|placement| {
            placement
                .columns()
                .iter()
                .map(|column| column.extent(gap))
                .collect()
        })
    }

    /// `(key, column, item)` triples for the renderer, in column order.
    pub fn keyed_pairs(&self) -> Result<Vec<(String, usize, T)>>
    where
        T: Clone,
    {
        let keys = &self.keys;
        self.with_placement(|placement| {
            placement
                .keyed_pairs(keys)
                .into_iter()
                .map(|(key, column, item)| (key, column, item.clone()))
                .collect()
        })
    }

    /// True when the items were replaced or the placement changed since the
    /// last call.
    pub fn take_dirty(&self) -> Result<bool> {
        let mut guard = self.lock()?;
        let current = (guard.revision, guard.layout.fingerprint());
        let dirty = guard.delivered != Some(current);
        guard.delivered = Some(current);
        Ok(dirty)
    }

    pub fn metrics_snapshot(&self) -> Result<MetricSnapshot> {
        Ok(self.lock()?.metrics.snapshot(self.started.elapsed()))
    }

    /// Write a metrics snapshot to the configured logger, if any.
    pub fn emit_metrics(&self) -> Result<()> {
        let guard = self.lock()?;
        if let Some(logger) = guard.logger.as_ref() {
            let event = guard
                .metrics
                .snapshot(self.started.elapsed())
                .to_log_event(&self.metrics_target);
            let _ = logger.log_event(event);
        }
        Ok(())
    }
}
