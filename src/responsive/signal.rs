use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use crate::error::{LayoutError, Result};

type Listener = Arc<dyn Fn(u32) + Send + Sync>;

#[derive(Default)]
struct SignalInner {
    width: Option<u32>,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Observable viewport width.
///
/// Emission is edge triggered: listeners run only when the width actually
/// changes. Listeners are invoked synchronously, after the internal lock has
/// been released, so they may subscribe, unsubscribe or read the signal.
#[derive(Clone, Default)]
pub struct ViewportSignal {
    inner: Arc<Mutex<SignalInner>>,
}

impl fmt::Debug for ViewportSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportSignal")
            .field("width", &self.width())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl ViewportSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(width: u32) -> Self {
        let signal = Self::default();
        if let Ok(mut guard) = signal.inner.lock() {
            guard.width = Some(width);
        }
        signal
    }

    pub fn width(&self) -> Option<u32> {
        self.inner.lock().ok().and_then(|guard| guard.width)
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .map(|guard| guard.listeners.len())
            .unwrap_or(0)
    }

    /// Register `listener`; it stays registered until the returned
    /// [`Subscription`] is dropped or cancelled. Fails when a listener panicked
    /// while holding the signal's lock.
    pub fn subscribe<F>(&self, listener: F) -> Result<Subscription>
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| LayoutError::SignalUnavailable)?;
        let id = guard.next_id;
        guard.next_id = id.wrapping_add(1);
        guard.listeners.push((id, Arc::new(listener)));
        Ok(Subscription {
            id: Some(id),
            signal: Arc::downgrade(&self.inner),
        })
    }

    #[cfg(test)]
    pub(crate) fn poisoned() -> Self {
        let signal = Self::default();
        let inner = Arc::clone(&signal.inner);
        let _ = std::thread::spawn(move || {
            let _guard = inner.lock();
            panic!("signal bookkeeping failed");
        })
        .join();
        signal
    }

    /// Publish a new width. Returns whether listeners were notified.
    pub fn emit(&self, width: u32) -> bool {
        let listeners: Vec<Listener> = {
            let Ok(mut guard) = self.inner.lock() else {
                return false;
            };
            if guard.width == Some(width) {
                return false;
            }
            guard.width = Some(width);
            guard
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };

        for listener in listeners {
            listener(width);
        }
        true
    }
}

/// Drop guard for a signal listener.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: Option<u64>,
    signal: Weak<Mutex<SignalInner>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        let Some(id) = self.id else {
            return false;
        };
        self.signal
            .upgrade()
            .and_then(|inner| {
                inner
                    .lock()
                    .ok()
                    .map(|guard| guard.listeners.iter().any(|(entry, _)| *entry == id))
            })
            .unwrap_or(false)
    }

    pub fn cancel(mut self) {
        self.unsubscribe();
    }

    fn unsubscribe(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(inner) = self.signal.upgrade() {
            if let Ok(mut guard) = inner.lock() {
                guard.listeners.retain(|(entry, _)| *entry != id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    #[test]
    fn emit_is_edge_triggered() {
        let signal = ViewportSignal::with_width(800);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let _sub = signal
            .subscribe(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert!(!signal.emit(800));
        assert!(signal.emit(1024));
        assert!(!signal.emit(1024));
        assert!(signal.emit(640));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(signal.width(), Some(640));
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let signal = ViewportSignal::new();
        let last = Arc::new(AtomicU32::new(0));
        let sink = Arc::clone(&last);
        let sub = signal
            .subscribe(move |width| sink.store(width, Ordering::SeqCst))
            .unwrap();
        assert_eq!(signal.listener_count(), 1);
        assert!(sub.is_active());

        drop(sub);
        assert_eq!(signal.listener_count(), 0);
        signal.emit(300);
        assert_eq!(last.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancel_removes_only_its_listener() {
        let signal = ViewportSignal::new();
        let first = signal.subscribe(|_| {}).unwrap();
        let second = signal.subscribe(|_| {}).unwrap();
        first.cancel();
        assert_eq!(signal.listener_count(), 1);
        assert!(second.is_active());
    }

    #[test]
    fn listeners_may_touch_the_signal() {
        let signal = ViewportSignal::new();
        let observed = Arc::new(AtomicU32::new(0));
        let (reader, sink) = (signal.clone(), Arc::clone(&observed));
        let _sub = signal
            .subscribe(move |_| {
                sink.store(reader.width().unwrap_or(0), Ordering::SeqCst);
            })
            .unwrap();
        signal.emit(512);
        assert_eq!(observed.load(Ordering::SeqCst), 512);
    }

    #[test]
    fn subscription_outliving_signal_is_inert() {
        let signal = ViewportSignal::new();
        let sub = signal.subscribe(|_| {}).unwrap();
        drop(signal);
        assert!(!sub.is_active());
        drop(sub);
    }

    #[test]
    fn poisoned_signal_refuses_subscribers() {
        let signal = ViewportSignal::poisoned();
        let err = signal.subscribe(|_| {}).unwrap_err();
        assert!(matches!(err, LayoutError::SignalUnavailable));
        assert_eq!(signal.listener_count(), 0);
        assert!(!signal.emit(700));
    }
}
