//! Generation Controller - Registry of active generation jobs
//!
//! Each active job is registered with a cancellation callback. Exactly one of
//! `cancel` or `complete` wins for a given registration: both remove the entry
//! under the registry lock, so the loser sees an inactive job and does nothing.
//!
//! Lifecycle events are queued under the same lock as the mutation that
//! produced them and delivered in that order, one at a time. Callbacks and
//! listeners always run after the lock is released; an event raised from
//! inside a listener is delivered after the current one returns.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::value_objects::JobId;

/// Invoked once when the job is cancelled
pub type CancelCallback = Box<dyn FnOnce() + Send>;

type Listener = Arc<dyn Fn(&JobId) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerEventKind {
    Started,
    Cancelled,
    Completed,
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    listeners: HashMap<ControllerEventKind, Vec<(u64, Listener)>>,
}

/// Handle returned by [`GenerationController::subscribe`]
pub struct Subscription {
    id: u64,
    kind: ControllerEventKind,
    table: Arc<Mutex<ListenerTable>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        let mut table = lock(&self.table);
        if let Some(listeners) = table.listeners.get_mut(&self.kind) {
            listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[derive(Default)]
struct Registry {
    active: HashMap<JobId, CancelCallback>,
    pending: VecDeque<(ControllerEventKind, JobId)>,
    /// Some call is draining `pending`
    dispatching: bool,
}

#[derive(Default)]
pub struct GenerationController {
    registry: Mutex<Registry>,
    listeners: Arc<Mutex<ListenerTable>>,
}

/// Poisoning only means a listener panicked; the maps stay consistent
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Hands the dispatch role back if a listener panics
struct DispatchGuard<'a> {
    registry: &'a Mutex<Registry>,
    armed: bool,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.registry).dispatching = false;
        }
    }
}

impl GenerationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job, replacing any earlier registration under the same id
    pub fn register(&self, job_id: JobId, on_cancel: CancelCallback) {
        let replaced = {
            let mut registry = lock(&self.registry);
            let replaced = registry.active.insert(job_id.clone(), on_cancel).is_some();
            registry.pending.push_back((ControllerEventKind::Started, job_id.clone()));
            replaced
        };
        if replaced {
            tracing::warn!(job_id = %job_id, "Replaced an active generation registration");
        }
        self.dispatch();
    }

    /// Register a job only if no job with this id is active
    pub fn try_register(&self, job_id: JobId, on_cancel: CancelCallback) -> bool {
        {
            let mut registry = lock(&self.registry);
            if registry.active.contains_key(&job_id) {
                return false;
            }
            registry.active.insert(job_id.clone(), on_cancel);
            registry.pending.push_back((ControllerEventKind::Started, job_id));
        }
        self.dispatch();
        true
    }

    /// Cancel an active job. Unknown or finished jobs are a no-op.
    pub fn cancel(&self, job_id: &JobId) -> bool {
        let callback = {
            let mut registry = lock(&self.registry);
            let callback = registry.active.remove(job_id);
            if callback.is_some() {
                registry.pending.push_back((ControllerEventKind::Cancelled, job_id.clone()));
            }
            callback
        };
        match callback {
            Some(on_cancel) => {
                on_cancel();
                tracing::info!(job_id = %job_id, "Generation cancelled");
                self.dispatch();
                true
            }
            None => {
                tracing::debug!(job_id = %job_id, "Cancel for inactive generation ignored");
                false
            }
        }
    }

    /// Mark a job finished; returns false if it was not active (already
    /// cancelled or completed)
    pub fn complete(&self, job_id: &JobId) -> bool {
        let removed = {
            let mut registry = lock(&self.registry);
            let removed = registry.active.remove(job_id).is_some();
            if removed {
                registry.pending.push_back((ControllerEventKind::Completed, job_id.clone()));
            }
            removed
        };
        if removed {
            self.dispatch();
        }
        removed
    }

    pub fn is_active(&self, job_id: &JobId) -> bool {
        lock(&self.registry).active.contains_key(job_id)
    }

    pub fn list_active(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = lock(&self.registry).active.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn subscribe<F>(&self, kind: ControllerEventKind, listener: F) -> Subscription
    where
        F: Fn(&JobId) + Send + Sync + 'static,
    {
        let mut table = lock(&self.listeners);
        table.next_id += 1;
        let id = table.next_id;
        table
            .listeners
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));

        Subscription {
            id,
            kind,
            table: Arc::clone(&self.listeners),
        }
    }

    /// Deliver queued events unless another call is already delivering them
    fn dispatch(&self) {
        {
            let mut registry = lock(&self.registry);
            if registry.dispatching {
                return;
            }
            registry.dispatching = true;
        }
        let mut guard = DispatchGuard {
            registry: &self.registry,
            armed: true,
        };

        loop {
            let next = {
                let mut registry = lock(&self.registry);
                match registry.pending.pop_front() {
                    Some(event) => event,
                    None => {
                        registry.dispatching = false;
                        guard.armed = false;
                        return;
                    }
                }
            };
            let (kind, job_id) = next;
            self.notify(kind, &job_id);
        }
    }

    fn notify(&self, kind: ControllerEventKind, job_id: &JobId) {
        // Snapshot so listeners may subscribe or unsubscribe while running
        let listeners: Vec<Listener> = lock(&self.listeners)
            .listeners
            .get(&kind)
            .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        for listener in listeners {
            listener(job_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, CancelCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn test_cancel_runs_callback_once() {
        let controller = GenerationController::new();
        let (count, callback) = counter();
        controller.register(JobId::new("a"), callback);

        assert!(controller.is_active(&JobId::new("a")));
        assert!(controller.cancel(&JobId::new("a")));
        assert!(!controller.cancel(&JobId::new("a")));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(controller.list_active().is_empty());
    }

    #[test]
    fn test_cancel_unknown_is_noop() {
        let controller = GenerationController::new();
        assert!(!controller.cancel(&JobId::new("missing")));
    }

    #[test]
    fn test_complete_then_cancel() {
        let controller = GenerationController::new();
        let (count, callback) = counter();
        controller.register(JobId::new("a"), callback);

        assert!(controller.complete(&JobId::new("a")));
        assert!(!controller.cancel(&JobId::new("a")));
        assert!(!controller.complete(&JobId::new("a")));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_try_register_rejects_duplicates() {
        let controller = GenerationController::new();
        let (_, first) = counter();
        let (_, second) = counter();
        assert!(controller.try_register(JobId::new("a"), first));
        assert!(!controller.try_register(JobId::new("a"), second));
        assert_eq!(controller.list_active(), vec![JobId::new("a")]);
    }

    #[test]
    fn test_register_overwrites() {
        let controller = GenerationController::new();
        let (first_count, first) = counter();
        let (second_count, second) = counter();
        controller.register(JobId::new("a"), first);
        controller.register(JobId::new("a"), second);

        controller.cancel(&JobId::new("a"));
        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listeners_and_unsubscribe() {
        let controller = GenerationController::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = Arc::clone(&seen);
        let started = controller.subscribe(ControllerEventKind::Started, move |id| {
            s.lock().unwrap().push(format!("started:{}", id));
        });
        let s = Arc::clone(&seen);
        let _cancelled = controller.subscribe(ControllerEventKind::Cancelled, move |id| {
            s.lock().unwrap().push(format!("cancelled:{}", id));
        });

        let (_, callback) = counter();
        controller.register(JobId::new("a"), callback);
        started.unsubscribe();
        let (_, callback) = counter();
        controller.register(JobId::new("b"), callback);
        controller.cancel(&JobId::new("b"));

        assert_eq!(*seen.lock().unwrap(), vec!["started:a", "cancelled:b"]);
    }

    #[test]
    fn test_callback_may_reenter_controller() {
        let controller = Arc::new(GenerationController::new());
        let inner = Arc::clone(&controller);
        controller.register(
            JobId::new("a"),
            Box::new(move || {
                assert!(!inner.is_active(&JobId::new("a")));
            }),
        );
        assert!(controller.cancel(&JobId::new("a")));
    }

    #[test]
    fn test_events_follow_lock_order() {
        let controller = Arc::new(GenerationController::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        // Cancels from inside the Started delivery, before later listeners ran
        let inner = Arc::clone(&controller);
        let _canceller = controller.subscribe(ControllerEventKind::Started, move |id| {
            inner.cancel(id);
        });
        let s = Arc::clone(&seen);
        let _started = controller.subscribe(ControllerEventKind::Started, move |id| {
            s.lock().unwrap().push(format!("started:{}", id));
        });
        let s = Arc::clone(&seen);
        let _cancelled = controller.subscribe(ControllerEventKind::Cancelled, move |id| {
            s.lock().unwrap().push(format!("cancelled:{}", id));
        });

        let (count, callback) = counter();
        assert!(controller.try_register(JobId::new("a"), callback));

        assert_eq!(*seen.lock().unwrap(), vec!["started:a", "cancelled:a"]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!controller.is_active(&JobId::new("a")));
    }

    #[test]
    fn test_panicking_listener_does_not_stall_delivery() {
        let controller = GenerationController::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let _completed = controller.subscribe(ControllerEventKind::Completed, move |id| {
            s.lock().unwrap().push(id.to_string());
        });
        let panicky = controller.subscribe(ControllerEventKind::Started, |_| panic!("listener failed"));

        let (_, callback) = counter();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            controller.register(JobId::new("a"), callback)
        }));
        assert!(result.is_err());
        panicky.unsubscribe();

        assert!(controller.complete(&JobId::new("a")));
        assert_eq!(*seen.lock().unwrap(), vec!["a"]);
    }
}
