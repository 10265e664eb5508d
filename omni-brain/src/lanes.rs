//! Concurrency arbiter: execution lanes and the cancellation signal
//!
//! **[BRN-ARB-010]** Two logical lanes, Deep (full answers) and Fast
//! (intent classification), each with an exclusive lock over the resource
//! it drives. When both lanes are bound to the same physical model the
//! locks are the *same* mutex instance, decided once at startup from the
//! resource bindings: never two independent locks over one resource and
//! never reassigned at runtime.
//!
//! **[BRN-ARB-020]** The cancellation signal is advisory: a Deep request
//! raises it before acquiring its lock, and it is cleared at the start of
//! the next Deep inference call. Fast-lane work observes an epoch token at
//! its start and checks it at stage boundaries; a changed epoch licenses
//! the caller to discard the stale result. Nothing is force-interrupted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// The lane locks. `fast` aliases `deep` when both lanes share hardware.
#[derive(Clone)]
pub struct LaneLocks {
    pub deep: Arc<Mutex<()>>,
    pub fast: Arc<Mutex<()>>,
}

impl LaneLocks {
    /// Build the locks from the resource-binding table: one (runtime URL,
    /// model) pair per lane. Equal bindings mean one physical resource and
    /// therefore one shared mutex.
    pub fn from_bindings(deep_binding: (&str, &str), fast_binding: (&str, &str)) -> Self {
        let deep = Arc::new(Mutex::new(()));
        let fast = if deep_binding == fast_binding {
            debug!("Fast lane shares the deep model; aliasing lane locks");
            Arc::clone(&deep)
        } else {
            Arc::new(Mutex::new(()))
        };
        Self { deep, fast }
    }

    /// Whether both lanes serialize on the same physical resource.
    pub fn shares_resource(&self) -> bool {
        Arc::ptr_eq(&self.deep, &self.fast)
    }
}

#[derive(Default)]
struct CancelInner {
    epoch: AtomicU64,
    raised: AtomicBool,
}

/// Shared cooperative cancellation signal.
///
/// The epoch counter distinguishes "raised before I started" from "raised
/// since I started": Fast work snapshots `observe()` once and only results
/// from calls predating a newer raise are discardable.
#[derive(Clone, Default)]
pub struct CancelFlag {
    inner: Arc<CancelInner>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raised at the start of every Deep request.
    pub fn raise(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.raised.store(true, Ordering::SeqCst);
    }

    /// Cleared at the start of the next Deep inference call.
    pub fn clear(&self) {
        self.inner.raised.store(false, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.inner.raised.load(Ordering::SeqCst)
    }

    /// Epoch token for a starting Fast call.
    pub fn observe(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// True when a Deep request arrived after the token was taken; the
    /// holder's in-flight result is stale and may be discarded.
    pub fn superseded(&self, token: u64) -> bool {
        self.inner.epoch.load(Ordering::SeqCst) != token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_bindings_alias_to_one_mutex() {
        let lanes = LaneLocks::from_bindings(
            ("http://127.0.0.1:8080", "gemma-3-1b-it"),
            ("http://127.0.0.1:8080", "gemma-3-1b-it"),
        );
        assert!(lanes.shares_resource());
    }

    #[test]
    fn distinct_bindings_get_independent_mutexes() {
        let lanes = LaneLocks::from_bindings(
            ("http://127.0.0.1:8080", "gemma-3-1b-it"),
            ("http://127.0.0.1:8090", "qwen-0.5b"),
        );
        assert!(!lanes.shares_resource());
    }

    #[tokio::test]
    async fn aliased_lanes_are_mutually_exclusive() {
        let lanes = LaneLocks::from_bindings(("u", "m"), ("u", "m"));
        let deep_guard = lanes.deep.lock().await;
        assert!(lanes.fast.try_lock().is_err());
        drop(deep_guard);
        assert!(lanes.fast.try_lock().is_ok());
    }

    #[test]
    fn a_call_started_before_a_raise_is_discardable() {
        let flag = CancelFlag::new();
        let token = flag.observe();
        assert!(!flag.superseded(token));

        flag.raise();
        assert!(flag.is_raised());
        assert!(flag.superseded(token));

        // Clearing licenses new work but keeps old tokens stale
        flag.clear();
        assert!(!flag.is_raised());
        assert!(flag.superseded(token));

        let fresh = flag.observe();
        assert!(!flag.superseded(fresh));
    }
}
