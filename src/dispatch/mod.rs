//! Script dispatch core - calling into the hosted scripting VM
//!
//! Design: pack once, resolve per variant, dispatch through the shape the
//! running host build expects.
//!
//! Architecture:
//! - `pack.rs` - native argument lists into host Variable sequences
//! - `staged.rs` - pinned staging object for the legacy call shape
//! - `call.rs` - variant selection and entry-point invocation
//! - `events.rs` - pack-once broadcast to registered script subscribers

mod call;
mod events;
mod pack;
mod staged;

pub use call::Dispatcher;
pub use events::EventBroadcaster;
pub use pack::{pack_args, ArgList, IntoVariable};
pub use staged::StagedArgs;

use std::sync::atomic::{AtomicU64, Ordering};

// Counters are cheap enough to keep on in every build; they double as the
// observation point for the "current interface never stages" invariant.
static STATIC_CALLS: AtomicU64 = AtomicU64::new(0);
static METHOD_CALLS: AtomicU64 = AtomicU64::new(0);
static LEGACY_DISPATCHES: AtomicU64 = AtomicU64::new(0);
static REJECTIONS: AtomicU64 = AtomicU64::new(0);
static STAGED_CONSTRUCTED: AtomicU64 = AtomicU64::new(0);
static STAGED_RELEASED: AtomicU64 = AtomicU64::new(0);
static EVENTS_BROADCAST: AtomicU64 = AtomicU64::new(0);
static SUBSCRIBER_DISPATCHES: AtomicU64 = AtomicU64::new(0);

/// Snapshot of the dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Static-call dispatch requests issued.
    pub static_calls: u64,
    /// Method-call dispatch requests issued (broadcast dispatches included).
    pub method_calls: u64,
    /// Requests that went through a legacy vtable entry point.
    pub legacy_dispatches: u64,
    /// Requests the host declined.
    pub rejections: u64,
    /// Argument staging objects constructed.
    pub staged_constructed: u64,
    /// Argument staging objects released.
    pub staged_released: u64,
    /// External events broadcast.
    pub events_broadcast: u64,
    /// Per-subscriber dispatches performed while broadcasting.
    pub subscriber_dispatches: u64,
}

/// Current counter values.
pub fn stats() -> DispatchStats {
    DispatchStats {
        static_calls: STATIC_CALLS.load(Ordering::Relaxed),
        method_calls: METHOD_CALLS.load(Ordering::Relaxed),
        legacy_dispatches: LEGACY_DISPATCHES.load(Ordering::Relaxed),
        rejections: REJECTIONS.load(Ordering::Relaxed),
        staged_constructed: STAGED_CONSTRUCTED.load(Ordering::Relaxed),
        staged_released: STAGED_RELEASED.load(Ordering::Relaxed),
        events_broadcast: EVENTS_BROADCAST.load(Ordering::Relaxed),
        subscriber_dispatches: SUBSCRIBER_DISPATCHES.load(Ordering::Relaxed),
    }
}

/// Reset every counter to zero. Useful for test isolation.
pub fn reset_stats() {
    STATIC_CALLS.store(0, Ordering::Relaxed);
    METHOD_CALLS.store(0, Ordering::Relaxed);
    LEGACY_DISPATCHES.store(0, Ordering::Relaxed);
    REJECTIONS.store(0, Ordering::Relaxed);
    STAGED_CONSTRUCTED.store(0, Ordering::Relaxed);
    STAGED_RELEASED.store(0, Ordering::Relaxed);
    EVENTS_BROADCAST.store(0, Ordering::Relaxed);
    SUBSCRIBER_DISPATCHES.store(0, Ordering::Relaxed);
}

pub(crate) fn record_static_call() {
    STATIC_CALLS.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_method_call() {
    METHOD_CALLS.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_legacy_dispatch() {
    LEGACY_DISPATCHES.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_rejection() {
    REJECTIONS.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_staged_constructed() {
    STAGED_CONSTRUCTED.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_staged_released() {
    STAGED_RELEASED.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_event_broadcast() {
    EVENTS_BROADCAST.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_subscriber_dispatch() {
    SUBSCRIBER_DISPATCHES.fetch_add(1, Ordering::Relaxed);
}

// Serializes every test that constructs staging objects or reads the global
// counters; without it parallel tests corrupt each other's snapshots.
#[cfg(test)]
pub(crate) static TEST_COUNTER_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
