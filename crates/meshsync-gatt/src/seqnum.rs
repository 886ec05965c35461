//! Sequence counter with debounced change notification.
//!
//! The counter is the flow-control primitive of the whole protocol: it
//! increments once per packet admitted to the outbound queue, and a freshly
//! connected consumer reads it to learn how far behind it is. Notifications
//! are debounced so a burst of admissions while the consumer is already
//! draining the queue produces a single notify instead of flooding the link.

use log::debug;

/// Delay between an admission and its change notification. Admissions within
/// this window coalesce into one notification carrying the final value.
pub const NOTIFY_DEBOUNCE_MS: u64 = 100;

/// Monotonic per-session admission counter.
///
/// The value never decreases within a session; the only permitted decrease is
/// the reset to zero on a service restart, which a consumer must treat as
/// "device restarted, discard cached state and resynchronize".
#[derive(Debug, Default)]
pub struct SequenceCounter {
    value: u32,
    /// Deadline of the pending debounced notification, if armed. Re-arming
    /// supersedes the previous deadline; at most one notification is pending.
    notify_at: Option<u64>,
}

impl SequenceCounter {
    /// Create a counter at zero with no pending notification.
    pub fn new() -> Self {
        SequenceCounter::default()
    }

    /// Current counter value.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Record one admission at time `now_ms`: increment and (re)arm the
    /// debounce timer. Returns the sequence number assigned to the admission.
    pub fn admit(&mut self, now_ms: u64) -> u32 {
        self.value = self.value.wrapping_add(1);
        self.notify_at = Some(now_ms + NOTIFY_DEBOUNCE_MS);
        self.value
    }

    /// Fire the pending notification if its window has elapsed.
    ///
    /// Returns the value to notify, at most once per armed window.
    pub fn poll(&mut self, now_ms: u64) -> Option<u32> {
        match self.notify_at {
            Some(deadline) if now_ms >= deadline => {
                self.notify_at = None;
                debug!("fromNum notify fires with value {}", self.value);
                Some(self.value)
            }
            _ => None,
        }
    }

    /// Drop any pending notification without firing it.
    pub fn disarm(&mut self) {
        self.notify_at = None;
    }

    /// Reset to zero, as on service restart. The consumer detects the restart
    /// by observing the decrease.
    pub fn restart(&mut self) {
        self.value = 0;
        self.notify_at = None;
    }
}
