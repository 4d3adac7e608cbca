//! src/util/debounce.rs
//! ============================================================================
//! # Search Input Debouncing
//!
//! Rate-limits the search-query mutation path so the visible set is not
//! re-derived on every keystroke. Each view owns its own `SearchDebounce`
//! value; there is no shared timer state, so concurrent search inputs can
//! never cancel each other's pending queries.

use std::time::{Duration, Instant};

/// Debouncing configuration.
#[derive(Debug, Clone, Copy)]
pub struct DebounceConfig {
    /// Quiet period after the last keystroke before the value fires.
    pub delay: Duration,
    /// Upper bound: force the value out this long after the first keystroke,
    /// even while typing continues.
    pub max_delay: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(300),
            max_delay: Duration::from_millis(1000),
        }
    }
}

impl DebounceConfig {
    pub fn search_input(delay: Duration) -> Self {
        Self {
            delay,
            max_delay: delay.saturating_mul(4).max(Duration::from_millis(1000)),
        }
    }
}

#[derive(Debug, Clone)]
struct Pending {
    value: String,
    last_submit: Instant,
    first_submit: Instant,
}

/// Instance-owned debounce state. `submit` on every keystroke, `poll` on the
/// event-loop tick; `poll` hands back the settled value exactly once.
#[derive(Debug)]
pub struct SearchDebounce {
    config: DebounceConfig,
    pending: Option<Pending>,
}

impl SearchDebounce {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            pending: None,
        }
    }

    /// Record the latest value; restarts the quiet period, keeps the
    /// first-submit instant for the max-delay bound.
    pub fn submit(&mut self, value: impl Into<String>, now: Instant) {
        let first_submit: Instant = self
            .pending
            .as_ref()
            .map(|p| p.first_submit)
            .unwrap_or(now);
        self.pending = Some(Pending {
            value: value.into(),
            last_submit: now,
            first_submit,
        });
    }

    /// Return the pending value if its quiet period (or the max-delay bound)
    /// has elapsed. Consumes the pending state on fire.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let pending = self.pending.as_ref()?;
        let quiet: bool = now.duration_since(pending.last_submit) >= self.config.delay;
        let overdue: bool = now.duration_since(pending.first_submit) >= self.config.max_delay;
        if quiet || overdue {
            return self.pending.take().map(|p| p.value);
        }
        None
    }

    /// Force the pending value out immediately (e.g. on Enter).
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|p| p.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending value without firing (e.g. on Escape or unmount).
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DebounceConfig {
        DebounceConfig {
            delay: Duration::from_millis(300),
            max_delay: Duration::from_millis(1000),
        }
    }

    #[test]
    fn test_fires_after_quiet_period() {
        let mut d = SearchDebounce::new(config());
        let t0 = Instant::now();
        d.submit("hon", t0);

        assert_eq!(d.poll(t0 + Duration::from_millis(100)), None);
        assert_eq!(
            d.poll(t0 + Duration::from_millis(300)),
            Some("hon".to_string())
        );
        // consumed: does not fire twice
        assert_eq!(d.poll(t0 + Duration::from_millis(600)), None);
    }

    #[test]
    fn test_resubmit_restarts_quiet_period() {
        let mut d = SearchDebounce::new(config());
        let t0 = Instant::now();
        d.submit("h", t0);
        d.submit("ho", t0 + Duration::from_millis(200));

        assert_eq!(d.poll(t0 + Duration::from_millis(400)), None);
        assert_eq!(
            d.poll(t0 + Duration::from_millis(500)),
            Some("ho".to_string())
        );
    }

    #[test]
    fn test_max_delay_forces_fire_while_typing() {
        let mut d = SearchDebounce::new(config());
        let t0 = Instant::now();
        // keystrokes every 200ms keep the quiet period from ever elapsing
        for i in 0..6u64 {
            d.submit(format!("q{i}"), t0 + Duration::from_millis(200 * i));
        }
        assert_eq!(
            d.poll(t0 + Duration::from_millis(1000)),
            Some("q5".to_string())
        );
    }

    #[test]
    fn test_instances_are_independent() {
        let mut a = SearchDebounce::new(config());
        let mut b = SearchDebounce::new(config());
        let t0 = Instant::now();
        a.submit("alpha", t0);
        b.submit("beta", t0);

        let later = t0 + Duration::from_millis(300);
        assert_eq!(a.poll(later), Some("alpha".to_string()));
        assert_eq!(b.poll(later), Some("beta".to_string()));
    }

    #[test]
    fn test_flush_and_cancel() {
        let mut d = SearchDebounce::new(config());
        let t0 = Instant::now();
        d.submit("now", t0);
        assert_eq!(d.flush(), Some("now".to_string()));

        d.submit("never", t0);
        d.cancel();
        assert!(!d.is_pending());
        assert_eq!(d.poll(t0 + Duration::from_secs(5)), None);
    }
}
