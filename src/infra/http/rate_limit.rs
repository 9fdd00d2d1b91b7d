use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use metrics::counter;

/// Sweep expired windows once the table grows past this many clients.
const GC_THRESHOLD: usize = 1000;

#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    count: u32,
    window_reset: Instant,
}

/// Fixed-window request throttle keyed by client identifier.
///
/// State is local to one process instance: with horizontal scale the
/// effective ceiling multiplies per instance. That is acceptable for the
/// guarded action (form spam mitigation), not for a security boundary.
#[derive(Debug, Clone)]
pub struct FormRateLimiter {
    window: Duration,
    max_requests: u32,
    records: Arc<DashMap<String, WindowRecord>>,
}

impl FormRateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            records: Arc::new(DashMap::new()),
        }
    }

    pub fn allow(&self, client_id: &str) -> bool {
        self.allow_at(client_id, Instant::now())
    }

    fn allow_at(&self, client_id: &str, now: Instant) -> bool {
        if self.records.len() > GC_THRESHOLD {
            self.records.retain(|_, record| record.window_reset > now);
        }

        let mut record = self
            .records
            .entry(client_id.to_string())
            .or_insert(WindowRecord {
                count: 0,
                window_reset: now + self.window,
            });

        if now >= record.window_reset {
            record.count = 1;
            record.window_reset = now + self.window;
            return true;
        }

        if record.count < self.max_requests {
            record.count += 1;
            return true;
        }

        counter!("vetrina_form_rate_limited_total").increment(1);
        false
    }

    pub fn retry_after_secs(&self) -> u64 {
        self.window.as_secs().max(1)
    }

    /// Number of client windows currently tracked, expired or not.
    pub fn tracked_clients(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> FormRateLimiter {
        FormRateLimiter::new(Duration::from_secs(600), 3)
    }

    #[test]
    fn ceiling_within_one_window() {
        let limiter = limiter();
        let start = Instant::now();

        assert!(limiter.allow_at("client", start));
        assert!(limiter.allow_at("client", start + Duration::from_secs(1)));
        assert!(limiter.allow_at("client", start + Duration::from_secs(2)));
        assert!(!limiter.allow_at("client", start + Duration::from_secs(3)));
        assert!(!limiter.allow_at("client", start + Duration::from_secs(599)));
    }

    #[test]
    fn window_lapse_resets_the_count() {
        let limiter = limiter();
        let start = Instant::now();

        for n in 0..3 {
            assert!(limiter.allow_at("client", start + Duration::from_secs(n)));
        }
        assert!(!limiter.allow_at("client", start + Duration::from_secs(3)));

        let next_window = start + Duration::from_secs(600);
        assert!(limiter.allow_at("client", next_window));
        // The fresh window starts at count 1, so two more fit.
        assert!(limiter.allow_at("client", next_window + Duration::from_secs(1)));
        assert!(limiter.allow_at("client", next_window + Duration::from_secs(2)));
        assert!(!limiter.allow_at("client", next_window + Duration::from_secs(3)));
    }

    #[test]
    fn clients_are_isolated() {
        let limiter = limiter();
        let start = Instant::now();

        for n in 0..3 {
            assert!(limiter.allow_at("first", start + Duration::from_secs(n)));
        }
        assert!(!limiter.allow_at("first", start + Duration::from_secs(3)));

        assert!(limiter.allow_at("second", start + Duration::from_secs(3)));
    }

    #[test]
    fn sweep_reclaims_expired_records() {
        let limiter = FormRateLimiter::new(Duration::from_secs(10), 3);
        let start = Instant::now();

        for n in 0..1001 {
            assert!(limiter.allow_at(&format!("client-{n}"), start));
        }
        assert!(limiter.tracked_clients() > GC_THRESHOLD);

        // All 1001 windows have elapsed; the next call sweeps them.
        assert!(limiter.allow_at("fresh", start + Duration::from_secs(11)));
        assert!(limiter.tracked_clients() < GC_THRESHOLD);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn sweep_keeps_live_windows() {
        let limiter = FormRateLimiter::new(Duration::from_secs(600), 3);
        let start = Instant::now();

        for n in 0..1001 {
            limiter.allow_at(&format!("client-{n}"), start);
        }

        // Windows are still open, so the sweep removes nothing.
        limiter.allow_at("fresh", start + Duration::from_secs(1));
        assert_eq!(limiter.tracked_clients(), 1002);
    }
}
