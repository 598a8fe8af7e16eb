use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Bound on accepted requests per client within a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub limit: u32,
    pub window: Duration,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            limit: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RatePolicy {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }
}

struct TrackerState {
    hits: HashMap<String, Vec<Instant>>,
    last_sweep: Instant,
}

/// Sliding-window request tracker keyed by client address.
///
/// Check-and-append runs under one mutex acquisition, so two concurrent
/// requests from the same address cannot both observe a count just under the
/// limit and both get admitted. Stale keys are swept at most once per window
/// to keep the map bounded under address churn.
pub struct RateTracker {
    policy: RatePolicy,
    state: Mutex<TrackerState>,
}

impl RateTracker {
    pub fn new(policy: RatePolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(TrackerState {
                hits: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    pub fn policy(&self) -> RatePolicy {
        self.policy
    }

    /// Record an attempt from `client_id` at `now`; returns whether it is
    /// admitted. Timestamps older than the window are pruned before counting.
    pub fn check(&self, client_id: &str, now: Instant) -> bool {
        let mut state = self.state.lock().expect("rate tracker mutex poisoned");

        if now.duration_since(state.last_sweep) >= self.policy.window {
            let window = self.policy.window;
            state
                .hits
                .retain(|_, stamps| stamps.last().is_some_and(|last| now - *last < window));
            state.last_sweep = now;
        }

        let stamps = state.hits.entry(client_id.to_string()).or_default();
        stamps.retain(|stamp| now - *stamp < self.policy.window);

        if stamps.len() >= self.policy.limit as usize {
            return false;
        }

        stamps.push(now);
        true
    }

    /// Number of distinct client keys currently tracked.
    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.state
            .lock()
            .expect("rate tracker mutex poisoned")
            .hits
            .len()
    }
}
