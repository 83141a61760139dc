//! Per-client-address request limiting over a sliding 60 second window.
//!
//! A client may make at most `limit` requests in any 60 second span. Time comes
//! from a `governor` clock so tests can drive it with `FakeRelativeClock`.

use std::{
    collections::{HashMap, VecDeque},
    net::IpAddr,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use governor::clock::{Clock, DefaultClock, Reference};

pub const WINDOW: Duration = Duration::from_secs(60);

/// Idle addresses are swept once the table grows past this many entries.
const SWEEP_THRESHOLD: usize = 4096;

/// Admission check used by the rate-limit middleware.
pub trait ClientRateLimit: Send + Sync {
    /// `Err` carries how long until the client may try again.
    fn check(&self, client: IpAddr) -> Result<(), Duration>;

    fn limit(&self) -> u32;
}

pub struct WindowRateLimiter<C: Clock = DefaultClock> {
    limit: u32,
    clock: C,
    hits: Mutex<HashMap<IpAddr, VecDeque<C::Instant>>>,
}

impl WindowRateLimiter<DefaultClock> {
    pub fn new(limit: u32) -> Self {
        Self::with_clock(limit, DefaultClock::default())
    }
}

impl<C: Clock> WindowRateLimiter<C> {
    pub fn with_clock(limit: u32, clock: C) -> Self {
        Self {
            limit: limit.max(1),
            clock,
            hits: Mutex::new(HashMap::new()),
        }
    }
}

fn elapsed<I: Reference>(now: I, earlier: I) -> Duration {
    now.duration_since(earlier).into()
}

impl<C> ClientRateLimit for WindowRateLimiter<C>
where
    C: Clock + Send + Sync,
{
    fn check(&self, client: IpAddr) -> Result<(), Duration> {
        let now = self.clock.now();
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);

        if hits.len() > SWEEP_THRESHOLD {
            hits.retain(|_, log| log.back().is_some_and(|t| elapsed(now, *t) < WINDOW));
        }

        let log = hits.entry(client).or_default();
        while log.front().is_some_and(|t| elapsed(now, *t) >= WINDOW) {
            log.pop_front();
        }

        if log.len() >= self.limit as usize {
            let oldest = log.front().copied().unwrap_or(now);
            return Err(WINDOW.saturating_sub(elapsed(now, oldest)));
        }

        log.push_back(now);
        Ok(())
    }

    fn limit(&self) -> u32 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;
    use std::net::Ipv4Addr;

    const A: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const B: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn test_burst_then_reject() {
        let limiter = WindowRateLimiter::with_clock(5, FakeRelativeClock::default());
        for _ in 0..5 {
            assert!(limiter.check(A).is_ok());
        }
        assert_eq!(limiter.check(A), Err(WINDOW));
        assert!(limiter.check(B).is_ok());
    }

    #[test]
    fn test_window_spans_a_full_minute() {
        let clock = FakeRelativeClock::default();
        let limiter = WindowRateLimiter::with_clock(5, clock.clone());
        for _ in 0..5 {
            assert!(limiter.check(A).is_ok());
        }

        clock.advance(Duration::from_millis(12_500));
        assert_eq!(limiter.check(A), Err(Duration::from_millis(47_500)));

        clock.advance(Duration::from_millis(47_499));
        assert!(limiter.check(A).is_err());

        clock.advance(Duration::from_millis(1));
        assert!(limiter.check(A).is_ok());
    }

    #[test]
    fn test_spread_requests_never_exceed_limit_in_any_window() {
        let clock = FakeRelativeClock::default();
        let limiter = WindowRateLimiter::with_clock(5, clock.clone());
        let mut accepted = Vec::new();
        for step in 0..30u64 {
            if limiter.check(A).is_ok() {
                accepted.push(step * 7);
            }
            clock.advance(Duration::from_secs(7));
        }
        for (i, start) in accepted.iter().enumerate() {
            let in_window = accepted[i..].iter().filter(|t| **t < start + 60).count();
            assert!(in_window <= 5, "window starting at {start}s had {in_window}");
        }
        // Steady traffic still gets its full budget each minute
        assert!(accepted.len() >= 15);
    }

    #[test]
    fn test_zero_limit_is_raised_to_one() {
        let limiter = WindowRateLimiter::with_clock(0, FakeRelativeClock::default());
        assert_eq!(limiter.limit(), 1);
        assert!(limiter.check(A).is_ok());
        assert!(limiter.check(A).is_err());
    }
}
