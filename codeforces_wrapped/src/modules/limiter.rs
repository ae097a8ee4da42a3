use crate::modules::error::AppError;
use axum::{
    extract::{ConnectInfo, State},
    middleware::Next,
    response::Response,
};
use http::Request;
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tokio::{
    sync::Mutex,
    time::{Duration, Instant},
};

/// Number of tracked clients at which stale entries are swept before admitting a new one.
const PURGE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub limit: u64,
    pub period: Duration,
}

impl Quota {
    pub fn new(limit: u64, period: Duration) -> Self {
        Self { limit, period }
    }

    pub fn per_minute(limit: u64) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    pub fn per_hour(limit: u64) -> Self {
        Self::new(limit, Duration::from_secs(60 * 60))
    }

    pub fn per_day(limit: u64) -> Self {
        Self::new(limit, Duration::from_secs(24 * 60 * 60))
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u64,
}

/// Fixed window request counter keyed by client address.
///
/// A request is admitted only if every quota still has room, and only admitted requests are
/// counted.
#[derive(Debug)]
pub struct RateLimiter {
    quotas: Vec<Quota>,
    purge_threshold: usize,
    windows: Mutex<HashMap<IpAddr, Vec<Window>>>,
}

impl RateLimiter {
    pub fn new(quotas: Vec<Quota>) -> Self {
        Self::with_purge_threshold(quotas, PURGE_THRESHOLD)
    }

    pub fn with_purge_threshold(quotas: Vec<Quota>, purge_threshold: usize) -> Self {
        Self {
            quotas,
            purge_threshold,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        if windows.len() >= self.purge_threshold && !windows.contains_key(&client) {
            let quotas = &self.quotas;
            windows.retain(|_, entries| {
                entries
                    .iter()
                    .zip(quotas.iter())
                    .any(|(window, quota)| now.duration_since(window.started_at) < quota.period)
            });
        }

        let entries = windows.entry(client).or_insert_with(|| {
            self.quotas
                .iter()
                .map(|_| Window {
                    started_at: now,
                    count: 0,
                })
                .collect()
        });

        for (window, quota) in entries.iter_mut().zip(self.quotas.iter()) {
            if now.duration_since(window.started_at) >= quota.period {
                window.started_at = now;
                window.count = 0;
            }
        }

        let admitted = entries
            .iter()
            .zip(self.quotas.iter())
            .all(|(window, quota)| window.count < quota.limit);
        if admitted {
            entries.iter_mut().for_each(|window| window.count += 1);
        }

        admitted
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// The limiter of every other route and the one that replaces it on `/generate_wrapped`.
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub default: Arc<RateLimiter>,
    pub wrapped: Arc<RateLimiter>,
}

impl RateLimits {
    pub fn new(default: Vec<Quota>, wrapped: Vec<Quota>) -> Self {
        Self {
            default: Arc::new(RateLimiter::new(default)),
            wrapped: Arc::new(RateLimiter::new(wrapped)),
        }
    }

    pub fn standard() -> Self {
        Self::new(
            vec![Quota::per_day(15000), Quota::per_hour(600)],
            vec![Quota::per_minute(50)],
        )
    }
}

pub async fn rate_limit<B>(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !limiter.check(client).await {
        tracing::warn!("rate limit exceeded by {}", client);
        return Err(AppError::RateLimited);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::time;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 168, 0, last))
    }

    #[tokio::test]
    async fn test_limit_within_window() {
        time::pause();
        let limiter = RateLimiter::new(vec![Quota::per_minute(3)]);

        assert!(limiter.check(ip(1)).await);
        assert!(limiter.check(ip(1)).await);
        assert!(limiter.check(ip(1)).await);
        assert!(!limiter.check(ip(1)).await);
    }

    #[tokio::test]
    async fn test_clients_are_counted_separately() {
        time::pause();
        let limiter = RateLimiter::new(vec![Quota::per_minute(1)]);

        assert!(limiter.check(ip(1)).await);
        assert!(!limiter.check(ip(1)).await);
        assert!(limiter.check(ip(2)).await);
    }

    #[tokio::test]
    async fn test_window_resets_after_period() {
        time::pause();
        let limiter = RateLimiter::new(vec![Quota::per_minute(1)]);

        assert!(limiter.check(ip(1)).await);
        assert!(!limiter.check(ip(1)).await);

        time::advance(Duration::from_secs(61)).await;
        assert!(limiter.check(ip(1)).await);
    }

    #[tokio::test]
    async fn test_tightest_quota_wins() {
        time::pause();
        let limiter = RateLimiter::new(vec![Quota::per_day(100), Quota::per_hour(2)]);

        assert!(limiter.check(ip(1)).await);
        assert!(limiter.check(ip(1)).await);
        assert!(!limiter.check(ip(1)).await);

        time::advance(Duration::from_secs(60 * 60)).await;
        assert!(limiter.check(ip(1)).await);
    }

    #[tokio::test]
    async fn test_rejected_requests_are_not_counted() {
        time::pause();
        let limiter = RateLimiter::new(vec![Quota::per_day(3), Quota::per_minute(1)]);

        assert!(limiter.check(ip(1)).await);
        assert!(!limiter.check(ip(1)).await);
        assert!(!limiter.check(ip(1)).await);

        time::advance(Duration::from_secs(60)).await;
        assert!(limiter.check(ip(1)).await);
        time::advance(Duration::from_secs(60)).await;
        assert!(limiter.check(ip(1)).await);
        time::advance(Duration::from_secs(60)).await;
        assert!(!limiter.check(ip(1)).await);
    }

    #[tokio::test]
    async fn test_expired_clients_are_swept() {
        time::pause();
        let limiter = RateLimiter::with_purge_threshold(vec![Quota::per_minute(1)], 3);

        for last in 1..=3 {
            assert!(limiter.check(ip(last)).await);
        }
        assert_eq!(limiter.tracked_clients().await, 3);

        time::advance(Duration::from_secs(61)).await;
        assert!(limiter.check(ip(4)).await);

        assert_eq!(limiter.tracked_clients().await, 1);
    }

    #[tokio::test]
    async fn test_active_clients_survive_sweep() {
        time::pause();
        let limiter = RateLimiter::with_purge_threshold(vec![Quota::per_minute(1)], 3);

        assert!(limiter.check(ip(1)).await);
        time::advance(Duration::from_secs(45)).await;
        assert!(limiter.check(ip(2)).await);
        assert!(limiter.check(ip(3)).await);

        time::advance(Duration::from_secs(30)).await;
        assert!(limiter.check(ip(4)).await);

        assert_eq!(limiter.tracked_clients().await, 3);
        assert!(!limiter.check(ip(2)).await);
    }

    #[tokio::test]
    async fn test_standard_limits() {
        let limits = RateLimits::standard();

        assert_eq!(
            limits.default.quotas,
            vec![Quota::per_day(15000), Quota::per_hour(600)]
        );
        assert_eq!(limits.wrapped.quotas, vec![Quota::per_minute(50)]);
    }
}
