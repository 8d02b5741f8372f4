//! Request throttling: a per-client-IP limit and a global one, both token
//! buckets. The per-IP bucket is consulted first.

use crate::response::WebResponse;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use configuration::RateLimitSettings;
use governor::{DefaultDirectRateLimiter, DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Number of checks between sweeps of idle per-IP buckets.
pub const PRUNE_EVERY: u64 = 1024;

pub struct RateLimits {
    global: DefaultDirectRateLimiter,
    per_ip: DefaultKeyedRateLimiter<IpAddr>,
    checks: AtomicU64,
}

/// Which limit rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exceeded {
    PerIp,
    Global,
}

impl RateLimits {
    /// `None` when limiting is disabled or a limit is zero.
    pub fn new(settings: &RateLimitSettings) -> Option<Arc<Self>> {
        if !settings.enabled {
            return None;
        }
        let global = NonZeroU32::new(settings.global_per_second)?;
        let per_ip = NonZeroU32::new(settings.per_ip_per_second)?;
        Some(Arc::new(Self {
            global: RateLimiter::direct(Quota::per_second(global)),
            per_ip: RateLimiter::keyed(Quota::per_second(per_ip)),
            checks: AtomicU64::new(0),
        }))
    }

    /// Every [`PRUNE_EVERY`]th call also drops per-IP buckets that have fully
    /// refilled, so the keyed state only holds recently active clients.
    pub fn check(&self, ip: IpAddr) -> Result<(), Exceeded> {
        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_EVERY == 0 {
            self.prune();
        }
        self.per_ip.check_key(&ip).map_err(|_| Exceeded::PerIp)?;
        self.global.check().map_err(|_| Exceeded::Global)?;
        Ok(())
    }

    /// Forgets clients whose bucket is indistinguishable from a fresh one.
    pub fn prune(&self) {
        let before = self.per_ip.len();
        self.per_ip.retain_recent();
        self.per_ip.shrink_to_fit();
        tracing::debug!(before, after = self.per_ip.len(), "Pruned idle rate-limit buckets.");
    }

    /// Number of client IPs currently holding per-IP state.
    pub fn tracked_clients(&self) -> usize {
        self.per_ip.len()
    }
}

/// Middleware rejecting requests over either limit with 429.
pub async fn limit(State(limits): State<Arc<RateLimits>>, req: Request, next: Next) -> Response {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limits.check(ip) {
        Ok(()) => next.run(req).await,
        Err(exceeded) => {
            tracing::warn!(%ip, ?exceeded, path = %req.uri().path(), "Rate limit exceeded.");
            WebResponse::error("too-many-requests").with_status(429).into_response()
        }
    }
}
