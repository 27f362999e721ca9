use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub signups: Arc<AtomicU64>,
    pub signins: Arc<AtomicU64>,
    pub signin_failures: Arc<AtomicU64>,
    pub auth_rejections: Arc<AtomicU64>,
    pub contents_created: Arc<AtomicU64>,
    pub contents_updated: Arc<AtomicU64>,
    pub contents_deleted: Arc<AtomicU64>,
    pub shares_created: Arc<AtomicU64>,
    pub share_views: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            signups: Arc::new(AtomicU64::new(0)),
            signins: Arc::new(AtomicU64::new(0)),
            signin_failures: Arc::new(AtomicU64::new(0)),
            auth_rejections: Arc::new(AtomicU64::new(0)),
            contents_created: Arc::new(AtomicU64::new(0)),
            contents_updated: Arc::new(AtomicU64::new(0)),
            contents_deleted: Arc::new(AtomicU64::new(0)),
            shares_created: Arc::new(AtomicU64::new(0)),
            share_views: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_signups(&self) {
        self.signups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_signins(&self) {
        self.signins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_signin_failures(&self) {
        self.signin_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_auth_rejections(&self) {
        self.auth_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_contents_created(&self) {
        self.contents_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_contents_updated(&self) {
        self.contents_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_contents_deleted(&self) {
        self.contents_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_shares_created(&self) {
        self.shares_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_share_views(&self) {
        self.share_views.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            signups: self.signups.load(Ordering::Relaxed),
            signins: self.signins.load(Ordering::Relaxed),
            signin_failures: self.signin_failures.load(Ordering::Relaxed),
            auth_rejections: self.auth_rejections.load(Ordering::Relaxed),
            contents_created: self.contents_created.load(Ordering::Relaxed),
            contents_updated: self.contents_updated.load(Ordering::Relaxed),
            contents_deleted: self.contents_deleted.load(Ordering::Relaxed),
            shares_created: self.shares_created.load(Ordering::Relaxed),
            share_views: self.share_views.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub signups: u64,
    pub signins: u64,
    pub signin_failures: u64,
    pub auth_rejections: u64,
    pub contents_created: u64,
    pub contents_updated: u64,
    pub contents_deleted: u64,
    pub shares_created: u64,
    pub share_views: u64,
    pub uptime_seconds: u64,
}
