//! Process-wide engine counters: cache traffic and kernel launches.
//! Counters are relaxed atomics; readers get a point-in-time snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

static CACHE_HITS: AtomicU64 = AtomicU64::new(0);
static CACHE_MISSES: AtomicU64 = AtomicU64::new(0);
static PLAN_BUILDS: AtomicU64 = AtomicU64::new(0);
static KERNEL_LAUNCHES: AtomicU64 = AtomicU64::new(0);

#[inline(always)]
pub fn cache_hit() {
    CACHE_HITS.fetch_add(1, Ordering::Relaxed);
}

#[inline(always)]
pub fn cache_miss() {
    CACHE_MISSES.fetch_add(1, Ordering::Relaxed);
}

#[inline(always)]
pub fn plan_built() {
    PLAN_BUILDS.fetch_add(1, Ordering::Relaxed);
}

#[inline(always)]
pub fn kernel_launched() {
    KERNEL_LAUNCHES.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub plan_builds: u64,
    pub kernel_launches: u64,
}

pub fn snapshot() -> CounterSnapshot {
    CounterSnapshot {
        cache_hits: CACHE_HITS.load(Ordering::Relaxed),
        cache_misses: CACHE_MISSES.load(Ordering::Relaxed),
        plan_builds: PLAN_BUILDS.load(Ordering::Relaxed),
        kernel_launches: KERNEL_LAUNCHES.load(Ordering::Relaxed),
    }
}
