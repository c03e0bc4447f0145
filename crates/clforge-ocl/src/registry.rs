//! Process-lifetime kernel plan cache.
//!
//! The registry is an explicit owned component: engines construct one and
//! tests can construct isolated instances. Entries persist until `clear` or
//! drop; there is no eviction, since the realistic cardinality of
//! shape/operation combinations in one process is bounded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use clforge::error::{EngineError, EngineResult};
use clforge::geometry::WorkGeometry;
use clforge::key::ConfigKey;
use clforge::profiling;

use crate::queue::DeviceQueue;

/// A compiled, launchable kernel with its captured launch geometry and its
/// position in the owning plan.
#[derive(Debug, Clone)]
pub struct KernelHandle<K> {
    pub kernel: K,
    pub geometry: WorkGeometry,
    pub ordinal: usize,
}

/// Ordered kernel set bound to one config key.
///
/// The two cases are statically distinguishable: a fused single kernel, or a
/// scale stage that must be submitted before the accumulate stage that reads
/// its output. Submission order on one queue is the ordering guarantee; no
/// explicit barrier is inserted.
#[derive(Debug, Clone)]
pub enum KernelPlan<K> {
    SingleFused(KernelHandle<K>),
    ScaleThenAccumulate {
        scale: KernelHandle<K>,
        accumulate: KernelHandle<K>,
    },
}

impl<K> KernelPlan<K> {
    /// Builds a plan from stages in submission order: the scale stage (if
    /// any) first, the main stage last. Any other cardinality means a
    /// collaborator produced an invalid plan.
    pub fn from_stages(stages: Vec<KernelHandle<K>>) -> EngineResult<Self> {
        let count = stages.len();
        let mut stages = stages.into_iter();
        match (stages.next(), stages.next()) {
            (Some(single), None) => Ok(KernelPlan::SingleFused(single)),
            (Some(scale), Some(accumulate)) if count == 2 => Ok(KernelPlan::ScaleThenAccumulate {
                scale,
                accumulate,
            }),
            _ => Err(EngineError::PlanCardinality { count }),
        }
    }

    pub fn kernel_count(&self) -> usize {
        match self {
            KernelPlan::SingleFused(_) => 1,
            KernelPlan::ScaleThenAccumulate { .. } => 2,
        }
    }
}

/// Flat mapping from (operation name, config key) to a ready-to-launch plan.
pub struct KernelRegistry<Q: DeviceQueue> {
    plans: Mutex<HashMap<(String, ConfigKey), Arc<KernelPlan<Q::Kernel>>>>,
}

impl<Q: DeviceQueue> KernelRegistry<Q> {
    pub fn new() -> Self {
        Self {
            plans: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached plan, or builds, registers, and returns it.
    ///
    /// The miss-build-insert sequence holds the registry lock, so concurrent
    /// misses for the same key build exactly one plan; concurrent hits only
    /// pay for the lookup. A failed build registers nothing.
    pub fn get_or_build<F>(
        &self,
        operation: &str,
        key: &ConfigKey,
        build: F,
    ) -> EngineResult<Arc<KernelPlan<Q::Kernel>>>
    where
        F: FnOnce() -> EngineResult<KernelPlan<Q::Kernel>>,
    {
        let mut plans = self.lock()?;
        if let Some(existing) = plans.get(&(operation.to_string(), key.clone())) {
            profiling::cache_hit();
            return Ok(Arc::clone(existing));
        }
        profiling::cache_miss();
        let built = Arc::new(build()?);
        profiling::plan_built();
        plans.insert((operation.to_string(), key.clone()), Arc::clone(&built));
        Ok(built)
    }

    pub fn get(
        &self,
        operation: &str,
        key: &ConfigKey,
    ) -> EngineResult<Option<Arc<KernelPlan<Q::Kernel>>>> {
        let plans = self.lock()?;
        Ok(plans.get(&(operation.to_string(), key.clone())).cloned())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|plans| plans.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached plan. Teardown hook for tests and embedders.
    pub fn clear(&self) -> EngineResult<()> {
        self.lock()?.clear();
        Ok(())
    }

    #[allow(clippy::type_complexity)]
    fn lock(
        &self,
    ) -> EngineResult<std::sync::MutexGuard<'_, HashMap<(String, ConfigKey), Arc<KernelPlan<Q::Kernel>>>>>
    {
        self.plans
            .lock()
            .map_err(|_| EngineError::execution("kernel registry mutex poisoned"))
    }
}

impl<Q: DeviceQueue> Default for KernelRegistry<Q> {
    fn default() -> Self {
        Self::new()
    }
}
