//! GEMM front-end: solution registration and replay.
//!
//! A solution arrives as one or two kernel source stages from a solution
//! generator. Registration normalizes each stage's offset parameter widths,
//! compiles the stages in submission order, and caches the resulting plan
//! under the problem's config key. Replay looks the plan up and dispatches
//! it through [`dispatch_gemm`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use clforge::desc::DType;
use clforge::error::{EngineError, EngineResult};
use clforge::geometry::WorkGeometry;
use clforge::key::ConfigKey;
use clforge::normalize::normalize_offset_width;

use crate::dispatch::{dispatch_gemm, GemmCoefficients, GemmOperands};
use crate::queue::DeviceQueue;
use crate::registry::{KernelHandle, KernelPlan, KernelRegistry};

pub const GEMM_OPERATION: &str = "gemm";

/// One kernel stage of a generated GEMM solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GemmKernelSource {
    pub source: String,
    pub entry: String,
    pub compile_options: String,
    pub local_work_size: [usize; 3],
    pub global_work_size: [usize; 3],
}

/// A generated solution: its stages in submission order, the scale stage (if
/// present) first and the main stage last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GemmSolution {
    pub stages: Vec<GemmKernelSource>,
}

/// The GEMM problem geometry that a solution is specialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GemmProblem {
    pub trans_a: bool,
    pub trans_b: bool,
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub lda: usize,
    pub ldb: usize,
    pub ldc: usize,
    pub dtype: DType,
}

impl GemmProblem {
    pub fn config_key(&self) -> ConfigKey {
        ConfigKey::builder("gemm")
            .field("ta", u8::from(self.trans_a))
            .field("tb", u8::from(self.trans_b))
            .field("m", self.m)
            .field("n", self.n)
            .field("k", self.k)
            .field("lda", self.lda)
            .field("ldb", self.ldb)
            .field("ldc", self.ldc)
            .field("dtype", self.dtype.tag())
            .finish()
    }
}

pub struct GemmEngine<Q: DeviceQueue> {
    queue: Arc<Q>,
    registry: KernelRegistry<Q>,
}

impl<Q: DeviceQueue> GemmEngine<Q> {
    pub fn new(queue: Arc<Q>) -> Self {
        Self {
            queue,
            registry: KernelRegistry::new(),
        }
    }

    pub fn registry(&self) -> &KernelRegistry<Q> {
        &self.registry
    }

    /// Compiles and registers a solution under the problem's config key.
    ///
    /// The stage cardinality is validated before any compilation; a solution
    /// with zero stages or more than two is rejected outright. Registering a
    /// problem that already has a cached plan keeps the existing plan and
    /// compiles nothing.
    pub fn add_solution(&self, problem: &GemmProblem, solution: &GemmSolution) -> EngineResult<()> {
        let count = solution.stages.len();
        if count == 0 || count > 2 {
            return Err(EngineError::PlanCardinality { count });
        }

        let key = problem.config_key();
        self.registry.get_or_build(GEMM_OPERATION, &key, || {
            let mut handles = Vec::with_capacity(count);
            for (ordinal, stage) in solution.stages.iter().enumerate() {
                let source = normalize_offset_width(&stage.source);
                let geometry =
                    WorkGeometry::new(stage.local_work_size, stage.global_work_size);
                let kernel = self.queue.build_kernel(
                    &source,
                    &stage.entry,
                    &stage.compile_options,
                    &geometry,
                )?;
                handles.push(KernelHandle {
                    kernel,
                    geometry,
                    ordinal,
                });
            }
            KernelPlan::from_stages(handles)
        })?;
        Ok(())
    }

    /// Replays a previously registered solution.
    pub fn run_solution(
        &self,
        problem: &GemmProblem,
        operands: &GemmOperands<'_, Q::Buffer>,
        coefficients: GemmCoefficients,
    ) -> EngineResult<()> {
        let key = problem.config_key();
        let plan = self
            .registry
            .get(GEMM_OPERATION, &key)?
            .ok_or_else(|| {
                EngineError::execution(format!("no gemm solution registered for {key}"))
            })?;
        dispatch_gemm(self.queue.as_ref(), &plan, operands, coefficients)
    }
}
