//! Device-facing half of the engine: the kernel registry (specialize once,
//! reuse forever), tagged kernel plans with ordered multi-kernel dispatch,
//! and the activation and GEMM front-ends that drive them against a
//! `DeviceQueue` collaborator.

pub mod activation;
pub mod args;
pub mod dispatch;
pub mod gemm;
pub mod queue;
pub mod registry;

pub use activation::{
    ActivationCoefficients, ActivationEngine, ActivationMode, ConstructedKernel,
    NeuronSourceProvider, StridedKernelRequest, TensorArg,
};
pub use dispatch::{dispatch_gemm, GemmCoefficients, GemmOperands};
pub use gemm::{GemmEngine, GemmKernelSource, GemmProblem, GemmSolution};
pub use queue::{DeviceQueue, KernelArg};
pub use registry::{KernelHandle, KernelPlan, KernelRegistry};
