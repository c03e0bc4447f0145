//! Plan execution: invokes the kernel(s) bound to one config key in the
//! plan-mandated order with the correct buffer offsets and coefficients.

use clforge::error::EngineResult;
use clforge::profiling;

use crate::args::OperatorArgs;
use crate::queue::{DeviceQueue, KernelArg};
use crate::registry::{KernelHandle, KernelPlan};

/// The three GEMM buffer roles with their element offsets.
pub struct GemmOperands<'a, B> {
    pub a: &'a B,
    pub a_offset: u32,
    pub b: &'a B,
    pub b_offset: u32,
    pub c: &'a B,
    pub c_offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GemmCoefficients {
    pub alpha: f32,
    pub beta: f32,
}

/// Runs a GEMM plan.
///
/// Single fused kernel: `C = alpha * A * B + beta * C` in one launch, with
/// every buffer, offset, and both coefficients bound in template order.
/// Split plan: the scale kernel runs `C *= beta` and must be submitted
/// before the accumulate kernel runs `C += alpha * A * B`; in-order queue
/// submission makes the scale result visible without a barrier.
pub fn dispatch_gemm<Q: DeviceQueue>(
    queue: &Q,
    plan: &KernelPlan<Q::Kernel>,
    operands: &GemmOperands<'_, Q::Buffer>,
    coefficients: GemmCoefficients,
) -> EngineResult<()> {
    match plan {
        KernelPlan::SingleFused(handle) => {
            let mut args = OperatorArgs::new();
            args.push("a", KernelArg::Buffer(operands.a.clone()))
                .push("a_offset", KernelArg::OffsetU32(operands.a_offset))
                .push("b", KernelArg::Buffer(operands.b.clone()))
                .push("b_offset", KernelArg::OffsetU32(operands.b_offset))
                .push("c", KernelArg::Buffer(operands.c.clone()))
                .push("c_offset", KernelArg::OffsetU32(operands.c_offset))
                .push("alpha", KernelArg::F32(coefficients.alpha))
                .push("beta", KernelArg::F32(coefficients.beta));
            launch_stage(queue, handle, &args)
        }
        KernelPlan::ScaleThenAccumulate { scale, accumulate } => {
            let mut scale_args = OperatorArgs::new();
            scale_args
                .push("c", KernelArg::Buffer(operands.c.clone()))
                .push("c_offset", KernelArg::OffsetU32(operands.c_offset))
                .push("beta", KernelArg::F32(coefficients.beta));
            launch_stage(queue, scale, &scale_args)?;

            let mut acc_args = OperatorArgs::new();
            acc_args
                .push("a", KernelArg::Buffer(operands.a.clone()))
                .push("a_offset", KernelArg::OffsetU32(operands.a_offset))
                .push("b", KernelArg::Buffer(operands.b.clone()))
                .push("b_offset", KernelArg::OffsetU32(operands.b_offset))
                .push("c", KernelArg::Buffer(operands.c.clone()))
                .push("c_offset", KernelArg::OffsetU32(operands.c_offset))
                .push("alpha", KernelArg::F32(coefficients.alpha));
            launch_stage(queue, accumulate, &acc_args)
        }
    }
}

pub(crate) fn launch_stage<Q: DeviceQueue>(
    queue: &Q,
    handle: &KernelHandle<Q::Kernel>,
    args: &OperatorArgs<Q::Buffer>,
) -> EngineResult<()> {
    profiling::kernel_launched();
    queue.launch(&handle.kernel, &handle.geometry, args.as_slice())
}
