//! Activation front-end: variant selection, specialization, and dispatch for
//! the elementwise transform in both directions.
//!
//! The shape classifier decides between the fused flat-iteration kernel and
//! the general strided kernel from tensor metadata alone; the registry
//! guarantees each distinct geometry is specialized and compiled once.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use clforge::desc::{DType, TensorDesc};
use clforge::error::{EngineError, EngineResult};
use clforge::geometry::{lite_geometry, WorkGeometry};
use clforge::key::ConfigKey;
use clforge::params::{lite_params, strided_params};
use clforge::shape::{is_fast_path_eligible, normalize_nchw, NchwLayout};

use crate::args::OperatorArgs;
use crate::dispatch::launch_stage;
use crate::queue::{DeviceQueue, KernelArg};
use crate::registry::{KernelHandle, KernelPlan, KernelRegistry};

pub const FORWARD_OPERATION: &str = "activation_forward";
pub const BACKWARD_OPERATION: &str = "activation_backward";
pub const LITE_FORWARD_KERNEL: &str = "activ_fwd_lite";
pub const LITE_BACKWARD_KERNEL: &str = "activ_bwd_lite";

/// Elementwise transform selected by the operation-mode kernel parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationMode {
    PassThru,
    Logistic,
    Tanh,
    Relu,
    SoftRelu,
    Abs,
    Power,
    ClippedRelu,
    LeakyRelu,
    Elu,
}

impl ActivationMode {
    /// Numeric selector baked into the kernel as a compile-time parameter.
    pub fn id(self) -> u32 {
        match self {
            ActivationMode::PassThru => 0,
            ActivationMode::Logistic => 1,
            ActivationMode::Tanh => 2,
            ActivationMode::Relu => 3,
            ActivationMode::SoftRelu => 4,
            ActivationMode::Abs => 5,
            ActivationMode::Power => 6,
            ActivationMode::ClippedRelu => 7,
            ActivationMode::LeakyRelu => 8,
            ActivationMode::Elu => 9,
        }
    }
}

/// Per-mode activation coefficients, bound as kernel scalar arguments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationCoefficients {
    pub alpha: f32,
    pub beta: f32,
    pub power: f32,
}

impl ActivationCoefficients {
    /// Gradient pre-scale passed to the backward kernel.
    pub fn diff_scale(&self) -> f32 {
        self.beta * self.power
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// One bound tensor operand: metadata, device buffer, element offset.
pub struct TensorArg<'a, B> {
    pub desc: &'a TensorDesc,
    pub buffer: &'a B,
    pub offset: u64,
}

/// A fully constructed strided kernel from the source-producing
/// collaborator: source text, entry point, base compile options, and the
/// launch geometry it chose. The engine appends the per-tensor
/// specialization parameters and passes the geometry through unmodified.
pub struct ConstructedKernel {
    pub program_source: String,
    pub kernel_name: String,
    pub compile_options: String,
    pub geometry: WorkGeometry,
}

/// Problem description handed to the strided kernel constructor.
pub struct StridedKernelRequest<'a> {
    pub direction: Direction,
    pub mode: ActivationMode,
    pub dtype: DType,
    pub coefficients: ActivationCoefficients,
    pub input: &'a NchwLayout,
    pub output: &'a NchwLayout,
    pub input_grad: Option<&'a NchwLayout>,
    pub output_grad: Option<&'a NchwLayout>,
}

/// Source-producing collaborator for the activation kernels.
pub trait NeuronSourceProvider: Send + Sync {
    /// Program text of the fused single-pass kernels
    /// (`activ_fwd_lite` / `activ_bwd_lite` entry points).
    fn lite_program(&self) -> &str;

    /// Constructs the general strided kernel for the given problem.
    fn construct_strided(&self, request: &StridedKernelRequest<'_>)
        -> EngineResult<ConstructedKernel>;
}

pub struct ActivationEngine<Q: DeviceQueue, P: NeuronSourceProvider> {
    queue: Arc<Q>,
    provider: P,
    registry: KernelRegistry<Q>,
}

impl<Q: DeviceQueue, P: NeuronSourceProvider> ActivationEngine<Q, P> {
    pub fn new(queue: Arc<Q>, provider: P) -> Self {
        Self {
            queue,
            provider,
            registry: KernelRegistry::new(),
        }
    }

    pub fn registry(&self) -> &KernelRegistry<Q> {
        &self.registry
    }

    /// `y = activ(x)`. Host scaling other than alpha=1, beta=0 is rejected
    /// before any device work.
    pub fn forward(
        &self,
        host_alpha: f32,
        host_beta: f32,
        mode: ActivationMode,
        coefficients: ActivationCoefficients,
        x: &TensorArg<'_, Q::Buffer>,
        y: &TensorArg<'_, Q::Buffer>,
    ) -> EngineResult<()> {
        ensure_fused_host_scaling(host_alpha, host_beta)?;
        let dtype = x.desc.dtype();

        if is_fast_path_eligible(x.desc, y.desc) {
            let count = x.desc.element_count();
            let key = lite_key(mode, dtype, count);
            let plan = self.registry.get_or_build(FORWARD_OPERATION, &key, || {
                self.build_lite(LITE_FORWARD_KERNEL, count, mode, dtype)
            })?;

            let mut args = OperatorArgs::new();
            args.push("x", KernelArg::Buffer(x.buffer.clone()))
                .push("y", KernelArg::Buffer(y.buffer.clone()))
                .push("power", KernelArg::F32(coefficients.power))
                .push("beta", KernelArg::F32(coefficients.beta))
                .push("alpha", KernelArg::F32(coefficients.alpha));
            self.launch_single(&plan, &args)
        } else {
            let input = normalize_nchw(x.desc)?;
            let output = normalize_nchw(y.desc)?;
            let key = ConfigKey::builder("strided")
                .field("mode", mode.id())
                .field("dtype", dtype.tag())
                .layout("in", &input)
                .layout("out", &output)
                .finish();
            let plan = self.registry.get_or_build(FORWARD_OPERATION, &key, || {
                let request = StridedKernelRequest {
                    direction: Direction::Forward,
                    mode,
                    dtype,
                    coefficients,
                    input: &input,
                    output: &output,
                    input_grad: None,
                    output_grad: None,
                };
                self.build_strided(&request, strided_params(&input, &output, None, None))
            })?;

            let mut args = OperatorArgs::new();
            args.push("x", KernelArg::Buffer(x.buffer.clone()))
                .push("y", KernelArg::Buffer(y.buffer.clone()))
                .push("power", KernelArg::F32(coefficients.power))
                .push("beta", KernelArg::F32(coefficients.beta))
                .push("alpha", KernelArg::F32(coefficients.alpha))
                .push("x_offset", offset_arg(x.offset)?)
                .push("y_offset", offset_arg(y.offset)?);
            self.launch_single(&plan, &args)
        }
    }

    /// `dx = dactiv(x, y, dy)`. Fast-path eligibility is judged on the
    /// forward tensors; the gradient tensors ride along with the same
    /// flat layout when it applies.
    pub fn backward(
        &self,
        host_alpha: f32,
        host_beta: f32,
        mode: ActivationMode,
        coefficients: ActivationCoefficients,
        x: &TensorArg<'_, Q::Buffer>,
        y: &TensorArg<'_, Q::Buffer>,
        dx: &TensorArg<'_, Q::Buffer>,
        dy: &TensorArg<'_, Q::Buffer>,
    ) -> EngineResult<()> {
        ensure_fused_host_scaling(host_alpha, host_beta)?;
        let dtype = x.desc.dtype();

        if is_fast_path_eligible(x.desc, y.desc) {
            let count = x.desc.element_count();
            let key = lite_key(mode, dtype, count);
            let plan = self.registry.get_or_build(BACKWARD_OPERATION, &key, || {
                self.build_lite(LITE_BACKWARD_KERNEL, count, mode, dtype)
            })?;

            let mut args = OperatorArgs::new();
            args.push("dx", KernelArg::Buffer(dx.buffer.clone()))
                .push("dy", KernelArg::Buffer(dy.buffer.clone()))
                .push("x", KernelArg::Buffer(x.buffer.clone()))
                .push("y", KernelArg::Buffer(y.buffer.clone()))
                .push("diff_scale", KernelArg::F32(coefficients.diff_scale()))
                .push("power", KernelArg::F32(coefficients.power))
                .push("beta", KernelArg::F32(coefficients.beta))
                .push("alpha", KernelArg::F32(coefficients.alpha));
            self.launch_single(&plan, &args)
        } else {
            let input = normalize_nchw(x.desc)?;
            let output = normalize_nchw(y.desc)?;
            let input_grad = normalize_nchw(dx.desc)?;
            let output_grad = normalize_nchw(dy.desc)?;
            let key = ConfigKey::builder("strided")
                .field("mode", mode.id())
                .field("dtype", dtype.tag())
                .layout("in", &input)
                .layout("out", &output)
                .layout("din", &input_grad)
                .layout("dout", &output_grad)
                .finish();
            let plan = self.registry.get_or_build(BACKWARD_OPERATION, &key, || {
                let request = StridedKernelRequest {
                    direction: Direction::Backward,
                    mode,
                    dtype,
                    coefficients,
                    input: &input,
                    output: &output,
                    input_grad: Some(&input_grad),
                    output_grad: Some(&output_grad),
                };
                self.build_strided(
                    &request,
                    strided_params(&input, &output, Some(&input_grad), Some(&output_grad)),
                )
            })?;

            let mut args = OperatorArgs::new();
            args.push("dx", KernelArg::Buffer(dx.buffer.clone()))
                .push("dy", KernelArg::Buffer(dy.buffer.clone()))
                .push("x", KernelArg::Buffer(x.buffer.clone()))
                .push("y", KernelArg::Buffer(y.buffer.clone()))
                .push("diff_scale", KernelArg::F32(coefficients.diff_scale()))
                .push("power", KernelArg::F32(coefficients.power))
                .push("beta", KernelArg::F32(coefficients.beta))
                .push("alpha", KernelArg::F32(coefficients.alpha))
                .push("dx_offset", offset_arg(dx.offset)?)
                .push("dy_offset", offset_arg(dy.offset)?)
                .push("x_offset", offset_arg(x.offset)?)
                .push("y_offset", offset_arg(y.offset)?);
            self.launch_single(&plan, &args)
        }
    }

    fn build_lite(
        &self,
        kernel_name: &str,
        element_count: usize,
        mode: ActivationMode,
        dtype: DType,
    ) -> EngineResult<KernelPlan<Q::Kernel>> {
        let lite = lite_params(element_count, mode.id(), dtype);
        let geometry = lite_geometry(element_count, lite.read_unit);
        let kernel = self.queue.build_kernel(
            self.provider.lite_program(),
            kernel_name,
            &lite.params.to_compile_options(),
            &geometry,
        )?;
        Ok(KernelPlan::SingleFused(KernelHandle {
            kernel,
            geometry,
            ordinal: 0,
        }))
    }

    fn build_strided(
        &self,
        request: &StridedKernelRequest<'_>,
        params: clforge::params::SpecializationParams,
    ) -> EngineResult<KernelPlan<Q::Kernel>> {
        let constructed = self.provider.construct_strided(request)?;
        let mut options = constructed.compile_options.clone();
        options.push_str(&params.to_compile_options());
        let kernel = self.queue.build_kernel(
            &constructed.program_source,
            &constructed.kernel_name,
            &options,
            &constructed.geometry,
        )?;
        Ok(KernelPlan::SingleFused(KernelHandle {
            kernel,
            geometry: constructed.geometry,
            ordinal: 0,
        }))
    }

    fn launch_single(
        &self,
        plan: &KernelPlan<Q::Kernel>,
        args: &OperatorArgs<Q::Buffer>,
    ) -> EngineResult<()> {
        match plan {
            KernelPlan::SingleFused(handle) => launch_stage(self.queue.as_ref(), handle, args),
            KernelPlan::ScaleThenAccumulate { .. } => Err(EngineError::execution(
                "activation plans are always single-kernel",
            )),
        }
    }
}

fn lite_key(mode: ActivationMode, dtype: DType, element_count: usize) -> ConfigKey {
    ConfigKey::builder("lite")
        .field("mode", mode.id())
        .field("dtype", dtype.tag())
        .field("elems", element_count)
        .finish()
}

fn ensure_fused_host_scaling(alpha: f32, beta: f32) -> EngineResult<()> {
    if alpha == 1.0 && beta == 0.0 {
        Ok(())
    } else {
        Err(EngineError::UnsupportedCoefficients { alpha, beta })
    }
}

fn offset_arg<B>(offset: u64) -> EngineResult<KernelArg<B>> {
    let offset = i64::try_from(offset)
        .map_err(|_| EngineError::execution("buffer offset exceeds i64 range"))?;
    Ok(KernelArg::OffsetI64(offset))
}
