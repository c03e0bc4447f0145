use clforge::error::EngineResult;
use clforge::geometry::WorkGeometry;

/// One positional kernel launch argument.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelArg<B> {
    Buffer(B),
    OffsetU32(u32),
    OffsetI64(i64),
    F32(f32),
}

/// Device command-queue collaborator.
///
/// `build_kernel` compiles a program against the given options and returns a
/// launchable handle; `launch` binds runtime arguments and enqueues
/// execution. Launches are asynchronous: completion is observed only when
/// the owner of the queue synchronizes, and kernels enqueued in program
/// order execute in that order relative to each other on one queue. A single
/// submitting thread per queue is assumed.
pub trait DeviceQueue: Send + Sync {
    type Buffer: Clone + Send + Sync + 'static;
    type Kernel: Clone + Send + Sync + 'static;

    fn build_kernel(
        &self,
        program_source: &str,
        kernel_name: &str,
        compile_options: &str,
        geometry: &WorkGeometry,
    ) -> EngineResult<Self::Kernel>;

    fn launch(
        &self,
        kernel: &Self::Kernel,
        geometry: &WorkGeometry,
        args: &[KernelArg<Self::Buffer>],
    ) -> EngineResult<()>;
}
