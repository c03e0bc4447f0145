#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use clforge::error::{EngineError, EngineResult};
use clforge::geometry::WorkGeometry;
use clforge_ocl::queue::{DeviceQueue, KernelArg};

#[derive(Debug, Clone, PartialEq)]
pub struct BuildRecord {
    pub kernel_name: String,
    pub compile_options: String,
    pub source: String,
    pub geometry: WorkGeometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRecord {
    pub kernel_name: String,
    pub geometry: WorkGeometry,
    pub args: Vec<KernelArg<u64>>,
}

/// In-memory queue double: records every compile and enqueue, kernels are
/// just their entry-point names, buffers are numeric ids.
#[derive(Default)]
pub struct StubQueue {
    builds: Mutex<Vec<BuildRecord>>,
    launches: Mutex<Vec<LaunchRecord>>,
    fail_builds: AtomicBool,
}

impl StubQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_builds(&self, fail: bool) {
        self.fail_builds.store(fail, Ordering::SeqCst);
    }

    pub fn builds(&self) -> Vec<BuildRecord> {
        self.builds.lock().unwrap().clone()
    }

    pub fn build_count(&self) -> usize {
        self.builds.lock().unwrap().len()
    }

    pub fn launches(&self) -> Vec<LaunchRecord> {
        self.launches.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    pub fn launched_names(&self) -> Vec<String> {
        self.launches
            .lock()
            .unwrap()
            .iter()
            .map(|l| l.kernel_name.clone())
            .collect()
    }
}

impl DeviceQueue for StubQueue {
    type Buffer = u64;
    type Kernel = String;

    fn build_kernel(
        &self,
        program_source: &str,
        kernel_name: &str,
        compile_options: &str,
        geometry: &WorkGeometry,
    ) -> EngineResult<Self::Kernel> {
        if self.fail_builds.load(Ordering::SeqCst) {
            return Err(EngineError::build("stub compile failure"));
        }
        self.builds.lock().unwrap().push(BuildRecord {
            kernel_name: kernel_name.to_string(),
            compile_options: compile_options.to_string(),
            source: program_source.to_string(),
            geometry: *geometry,
        });
        Ok(kernel_name.to_string())
    }

    fn launch(
        &self,
        kernel: &Self::Kernel,
        geometry: &WorkGeometry,
        args: &[KernelArg<Self::Buffer>],
    ) -> EngineResult<()> {
        self.launches.lock().unwrap().push(LaunchRecord {
            kernel_name: kernel.clone(),
            geometry: *geometry,
            args: args.to_vec(),
        });
        Ok(())
    }
}
