use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Element datatype of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    F32,
    F16,
}

impl DType {
    /// Short tag used in config keys.
    pub fn tag(self) -> &'static str {
        match self {
            DType::F32 => "fp32",
            DType::F16 => "fp16",
        }
    }
}

/// Read-only shape/stride/dtype metadata for one tensor operand.
///
/// Descriptors arrive from the tensor-descriptor collaborator already
/// validated; the constructor re-checks only the structural invariants this
/// crate relies on (matching extent/stride lengths, positive extents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorDesc {
    dims: Vec<usize>,
    strides: Vec<usize>,
    dtype: DType,
}

impl TensorDesc {
    pub fn new(dims: Vec<usize>, strides: Vec<usize>, dtype: DType) -> EngineResult<Self> {
        if dims.len() != strides.len() {
            return Err(EngineError::shape(format!(
                "extent/stride length mismatch: {} extents, {} strides",
                dims.len(),
                strides.len()
            )));
        }
        if dims.iter().any(|&d| d == 0) {
            return Err(EngineError::shape("tensor extents must be positive"));
        }
        Ok(Self {
            dims,
            strides,
            dtype,
        })
    }

    /// Descriptor with fully packed row-major strides.
    pub fn packed(dims: Vec<usize>, dtype: DType) -> EngineResult<Self> {
        let mut strides = vec![1usize; dims.len()];
        for i in (0..dims.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * dims[i + 1];
        }
        Self::new(dims, strides, dtype)
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Addressable element span: one past the largest reachable linear index.
    pub fn element_span(&self) -> usize {
        self.dims
            .iter()
            .zip(&self.strides)
            .map(|(&d, &s)| (d - 1) * s)
            .sum::<usize>()
            + 1
    }
}
