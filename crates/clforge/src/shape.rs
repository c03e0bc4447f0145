//! Shape-only predicates deciding between the fused flat-iteration kernel
//! variant and the general strided variant, plus rank normalization to the
//! canonical NCHW layout the strided kernel template is specialized against.

use crate::desc::TensorDesc;
use crate::error::{EngineError, EngineResult};

/// True when every non-leading axis stride equals the product of the more
/// minor extents, i.e. the tensor can be reinterpreted as a flat array.
///
/// The leading axis stride is deliberately not checked: a batch axis with a
/// padded stride still iterates flat within each batch, which is what the
/// fused kernel assumes.
pub fn is_packed(desc: &TensorDesc) -> bool {
    let dims = desc.dims();
    let strides = desc.strides();
    let mut acc = 1usize;
    for i in (1..dims.len()).rev() {
        if strides[i] != acc {
            return false;
        }
        acc *= dims[i];
    }
    true
}

/// Shape-only test for the fused single-pass kernel: equal element counts and
/// either both tensors packed or both exactly two-dimensional. No data is
/// inspected; any layout that cannot be iterated flat falls back to the
/// general strided path.
pub fn is_fast_path_eligible(input: &TensorDesc, output: &TensorDesc) -> bool {
    if input.element_count() != output.element_count() {
        return false;
    }
    let both_2d = input.rank() == 2 && output.rank() == 2;
    (is_packed(input) && is_packed(output)) || both_2d
}

/// Canonical 4-axis (N, C, H, W) extents and strides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NchwLayout {
    pub n: usize,
    pub c: usize,
    pub h: usize,
    pub w: usize,
    pub n_stride: usize,
    pub c_stride: usize,
    pub h_stride: usize,
    pub w_stride: usize,
}

impl NchwLayout {
    /// Degenerate layout standing in for an absent tensor: unit extents and
    /// unit strides everywhere.
    pub fn unit() -> Self {
        Self {
            n: 1,
            c: 1,
            h: 1,
            w: 1,
            n_stride: 1,
            c_stride: 1,
            h_stride: 1,
            w_stride: 1,
        }
    }

    /// Elements per batch entry: product of the non-batch extents.
    pub fn block_size(&self) -> usize {
        self.c * self.h * self.w
    }
}

/// Normalizes a rank 1-4 descriptor to NCHW, left-padding absent axes with
/// extent 1 and a stride equal to the span of the more-minor axes. The padded
/// strides are degenerate but keep the linear-index arithmetic of the strided
/// kernel template consistent for any rank.
pub fn normalize_nchw(desc: &TensorDesc) -> EngineResult<NchwLayout> {
    let dims = desc.dims();
    let strides = desc.strides();
    match dims.len() {
        1 => {
            let (w, w_stride) = (dims[0], strides[0]);
            let padded = w * w_stride;
            Ok(NchwLayout {
                n: 1,
                c: 1,
                h: 1,
                w,
                n_stride: padded,
                c_stride: padded,
                h_stride: padded,
                w_stride,
            })
        }
        2 => {
            let (h, w) = (dims[0], dims[1]);
            let (h_stride, w_stride) = (strides[0], strides[1]);
            let padded = h * h_stride;
            Ok(NchwLayout {
                n: 1,
                c: 1,
                h,
                w,
                n_stride: padded,
                c_stride: padded,
                h_stride,
                w_stride,
            })
        }
        3 => {
            let (c, h, w) = (dims[0], dims[1], dims[2]);
            let (c_stride, h_stride, w_stride) = (strides[0], strides[1], strides[2]);
            Ok(NchwLayout {
                n: 1,
                c,
                h,
                w,
                n_stride: c * c_stride,
                c_stride,
                h_stride,
                w_stride,
            })
        }
        4 => Ok(NchwLayout {
            n: dims[0],
            c: dims[1],
            h: dims[2],
            w: dims[3],
            n_stride: strides[0],
            c_stride: strides[1],
            h_stride: strides[2],
            w_stride: strides[3],
        }),
        rank => Err(EngineError::shape(format!(
            "tensor rank {rank} is outside the supported range 1..=4"
        ))),
    }
}
