use serde::{Deserialize, Serialize};

/// Local and global execution-grid sizes for one kernel launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkGeometry {
    pub local: [usize; 3],
    pub global: [usize; 3],
}

impl WorkGeometry {
    pub fn new(local: [usize; 3], global: [usize; 3]) -> Self {
        Self { local, global }
    }

    /// One-dimensional geometry with the trailing dimensions fixed at 1.
    pub fn linear(local_x: usize, global_x: usize) -> Self {
        Self {
            local: [local_x, 1, 1],
            global: [global_x, 1, 1],
        }
    }
}

/// Work-group width of the fused flat kernel.
pub const LITE_LOCAL_SIZE: usize = 256;

/// Launch grid for the fused flat kernel: one work item per read unit along
/// the leading dimension. The read unit is always chosen from the divisors of
/// the element count, so the quotient is exact; the kernel template is still
/// expected to bounds-check its final group.
pub fn lite_geometry(element_count: usize, read_unit: usize) -> WorkGeometry {
    WorkGeometry::linear(LITE_LOCAL_SIZE, element_count.div_ceil(read_unit))
}
