//! Metadata side of the kernel-specialization engine: tensor descriptors,
//! fast-path classification, config keys, specialization parameters, work
//! geometry, and kernel-source normalization. Everything here is pure logic
//! over shape/stride metadata; no device types appear in this crate.

pub mod desc;
pub mod error;
pub mod geometry;
pub mod key;
pub mod normalize;
pub mod params;
pub mod profiling;
pub mod shape;

pub use desc::{DType, TensorDesc};
pub use error::{EngineError, EngineResult};
pub use geometry::WorkGeometry;
pub use key::ConfigKey;
pub use params::SpecializationParams;
pub use shape::NchwLayout;
