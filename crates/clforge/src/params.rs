//! Specialization parameter generation.
//!
//! Maps tensor geometry into the flat named parameter surface the generic
//! kernel templates declare. No numeric computation happens here; the
//! parameters only reshape metadata into `-DNAME=value` compile options.

use std::fmt;

use crate::desc::DType;
use crate::shape::NchwLayout;

/// One compile-time parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Flag(bool),
    Ident(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Flag(v) => write!(f, "{}", u8::from(*v)),
            ParamValue::Ident(v) => f.write_str(v),
        }
    }
}

/// Ordered set of named compile-time parameters, immutable once handed to a
/// kernel build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecializationParams {
    entries: Vec<(String, ParamValue)>,
}

impl SpecializationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_int(&mut self, name: &str, value: i64) {
        self.entries.push((name.to_string(), ParamValue::Int(value)));
    }

    pub fn push_flag(&mut self, name: &str, value: bool) {
        self.entries
            .push((name.to_string(), ParamValue::Flag(value)));
    }

    pub fn push_ident(&mut self, name: &str, value: impl Into<String>) {
        self.entries
            .push((name.to_string(), ParamValue::Ident(value.into())));
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Renders `" -DNAME=value"` for every parameter, in insertion order.
    pub fn to_compile_options(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.entries {
            out.push_str(" -D");
            out.push_str(name);
            out.push('=');
            out.push_str(&value.to_string());
        }
        out
    }
}

/// Vectorized read width for the fused flat kernel: the widest of 4/2/1 that
/// divides the element count. Wider reads cut instruction count at the cost
/// of one kernel variant per width.
pub fn read_unit_for(element_count: usize) -> usize {
    if element_count % 4 == 0 {
        4
    } else if element_count % 2 == 0 {
        2
    } else {
        1
    }
}

/// Vector element type identifier matching the chosen read width.
pub fn read_type_for(read_unit: usize) -> String {
    if read_unit == 1 {
        "_FLOAT".to_string()
    } else {
        format!("_FLOAT{read_unit}")
    }
}

/// Parameters for the fused single-pass kernel plus the derived read-unit
/// count that sizes the launch grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteParams {
    pub read_unit: usize,
    pub read_units_total: usize,
    pub params: SpecializationParams,
}

/// Fast-path specialization: read width, vector type, operation selector,
/// and precision flags.
pub fn lite_params(element_count: usize, op_id: u32, dtype: DType) -> LiteParams {
    let read_unit = read_unit_for(element_count);
    let read_units_total = element_count / read_unit;

    let mut params = SpecializationParams::new();
    params.push_flag("LITE", true);
    params.push_int("READ_UNIT", read_unit as i64);
    params.push_ident("READ_TYPE", read_type_for(read_unit));
    params.push_int("NRN_OP_ID", i64::from(op_id));
    params.push_flag("USE_FP16", dtype == DType::F16);
    params.push_flag("USE_FP32", dtype == DType::F32);

    LiteParams {
        read_unit,
        read_units_total,
        params,
    }
}

/// General-path specialization: NCHW extents, strides, and block size for
/// each of the four logical tensors. Absent gradient tensors default to the
/// unit layout so the template's parameter surface is always fully bound.
pub fn strided_params(
    input: &NchwLayout,
    output: &NchwLayout,
    input_grad: Option<&NchwLayout>,
    output_grad: Option<&NchwLayout>,
) -> SpecializationParams {
    let unit = NchwLayout::unit();
    let din = input_grad.unwrap_or(&unit);
    let dout = output_grad.unwrap_or(&unit);

    let mut params = SpecializationParams::new();
    push_layout(&mut params, "IN", input);
    push_layout(&mut params, "OUT", output);
    push_layout(&mut params, "DIN", din);
    push_layout(&mut params, "DOUT", dout);
    params.push_int("IN_BLOCK_SZ", input.block_size() as i64);
    params.push_int("OUT_BLOCK_SZ", output.block_size() as i64);
    params.push_int("DIN_BLOCK_SZ", din.block_size() as i64);
    params.push_int("DOUT_BLOCK_SZ", dout.block_size() as i64);
    params
}

fn push_layout(params: &mut SpecializationParams, tensor: &str, layout: &NchwLayout) {
    params.push_int(&format!("N_{tensor}"), layout.n as i64);
    params.push_int(&format!("C_{tensor}"), layout.c as i64);
    params.push_int(&format!("H_{tensor}"), layout.h as i64);
    params.push_int(&format!("W_{tensor}"), layout.w as i64);
    params.push_int(&format!("N_{tensor}_STRIDE"), layout.n_stride as i64);
    params.push_int(&format!("C_{tensor}_STRIDE"), layout.c_stride as i64);
    params.push_int(&format!("H_{tensor}_STRIDE"), layout.h_stride as i64);
    params.push_int(&format!("W_{tensor}_STRIDE"), layout.w_stride as i64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_unit_prefers_widest_divisor() {
        assert_eq!(read_unit_for(1024), 4);
        assert_eq!(read_unit_for(6), 2);
        assert_eq!(read_unit_for(17), 1);
    }

    #[test]
    fn compile_options_preserve_insertion_order() {
        let mut params = SpecializationParams::new();
        params.push_int("A", 2);
        params.push_flag("B", true);
        params.push_ident("C", "_FLOAT4");
        assert_eq!(params.to_compile_options(), " -DA=2 -DB=1 -DC=_FLOAT4");
    }
}
