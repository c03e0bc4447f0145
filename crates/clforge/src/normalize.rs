//! Post-generation source rewrite masking integer-width drift in generated
//! GEMM kernel source.
//!
//! Depending on its version, the external kernel-source generator declares
//! the buffer-offset parameters as either `size_t` or `ulong`; dispatch code
//! marshals those arguments as 32-bit values. Rewriting the declarations to
//! `unsigned` removes the variability at the text level. The affected
//! parameter names and widths are an explicit table rather than constants
//! buried in the patterns.

use once_cell::sync::Lazy;
use regex::Regex;

/// One offset-parameter declaration rewrite.
pub struct OffsetWidthRule {
    /// Parameter name as it appears in the generated kernel signature.
    pub parameter: &'static str,
    /// 64-bit integer type spellings the generator may emit.
    pub from_types: &'static [&'static str],
    /// Fixed-width replacement type.
    pub to_type: &'static str,
}

const WIDE_INT_TYPES: &[&str] = &["size_t", "ulong"];

/// Rewrites for the three canonical buffer roles of the GEMM kernels.
pub const OFFSET_WIDTH_RULES: &[OffsetWidthRule] = &[
    OffsetWidthRule {
        parameter: "a_offset",
        from_types: WIDE_INT_TYPES,
        to_type: "unsigned",
    },
    OffsetWidthRule {
        parameter: "b_offset",
        from_types: WIDE_INT_TYPES,
        to_type: "unsigned",
    },
    OffsetWidthRule {
        parameter: "c_offset",
        from_types: WIDE_INT_TYPES,
        to_type: "unsigned",
    },
];

static DECL_PATTERNS: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    OFFSET_WIDTH_RULES
        .iter()
        .flat_map(|rule| {
            rule.from_types.iter().map(|from| {
                let pattern = format!(r"\bconst\s+{from}\s+{param}\b", param = rule.parameter);
                let replacement = format!("const {} {}", rule.to_type, rule.parameter);
                (
                    Regex::new(&pattern).expect("offset declaration pattern is valid"),
                    replacement,
                )
            })
        })
        .collect()
});

/// Rewrites every 64-bit offset-parameter declaration in `source` to the
/// fixed 32-bit form. Purely textual; the source is never parsed. Applying
/// the transform twice yields the same text as applying it once.
pub fn normalize_offset_width(source: &str) -> String {
    let mut out = source.to_string();
    for (pattern, replacement) in DECL_PATTERNS.iter() {
        out = pattern.replace_all(&out, replacement.as_str()).into_owned();
    }
    out
}
