use clforge::normalize::normalize_offset_width;

const GENERATED_HEADER: &str = "__kernel void miog_betac_alphaab(\n\
    __global float* a, const size_t a_offset,\n\
    __global const float* b, const ulong b_offset,\n\
    __global float* c, const size_t c_offset,\n\
    const float alpha, const float beta)";

#[test]
fn rewrites_every_offset_role_and_both_wide_types() {
    let rewritten = normalize_offset_width(GENERATED_HEADER);
    assert!(rewritten.contains("const unsigned a_offset"));
    assert!(rewritten.contains("const unsigned b_offset"));
    assert!(rewritten.contains("const unsigned c_offset"));
    assert!(!rewritten.contains("size_t a_offset"));
    assert!(!rewritten.contains("ulong b_offset"));
}

#[test]
fn rewrite_is_idempotent() {
    let once = normalize_offset_width(GENERATED_HEADER);
    let twice = normalize_offset_width(&once);
    assert_eq!(once, twice);
}

#[test]
fn already_narrow_declarations_pass_through() {
    let source = "__kernel void k(__global float* c, const unsigned c_offset)";
    assert_eq!(normalize_offset_width(source), source);
}

#[test]
fn unrelated_identifiers_are_untouched() {
    let source = "const size_t a_offset_bytes = 0; const size_t stride;";
    // `a_offset_bytes` is a different identifier; the word boundary in the
    // pattern must not match inside it.
    assert_eq!(normalize_offset_width(source), source);
}

#[test]
fn flexible_whitespace_between_type_and_name() {
    let source = "const size_t   b_offset";
    assert_eq!(normalize_offset_width(source), "const unsigned b_offset");
}
