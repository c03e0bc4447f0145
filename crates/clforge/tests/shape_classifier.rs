use clforge::desc::{DType, TensorDesc};
use clforge::shape::{is_fast_path_eligible, is_packed, normalize_nchw, NchwLayout};

fn desc(dims: &[usize], strides: &[usize]) -> TensorDesc {
    TensorDesc::new(dims.to_vec(), strides.to_vec(), DType::F32).unwrap()
}

#[test]
fn contiguous_tensor_is_packed() {
    assert!(is_packed(&desc(&[2, 3, 4, 5], &[60, 20, 5, 1])));
}

#[test]
fn padded_leading_stride_is_still_packed() {
    // Only the non-leading strides have to match the flat layout.
    assert!(is_packed(&desc(&[2, 3, 4, 5], &[120, 20, 5, 1])));
}

#[test]
fn padded_inner_stride_is_not_packed() {
    assert!(!is_packed(&desc(&[2, 3, 4, 5], &[72, 24, 6, 1])));
}

#[test]
fn rank_one_is_always_packed() {
    // A rank-1 tensor has no non-leading axes, so any stride passes.
    assert!(is_packed(&desc(&[17], &[1])));
    assert!(is_packed(&desc(&[17], &[3])));
}

#[test]
fn packed_pair_with_equal_counts_is_eligible() {
    let x = TensorDesc::packed(vec![2, 3, 4, 5], DType::F32).unwrap();
    let y = TensorDesc::packed(vec![120], DType::F32).unwrap();
    assert!(is_fast_path_eligible(&x, &y));
}

#[test]
fn strided_rank_two_pair_is_eligible() {
    // Both exactly rank 2 qualifies even when neither side is packed.
    let x = desc(&[8, 8], &[16, 2]);
    let y = desc(&[8, 8], &[16, 2]);
    assert!(!is_packed(&x));
    assert!(is_fast_path_eligible(&x, &y));
}

#[test]
fn mismatched_counts_are_never_eligible() {
    let x = TensorDesc::packed(vec![8, 8], DType::F32).unwrap();
    let y = TensorDesc::packed(vec![8, 9], DType::F32).unwrap();
    assert!(!is_fast_path_eligible(&x, &y));
}

#[test]
fn non_packed_rank_four_falls_back() {
    let x = desc(&[4, 4, 4, 4], &[128, 32, 8, 2]);
    let y = TensorDesc::packed(vec![4, 4, 4, 4], DType::F32).unwrap();
    assert!(!is_fast_path_eligible(&x, &y));
    assert!(!is_fast_path_eligible(&y, &x));
}

#[test]
fn rank_one_normalizes_with_span_padding() {
    let layout = normalize_nchw(&desc(&[10], &[3])).unwrap();
    assert_eq!(
        layout,
        NchwLayout {
            n: 1,
            c: 1,
            h: 1,
            w: 10,
            n_stride: 30,
            c_stride: 30,
            h_stride: 30,
            w_stride: 3,
        }
    );
}

#[test]
fn rank_two_normalizes_into_hw() {
    let layout = normalize_nchw(&desc(&[5, 7], &[7, 1])).unwrap();
    assert_eq!(
        layout,
        NchwLayout {
            n: 1,
            c: 1,
            h: 5,
            w: 7,
            n_stride: 35,
            c_stride: 35,
            h_stride: 7,
            w_stride: 1,
        }
    );
}

#[test]
fn rank_three_normalizes_into_chw() {
    let layout = normalize_nchw(&desc(&[3, 5, 7], &[35, 7, 1])).unwrap();
    assert_eq!(
        layout,
        NchwLayout {
            n: 1,
            c: 3,
            h: 5,
            w: 7,
            n_stride: 105,
            c_stride: 35,
            h_stride: 7,
            w_stride: 1,
        }
    );
}

#[test]
fn rank_four_passes_through_unchanged() {
    let layout = normalize_nchw(&desc(&[2, 3, 4, 5], &[120, 20, 5, 1])).unwrap();
    assert_eq!(layout.n, 2);
    assert_eq!(layout.n_stride, 120);
    assert_eq!(layout.w_stride, 1);
}

#[test]
fn unsupported_rank_is_an_error() {
    let five = desc(&[2, 2, 2, 2, 2], &[16, 8, 4, 2, 1]);
    assert!(normalize_nchw(&five).is_err());
}

#[test]
fn zero_extents_are_rejected_at_construction() {
    assert!(TensorDesc::new(vec![0, 4], vec![4, 1], DType::F32).is_err());
    assert!(TensorDesc::new(vec![4, 4], vec![4], DType::F32).is_err());
}
