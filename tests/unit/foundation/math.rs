use super::*;

#[test]
fn over_transparent_src_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [0, 0, 0, 0]), dst);
}

#[test]
fn over_opaque_src_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_half_alpha_blends_with_dst() {
    let dst = [0, 0, 200, 255];
    let src = [128, 0, 0, 128];
    let out = over(dst, src);
    assert_eq!(out[0], 128);
    assert_eq!(out[3], 255);
    assert!(out[2] > 90 && out[2] < 110, "blue was {}", out[2]);
}

#[test]
fn premultiply_zero_alpha_clears_color() {
    let mut px = [200, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [0, 0, 0, 0]);
}

#[test]
fn premultiply_matches_rounded_product() {
    let mut px = [100, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(
        px,
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
}

#[test]
fn unpremultiply_recovers_opaque_and_near_values() {
    let mut px = [100, 50, 200, 255, 50, 25, 100, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[100, 50, 200, 255]);
    assert!((i32::from(px[4]) - 100).abs() <= 1);
    assert!((i32::from(px[6]) - 199).abs() <= 1);
}
