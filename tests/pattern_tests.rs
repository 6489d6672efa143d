//! Reference Pattern Model Tests
//!
//! Tests for:
//! - expected_pixel: quantization, 256-pixel wrap, constant blue/alpha
//! - expected_image: length and row-major addressing
//! - dispatch_grid: rounding-up coverage at the 16-wide group size
//! - find_mismatch: hit reporting and per-channel tolerance
//! - GRADIENT_WGSL: the shader literal agrees with the Rust-side constants

use etalon::pattern::{
    COMPARE_TOLERANCE, GRADIENT_WGSL, WORKGROUP_SIZE, dispatch_grid, expected_image,
    expected_pixel, find_mismatch,
};

// ============================================================================
// expected_pixel
// ============================================================================

#[test]
fn expected_pixel_matches_small_surface_probe() {
    // On a 32x32 surface, (5, 10) reads back as rgba(5/256, 10/256, 0, 1).
    assert_eq!(expected_pixel(5, 10), [5, 10, 0, 255]);
}

#[test]
fn expected_pixel_wraps_every_256_pixels() {
    // (300, 10) does not exist on a 32x32 surface; on 512x512 the red
    // channel wraps to 300 mod 256 = 44.
    assert_eq!(expected_pixel(300, 10), [44, 10, 0, 255]);
    assert_eq!(expected_pixel(300, 10), expected_pixel(44, 10));
    assert_eq!(expected_pixel(256, 256), expected_pixel(0, 0));
}

#[test]
fn expected_pixel_blue_and_alpha_are_constant() {
    for &(x, y) in &[(0u32, 0u32), (17, 200), (255, 255), (1000, 4)] {
        let px = expected_pixel(x, y);
        assert_eq!(px[2], 0, "blue stays zero at ({x}, {y})");
        assert_eq!(px[3], 255, "alpha stays one at ({x}, {y})");
    }
}

#[test]
fn quantization_difference_to_floor_stays_within_tolerance() {
    // Backends may floor instead of round when converting k/256 to UNORM8;
    // the comparison tolerance must absorb that for every channel value.
    for k in 0u32..256 {
        let rounded = expected_pixel(k, 0)[0];
        let floored = (k * 255 / 256) as u8;
        assert!(
            rounded.abs_diff(floored) <= COMPARE_TOLERANCE,
            "floor/round disagree by more than the tolerance at k = {k}"
        );
    }
}

// ============================================================================
// expected_image
// ============================================================================

#[test]
fn expected_image_is_row_major_rgba8() {
    let image = expected_image(4, 3);
    assert_eq!(image.len(), 4 * 3 * 4);

    // Pixel (x, y) sits at byte offset (y * width + x) * 4.
    let (x, y, width) = (2usize, 1usize, 4usize);
    let offset = (y * width + x) * 4;
    assert_eq!(image[offset..offset + 4], expected_pixel(2, 1));
}

#[test]
fn expected_image_carries_the_documented_probes() {
    let small = expected_image(32, 32);
    let offset = ((10 * 32) + 5) * 4;
    assert_eq!(small[offset..offset + 4], expected_pixel(5, 10));

    let large = expected_image(512, 512);
    let offset = ((10 * 512) + 300) * 4;
    assert_eq!(large[offset..offset + 4], [44, 10, 0, 255]);
}

// ============================================================================
// dispatch_grid
// ============================================================================

#[test]
fn dispatch_grid_covers_exact_multiples() {
    assert_eq!(dispatch_grid(32, 32), (2, 2, 1));
    assert_eq!(dispatch_grid(512, 512), (32, 32, 1));
}

#[test]
fn dispatch_grid_rounds_up_partial_tiles() {
    assert_eq!(dispatch_grid(33, 16), (3, 1, 1));
    assert_eq!(dispatch_grid(1, 1), (1, 1, 1));
    assert_eq!(dispatch_grid(60, 33), (4, 3, 1));
}

#[test]
fn dispatch_grid_never_undershoots_or_wastes_a_tile() {
    for extent in [1u32, 15, 16, 17, 31, 32, 300, 511, 512, 513] {
        let (groups, _, _) = dispatch_grid(extent, 1);
        assert!(
            groups * WORKGROUP_SIZE >= extent,
            "grid leaves pixels uncovered at extent {extent}"
        );
        assert!(
            (groups - 1) * WORKGROUP_SIZE < extent,
            "grid dispatches a fully out-of-bounds tile at extent {extent}"
        );
    }
}

// ============================================================================
// Shader source consistency
// ============================================================================

#[test]
fn shader_source_agrees_with_model_constants() {
    assert!(
        GRADIENT_WGSL.contains("@workgroup_size(16, 16, 1)"),
        "shader group size drifted from WORKGROUP_SIZE"
    );
    assert!(GRADIENT_WGSL.contains("rgba8unorm"));
    assert!(GRADIENT_WGSL.contains("@group(0) @binding(0)"));
}

// ============================================================================
// find_mismatch
// ============================================================================

#[test]
fn find_mismatch_accepts_the_model_itself() {
    let image = expected_image(48, 20);
    assert_eq!(find_mismatch(&image, 48, 20, 0), None);
}

#[test]
fn find_mismatch_reports_the_first_offending_pixel() {
    let mut image = expected_image(8, 8);
    let offset = ((3 * 8) + 5) * 4;
    image[offset] += 40;

    let hit =
        find_mismatch(&image, 8, 8, COMPARE_TOLERANCE).expect("perturbed pixel must be caught");
    assert_eq!((hit.x, hit.y), (5, 3));
    assert_eq!(hit.expected, expected_pixel(5, 3));
    assert_eq!(hit.actual[0], hit.expected[0] + 40);
}

#[test]
fn find_mismatch_tolerates_single_step_quantization() {
    let mut image = expected_image(8, 8);
    // Nudge one green channel down a step, as a flooring backend would.
    let offset = ((2 * 8) + 7) * 4 + 1;
    image[offset] -= 1;

    assert_eq!(find_mismatch(&image, 8, 8, COMPARE_TOLERANCE), None);
    assert!(
        find_mismatch(&image, 8, 8, 0).is_some(),
        "zero tolerance must flag the nudged channel"
    );
}
