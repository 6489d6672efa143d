//! The reference gradient pattern.
//!
//! Holds the fixed shader source, the dispatch geometry, and the CPU-side
//! model that readbacks are compared against. The pattern is a pure function
//! of the pixel coordinate: red and green ramp with x and y (wrapping every
//! 256 pixels), blue is zero, alpha is one.

/// Invocation-group edge length. The dispatch grid divides the surface into
/// `WORKGROUP_SIZE` × `WORKGROUP_SIZE` tiles, rounding up.
pub const WORKGROUP_SIZE: u32 = 16;

/// Per-channel slack when comparing readbacks against [`expected_pixel`].
///
/// 8-bit UNORM backends may round or floor when quantizing k/256; the two
/// differ by at most one step.
pub const COMPARE_TOLERANCE: u8 = 1;

/// The fixed compute shader writing the gradient.
///
/// One write-only storage image at group 0, binding 0. Invocations whose
/// coordinate falls outside the image are no-ops; in-bounds invocations
/// write rgba((x % 256)/256, (y % 256)/256, 0, 1).
pub const GRADIENT_WGSL: &str = r"
@group(0) @binding(0)
var target_image: texture_storage_2d<rgba8unorm, write>;

@compute
@workgroup_size(16, 16, 1)
fn main(@builtin(global_invocation_id) invocation: vec3<u32>) {
    let size = textureDimensions(target_image);
    if invocation.x >= size.x || invocation.y >= size.y {
        return;
    }
    let ramp = vec2<f32>(invocation.xy % vec2<u32>(256u)) / 256.0;
    textureStore(target_image, invocation.xy, vec4<f32>(ramp, 0.0, 1.0));
}
";

/// Grid dimensions covering a `width` × `height` surface:
/// ceil(width/16) × ceil(height/16) × 1.
#[must_use]
pub fn dispatch_grid(width: u32, height: u32) -> (u32, u32, u32) {
    (
        width.div_ceil(WORKGROUP_SIZE),
        height.div_ceil(WORKGROUP_SIZE),
        1,
    )
}

/// The gradient value at `(x, y)` quantized to 8-bit UNORM.
///
/// Mirrors the shader: channels wrap every 256 pixels, blue is zero, alpha
/// is one.
#[must_use]
pub fn expected_pixel(x: u32, y: u32) -> [u8; 4] {
    let quantize = |k: u32| ((k % 256) as f32 / 256.0 * 255.0).round() as u8;
    [quantize(x), quantize(y), 0, 255]
}

/// Tightly packed row-major RGBA8 contents of a `width` × `height` surface
/// after a reference render.
#[must_use]
pub fn expected_image(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            out.extend_from_slice(&expected_pixel(x, y));
        }
    }
    out
}

/// First pixel where a readback diverged from the reference model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelMismatch {
    /// Pixel column
    pub x: u32,
    /// Pixel row
    pub y: u32,
    /// What the model predicts
    pub expected: [u8; 4],
    /// What the readback contained
    pub actual: [u8; 4],
}

/// Scans a tightly packed RGBA8 readback against [`expected_pixel`].
///
/// Returns the first pixel whose per-channel distance from the model exceeds
/// `tolerance`, or `None` when the whole image matches.
///
/// # Panics
///
/// Panics when `actual` is not exactly `width * height` RGBA8 pixels.
#[must_use]
pub fn find_mismatch(
    actual: &[u8],
    width: u32,
    height: u32,
    tolerance: u8,
) -> Option<PixelMismatch> {
    assert_eq!(
        actual.len(),
        width as usize * height as usize * 4,
        "readback length does not match surface dimensions"
    );
    let pixels: &[[u8; 4]] = bytemuck::cast_slice(actual);
    for (index, actual_px) in pixels.iter().enumerate() {
        let x = (index % width as usize) as u32;
        let y = (index / width as usize) as u32;
        let expected_px = expected_pixel(x, y);
        let diverged = actual_px
            .iter()
            .zip(expected_px.iter())
            .any(|(a, e)| a.abs_diff(*e) > tolerance);
        if diverged {
            return Some(PixelMismatch {
                x,
                y,
                expected: expected_px,
                actual: *actual_px,
            });
        }
    }
    None
}
