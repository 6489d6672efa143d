//! Compute Validation Harness
//!
//! The reference render other conformance tests compare against: one compute
//! dispatch writing the deterministic gradient into a target surface,
//! synchronously, with every transient object released before the call
//! returns.

use crate::env::TestEnvironment;
use crate::errors::Result;
use crate::pattern::{self, GRADIENT_WGSL};
use crate::surface::{SurfaceUsage, TestSurface};

/// Writes the deterministic reference gradient into `surface`.
///
/// Red ramps with x, green with y (each wrapping every 256 pixels), blue is
/// zero, alpha is one. A single dispatch of 16×16 invocation groups covers
/// the whole surface, the submission holds the exclusive queue lock, and the
/// call blocks until the queue drains, so the image is complete when it
/// returns.
///
/// The exclusive borrow of `surface` guarantees no other in-flight
/// submission is using it. Every graphics object created here (shader,
/// binding layout, pipeline layout, pipeline, binding set, command sequence)
/// is released before return, on success and on error alike.
pub fn render_reference_pattern(env: &TestEnvironment, surface: &mut TestSurface) -> Result<()> {
    log::debug!(
        "reference gradient render {}x{}",
        surface.width(),
        surface.height()
    );

    let shader = env.create_shader_module("Gradient Reference Shader", GRADIENT_WGSL)?;

    let binding_layout = env.create_binding_layout(
        "Gradient Binding Layout",
        &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: TestSurface::FORMAT,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        }],
    )?;

    let pipeline_layout =
        env.create_pipeline_layout("Gradient Pipeline Layout", &[binding_layout.raw()])?;

    let pipeline = env.create_compute_pipeline(
        "Gradient Reference Pipeline",
        pipeline_layout.raw(),
        shader.raw(),
        "main",
    )?;

    let binding_set = env.create_binding_set(
        "Gradient Binding Set",
        binding_layout.raw(),
        &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(surface.view()),
        }],
    )?;

    let mut encoder = env.create_encoder("Gradient Reference Encoder");
    // The surface arrives as a texture last read by the vertex and fragment
    // stages; hand it to the compute stage for storage writes.
    surface.transition_to(SurfaceUsage::StorageWrite);
    {
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Gradient Reference Pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&pipeline);
        cpass.set_bind_group(0, binding_set.raw(), &[]);
        let (x, y, z) = pattern::dispatch_grid(surface.width(), surface.height());
        cpass.dispatch_workgroups(x, y, z);
    }
    let commands = env.finish_commands(encoder)?;

    {
        let queue = env.lock_queue();
        queue.submit_and_wait(commands)?;
    }

    // Locals drop in reverse creation order: binding set, pipeline, pipeline
    // layout, binding layout, shader. All of it after the queue drained.
    Ok(())
}
