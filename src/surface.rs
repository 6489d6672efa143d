//! Target Surface
//!
//! [`TestSurface`] is the presentable-image stand-in reference renders write
//! into. Conformance runs swap the real swap chain for an offscreen target
//! precisely so the result can be copied back and compared; this type owns
//! that target, its image view, and the usage bookkeeping that takes the
//! place of explicit layout transitions.

use crate::env::TestEnvironment;
use crate::errors::{HarnessError, Result};

/// How the surface was last consumed by shader stages.
///
/// wgpu derives the matching barriers from declared usage at submission, so
/// unlike a raw layout transition this is pure bookkeeping; it keeps the
/// handoff between passes explicit and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceUsage {
    /// Sampled as a texture by the vertex and fragment stages.
    ShaderRead,
    /// Written as a storage image by the compute stage.
    StorageWrite,
}

/// Offscreen color target with a fixed `Rgba8Unorm` format.
pub struct TestSurface {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    last_usage: SurfaceUsage,
}

impl TestSurface {
    /// Color format of every test surface.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Creates a `width` × `height` surface on the environment's device.
    ///
    /// A fresh surface reports [`SurfaceUsage::ShaderRead`]: the reference
    /// flow models taking over an image that was last consumed as a texture.
    pub fn new(env: &TestEnvironment, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HarnessError::InvalidSurfaceSize { width, height });
        }
        let texture = env.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Reference Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            width,
            height,
            last_usage: SurfaceUsage::ShaderRead,
        })
    }

    /// Surface width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Color format, always [`Self::FORMAT`].
    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        Self::FORMAT
    }

    /// Full-surface copy extent.
    #[must_use]
    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// The backing texture.
    #[inline]
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// The image view passes bind.
    #[inline]
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// How the surface was last consumed.
    #[inline]
    #[must_use]
    pub fn last_usage(&self) -> SurfaceUsage {
        self.last_usage
    }

    /// Records a usage handoff and returns the previous usage.
    pub fn transition_to(&mut self, next: SurfaceUsage) -> SurfaceUsage {
        let prior = std::mem::replace(&mut self.last_usage, next);
        log::debug!("surface usage transition {prior:?} -> {next:?}");
        prior
    }

    /// Uploads a solid color into every pixel.
    ///
    /// Copies are not shader-stage consumers, so the tracked usage is left
    /// untouched.
    pub fn fill(&self, env: &TestEnvironment, pixel: [u8; 4]) -> Result<()> {
        let data = pixel.repeat(self.width as usize * self.height as usize);
        let queue = env.lock_queue();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            self.extent(),
        );
        queue.drain()
    }

    /// Copies the surface back to the host as tightly packed row-major RGBA8.
    ///
    /// Rows travel through a staging buffer padded to
    /// `COPY_BYTES_PER_ROW_ALIGNMENT` and are repacked before returning.
    pub fn read_rgba8(&self, env: &TestEnvironment) -> Result<Vec<u8>> {
        let unpadded_bytes_per_row = self.width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;
        let buffer_size = u64::from(padded_bytes_per_row) * u64::from(self.height);

        let staging = env.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("Reference Readback Staging"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = env.create_encoder("Reference Readback Encoder");
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            self.extent(),
        );
        let commands = env.finish_commands(encoder)?;

        {
            let queue = env.lock_queue();
            queue.submit_and_wait(commands)?;
        }

        let slice = staging.slice(..);
        let (tx, rx) = flume::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        env.wait_idle()?;
        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(HarnessError::ReadbackFailed(e.to_string())),
            Err(_) => {
                return Err(HarnessError::ReadbackFailed(
                    "map callback dropped".to_string(),
                ));
            }
        }

        let mapped = slice.get_mapped_range();
        let mut out = Vec::with_capacity((unpadded_bytes_per_row * self.height) as usize);
        for row in 0..self.height as usize {
            let start = row * padded_bytes_per_row as usize;
            out.extend_from_slice(&mapped[start..start + unpadded_bytes_per_row as usize]);
        }
        drop(mapped);
        staging.unmap();

        Ok(out)
    }
}
