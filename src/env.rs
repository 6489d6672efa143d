//! GPU Test Environment
//!
//! The [`TestEnvironment`] holds the core GPU handles (device, queue) for a
//! conformance run and hands out everything a reference render needs:
//! validation-checked object creation, command-buffer allocation, and the
//! exclusive queue lock submissions must go through.
//!
//! There is deliberately no global state: every harness call receives the
//! environment explicitly, and every object the environment creates is
//! accounted for in [`TransientStats`] so tests can prove nothing leaked.

use std::ops::Deref;

use parking_lot::{Mutex, MutexGuard};

use crate::errors::{HarnessError, Result};
use crate::settings::EnvironmentSettings;
use crate::transient::{
    BindingLayout, BindingSet, CommandSequence, PipelineLayout, PipelineObject, ShaderProgram,
    Transient, TransientKind, TransientStats,
};

/// Shared GPU environment for reference renders.
///
/// Owns the device and queue brought up headlessly from
/// [`EnvironmentSettings`]. The queue is only reachable through
/// [`lock_queue`](Self::lock_queue), which makes the mutual exclusion the
/// submission path depends on impossible to skip.
pub struct TestEnvironment {
    device: wgpu::Device,
    queue: Mutex<wgpu::Queue>,
    adapter_info: wgpu::AdapterInfo,
    transients: TransientStats,
    // Error scopes form a per-device stack shared by all threads; push/pop
    // pairs from concurrent creators must not interleave.
    scope_lock: Mutex<()>,
}

impl TestEnvironment {
    /// Brings up instance, adapter, and device without a window surface.
    ///
    /// Fails with a typed error when the host offers no usable adapter or
    /// the adapter rejects the requested device; callers in CI treat that as
    /// "skip the GPU tests", not as a test failure.
    pub fn new(settings: &EnvironmentSettings) -> Result<Self> {
        let instance = match settings.backends {
            Some(backends) => wgpu::Instance::new(wgpu::InstanceDescriptor {
                backends,
                ..wgpu::InstanceDescriptor::new_without_display_handle()
            }),
            None => wgpu::Instance::default(),
        };

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: settings.power_preference,
            compatible_surface: None,
            force_fallback_adapter: settings.force_fallback_adapter,
        }))
        .map_err(|e| HarnessError::AdapterRequestFailed(e.to_string()))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Reference environment on {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: settings.required_features,
            required_limits: settings.required_limits.clone(),
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        }))?;

        Ok(Self {
            device,
            queue: Mutex::new(queue),
            adapter_info,
            transients: TransientStats::default(),
            scope_lock: Mutex::new(()),
        })
    }

    /// The wgpu device for resource creation.
    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Information about the adapter the environment selected.
    #[inline]
    #[must_use]
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Live/created counters for every transient object kind.
    #[inline]
    #[must_use]
    pub fn transients(&self) -> &TransientStats {
        &self.transients
    }

    /// Compiles a compute shader from WGSL source.
    ///
    /// Compilation runs inside a validation error scope; a diagnostic from
    /// the backend becomes [`HarnessError::ShaderCompileFailed`] instead of
    /// an uncaptured device error.
    pub fn create_shader_module(&self, label: &str, source: &str) -> Result<ShaderProgram> {
        let (module, error) = self.scoped(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });
        match error {
            None => Ok(Transient::new(
                module,
                TransientKind::ShaderProgram,
                &self.transients,
            )),
            Some(e) => Err(HarnessError::ShaderCompileFailed {
                label: label.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Creates a binding layout describing the resource slots of a pass.
    pub fn create_binding_layout(
        &self,
        label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> Result<BindingLayout> {
        let (layout, error) = self.scoped(|device| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries,
            })
        });
        self.creation_result(layout, error, "binding layout", TransientKind::BindingLayout)
    }

    /// Creates a pipeline layout over the given binding layouts.
    pub fn create_pipeline_layout(
        &self,
        label: &str,
        layouts: &[&wgpu::BindGroupLayout],
    ) -> Result<PipelineLayout> {
        let layouts: Vec<Option<&wgpu::BindGroupLayout>> =
            layouts.iter().map(|&layout| Some(layout)).collect();
        let (layout, error) = self.scoped(|device| {
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &layouts,
                immediate_size: 0,
            })
        });
        self.creation_result(
            layout,
            error,
            "pipeline layout",
            TransientKind::PipelineLayout,
        )
    }

    /// Creates a compute pipeline from a compiled shader and layout.
    pub fn create_compute_pipeline(
        &self,
        label: &str,
        layout: &wgpu::PipelineLayout,
        module: &wgpu::ShaderModule,
        entry_point: &str,
    ) -> Result<PipelineObject> {
        let (pipeline, error) = self.scoped(|device| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                module,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            })
        });
        self.creation_result(pipeline, error, "compute pipeline", TransientKind::Pipeline)
    }

    /// Allocates one binding set and points its slots at real resources.
    pub fn create_binding_set(
        &self,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        entries: &[wgpu::BindGroupEntry],
    ) -> Result<BindingSet> {
        let (set, error) = self.scoped(|device| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries,
            })
        });
        self.creation_result(set, error, "binding set", TransientKind::BindingSet)
    }

    /// Allocates a recordable command encoder.
    #[must_use]
    pub fn create_encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    /// Finalizes a recorded encoder into a submittable command sequence.
    pub fn finish_commands(&self, encoder: wgpu::CommandEncoder) -> Result<CommandSequence> {
        let (buffer, error) = self.scoped(|_| encoder.finish());
        match error {
            None => Ok(Transient::new(
                buffer,
                TransientKind::CommandSequence,
                &self.transients,
            )),
            Some(e) => Err(HarnessError::CommandFinalizeFailed(e.to_string())),
        }
    }

    /// Acquires the exclusive queue lock.
    ///
    /// No other submission can interleave on the queue while the returned
    /// guard is alive. Blocks until the current holder releases.
    pub fn lock_queue(&self) -> QueueGuard<'_> {
        QueueGuard {
            device: &self.device,
            queue: self.queue.lock(),
        }
    }

    /// Blocks until all work submitted so far has finished.
    ///
    /// Does not take the queue lock; used to pump buffer-map callbacks after
    /// a submission has already drained.
    pub fn wait_idle(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| HarnessError::QueueDrainFailed(format!("wgpu device poll failed: {e:?}")))?;
        Ok(())
    }

    /// Runs `create` inside a validation error scope and returns whatever
    /// the scope captured alongside the created value.
    fn scoped<T>(&self, create: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<wgpu::Error>) {
        let _serial = self.scope_lock.lock();
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create(&self.device);
        let error = pollster::block_on(scope.pop());
        (value, error)
    }

    fn creation_result<T>(
        &self,
        value: T,
        error: Option<wgpu::Error>,
        phase: &'static str,
        kind: TransientKind,
    ) -> Result<Transient<T>> {
        match error {
            None => Ok(Transient::new(value, kind, &self.transients)),
            Some(e) => Err(HarnessError::ObjectCreationFailed {
                phase,
                message: e.to_string(),
            }),
        }
    }
}

/// Exclusive ownership of the execution queue.
///
/// Holding this guard is the precondition for submitting; dropping it
/// releases the queue. Derefs to [`wgpu::Queue`] for the raw primitives
/// (`write_texture`, plain `submit`).
pub struct QueueGuard<'a> {
    device: &'a wgpu::Device,
    queue: MutexGuard<'a, wgpu::Queue>,
}

impl QueueGuard<'_> {
    /// Submits one command sequence and blocks until it drains.
    ///
    /// The wait is unbounded: this is test tooling, and a hang is more
    /// diagnosable than a silently truncated wait.
    pub fn submit_and_wait(&self, commands: CommandSequence) -> Result<()> {
        let index = self.queue.submit(std::iter::once(commands.into_inner()));
        self.wait(index)
    }

    /// Flushes pending queue writes and blocks until the queue is idle.
    pub fn drain(&self) -> Result<()> {
        let index = self.queue.submit(std::iter::empty::<wgpu::CommandBuffer>());
        self.wait(index)
    }

    fn wait(&self, index: wgpu::SubmissionIndex) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(index),
                timeout: None,
            })
            .map_err(|e| HarnessError::QueueDrainFailed(format!("wgpu device poll failed: {e:?}")))?;
        Ok(())
    }
}

impl Deref for QueueGuard<'_> {
    type Target = wgpu::Queue;
    fn deref(&self) -> &Self::Target {
        &self.queue
    }
}
