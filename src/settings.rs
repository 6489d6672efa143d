//! Environment Settings
//!
//! Configuration consumed once while bringing up a [`TestEnvironment`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use etalon::{EnvironmentSettings, TestEnvironment};
//!
//! // Default: any adapter wgpu picks for the platform
//! let env = TestEnvironment::new(&EnvironmentSettings::default())?;
//!
//! // CI setup pinned to the software rasterizer
//! let ci = EnvironmentSettings {
//!     force_fallback_adapter: true,
//!     ..Default::default()
//! };
//! let env = TestEnvironment::new(&ci)?;
//! ```
//!
//! [`TestEnvironment`]: crate::env::TestEnvironment

// ---------------------------------------------------------------------------
// EnvironmentSettings
// ---------------------------------------------------------------------------

/// Global configuration for environment initialization.
///
/// The defaults are deliberately permissive: any adapter exposing the core
/// WebGPU limits can run the reference dispatch, so conformance runs work on
/// whatever hardware (or software rasterizer) the host provides.
///
/// # Fields
///
/// | Field                    | Description                         | Default           |
/// |--------------------------|-------------------------------------|-------------------|
/// | `backends`               | Forced wgpu backend (or auto)       | `None`            |
/// | `power_preference`       | GPU adapter selection strategy      | `HighPerformance` |
/// | `force_fallback_adapter` | Pin to the software rasterizer      | `false`           |
/// | `required_features`      | Required wgpu features              | Empty             |
/// | `required_limits`        | Required wgpu limits                | Default           |
#[derive(Debug, Clone)]
pub struct EnvironmentSettings {
    // === GPU / Backend Configuration ===
    /// Force a specific wgpu backend (Vulkan, Metal, DX12, …).
    ///
    /// `None` lets wgpu choose the best available backend for the platform
    /// (honoring the `WGPU_BACKEND` environment variable). Override this only
    /// when chasing backend-specific conformance differences.
    pub backends: Option<wgpu::Backends>,

    /// GPU adapter selection preference.
    ///
    /// - `HighPerformance`: Prefer discrete / dedicated GPU
    /// - `LowPower`: Prefer integrated GPU
    pub power_preference: wgpu::PowerPreference,

    /// Restrict adapter selection to the fallback (software) adapter.
    ///
    /// Useful on headless CI runners where results must not depend on which
    /// physical GPU happens to be installed.
    pub force_fallback_adapter: bool,

    // === Device Configuration ===
    /// Required wgpu features that must be supported by the adapter.
    ///
    /// The reference dispatch needs nothing beyond the core feature set, so
    /// this is empty by default.
    pub required_features: wgpu::Features,

    /// Required wgpu limits (max buffer sizes, binding counts, etc.).
    pub required_limits: wgpu::Limits,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            backends: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}
