//! Error Types
//!
//! This module defines the error types used throughout the harness.
//!
//! # Overview
//!
//! The main error type [`HarnessError`] covers all failure modes including:
//! - GPU environment bring-up failures
//! - Shader compilation and object-creation failures
//! - Command finalization and queue-drain failures
//! - Readback failures
//!
//! Every failure is a test failure: nothing is retried or recovered locally,
//! the error propagates to the test driver as-is.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, HarnessError>`.
//!
//! ```rust,ignore
//! use etalon::errors::{HarnessError, Result};
//!
//! fn run_reference() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the harness.
///
/// This enum covers all possible error conditions that can occur
/// while generating a reference image. Each variant provides specific
/// context about what went wrong.
#[derive(Error, Debug)]
pub enum HarnessError {
    // ========================================================================
    // Environment Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Shader & Pipeline Errors
    // ========================================================================
    /// The compute shader source did not compile.
    #[error("Shader compilation failed for '{label}': {message}")]
    ShaderCompileFailed {
        /// Debug label of the shader module
        label: String,
        /// Diagnostic message reported by the backend
        message: String,
    },

    /// A graphics object (layout, pipeline, binding set) could not be created.
    #[error("Object creation failed while creating {phase}: {message}")]
    ObjectCreationFailed {
        /// Which creation step failed
        phase: &'static str,
        /// Diagnostic message reported by the backend
        message: String,
    },

    // ========================================================================
    // Submission Errors
    // ========================================================================
    /// Finalizing a recorded command sequence failed validation.
    #[error("Command sequence finalization failed: {0}")]
    CommandFinalizeFailed(String),

    /// Waiting for submitted work to drain from the queue failed.
    #[error("Queue drain failed: {0}")]
    QueueDrainFailed(String),

    // ========================================================================
    // Surface & Readback Errors
    // ========================================================================
    /// Surface dimensions must both be non-zero.
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidSurfaceSize {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// Mapping the readback staging buffer failed.
    #[error("Readback failed: {0}")]
    ReadbackFailed(String),
}

/// Alias for `Result<T, HarnessError>`.
pub type Result<T> = std::result::Result<T, HarnessError>;
