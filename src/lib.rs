#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod settings;
pub mod transient;
pub mod env;
pub mod surface;
pub mod pattern;
pub mod harness;

pub use env::{QueueGuard, TestEnvironment};
pub use errors::{HarnessError, Result};
pub use harness::render_reference_pattern;
pub use pattern::{
    COMPARE_TOLERANCE, GRADIENT_WGSL, PixelMismatch, WORKGROUP_SIZE, dispatch_grid,
    expected_image, expected_pixel, find_mismatch,
};
pub use settings::EnvironmentSettings;
pub use surface::{SurfaceUsage, TestSurface};
pub use transient::{
    BindingLayout, BindingSet, CommandSequence, PipelineLayout, PipelineObject, ShaderProgram,
    Transient, TransientKind, TransientStats,
};
