pub mod controller;
pub mod sample;
pub mod state;

pub use controller::{ControllerError, PipelineController, CANCELLED_MESSAGE};
pub use sample::{extract_sample, extract_sample_with_origin, SampleOrigin};
pub use state::{PipelineSnapshot, PipelineState};
