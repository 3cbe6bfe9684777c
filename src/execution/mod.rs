//! Pipeline execution: image locator, stages and the engine

pub mod engine;
pub mod error;
pub mod image;
pub mod research;
pub mod writer;

pub use engine::{DynPipelineEngine, ExecutionEvent, PipelineEngine, PipelineOptions};
pub use error::PipelineError;
pub use image::ImageLocator;
pub use research::ResearchStep;
pub use writer::WriterStep;
