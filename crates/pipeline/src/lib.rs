//! Question answering over a single document: load, chunk, embed, index,
//! then answer questions from the nearest chunks.

pub mod boundary;
pub mod error;
pub mod pipeline;

pub use boundary::{handle_ask, handle_status, BoundaryResponse};
pub use error::PipelineError;
pub use pipeline::{reload, shared, AskResponse, Pipeline, PipelineStatus, SharedPipeline};
