pub mod projection_pipeline;

pub use projection_pipeline::{decode_source_document, ProjectionPipeline};
