pub mod calendar;
pub mod etl;
pub mod format;
pub mod projector;

pub use crate::domain::model::{DisplayRow, ProjectionResult, SourceRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
