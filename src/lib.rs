pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::ProjectionPipeline;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{etl::EtlEngine, projector::RowProjector};
pub use domain::model::{DisplayRow, SourceRecord};
pub use utils::error::{EtlError, Result};
