use crate::core::projector::RowProjector;
use crate::core::{ConfigProvider, DisplayRow, Pipeline, ProjectionResult, SourceRecord, Storage};
use crate::domain::model::COLUMNS;
use crate::utils::error::{EtlError, Result};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// 讀取來源 JSON，投影成表格列，再輸出 CSV / TSV / JSON（可選 ZIP）
pub struct ProjectionPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    projector: RowProjector,
}

impl<S: Storage, C: ConfigProvider> ProjectionPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let projector = RowProjector::new(config.projection_options());
        Self {
            storage,
            config,
            projector,
        }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn render(&self, format: &str, rows: &[DisplayRow]) -> Result<Vec<u8>> {
        match format {
            "csv" => render_delimited(rows, b','),
            "tsv" => render_delimited(rows, b'\t'),
            "json" => Ok(serde_json::to_vec_pretty(rows)?),
            other => Err(EtlError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported output format".to_string(),
            }),
        }
    }
}

/// Decodes the source document into records.
///
/// The document is a JSON array, or an object wrapping the array under
/// `data`. Elements that are not objects become empty records, which the
/// projector then drops.
pub fn decode_source_document(bytes: &[u8]) -> Result<Vec<SourceRecord>> {
    let document: Value =
        serde_json::from_slice(bytes).map_err(|e| EtlError::SourceFormatError {
            message: format!("Source is not valid JSON: {}", e),
        })?;

    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(EtlError::SourceFormatError {
                    message: "Expected a top-level array or an object with a 'data' array"
                        .to_string(),
                })
            }
        },
        _ => {
            return Err(EtlError::SourceFormatError {
                message: "Expected a top-level array of records".to_string(),
            })
        }
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(mut obj) => {
                fold_alias(&mut obj, "employees", "employee", index);
                fold_alias(&mut obj, "externals", "external", index);
                serde_json::from_value(Value::Object(obj)).unwrap_or_else(|e| {
                    tracing::warn!(
                        "Record #{} could not be decoded, treating it as empty: {}",
                        index,
                        e
                    );
                    SourceRecord::default()
                })
            }
            _ => {
                tracing::warn!("Record #{} is not an object, treating it as empty", index);
                SourceRecord::default()
            }
        })
        .collect();

    Ok(records)
}

/// 同時出現複數與單數鍵時保留複數鍵
fn fold_alias(obj: &mut Map<String, Value>, key: &str, alias: &str, index: usize) {
    if obj.contains_key(key) && obj.remove(alias).is_some() {
        tracing::warn!(
            "Record #{} has both '{}' and '{}', ignoring '{}'",
            index,
            key,
            alias,
            alias
        );
    }
}

fn render_delimited(rows: &[DisplayRow], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(COLUMNS.iter().map(|column| column.header))?;
    for row in rows {
        writer.write_record(row.cells())?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ProjectionPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<SourceRecord>> {
        let input = self.config.input_path();
        tracing::debug!("Reading source document: {}", input);

        let bytes = self.storage.read_file(input).await?;
        let records = decode_source_document(&bytes)?;

        tracing::info!("📊 Extracted {} records from {}", records.len(), input);
        Ok(records)
    }

    async fn transform(&self, data: Vec<SourceRecord>) -> Result<ProjectionResult> {
        tracing::info!("🔧 Projecting {} records", data.len());
        Ok(self.projector.project_with_stats(&data))
    }

    async fn load(&self, result: ProjectionResult) -> Result<String> {
        let mut artifacts = Vec::new();
        for format in self.config.output_formats() {
            let data = self.render(format, &result.rows)?;
            artifacts.push((self.config.output_filename(format), data));
        }

        if self.config.compression_enabled() {
            let zip_name = self.config.output_filename("zip");
            tracing::debug!("Creating ZIP file with {} files", artifacts.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &artifacts {
                    zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            let zip_path = self.output_file(&zip_name);
            self.storage.write_file(&zip_path, &zip_data).await?;
            tracing::info!("📦 Wrote {} ({} rows)", zip_path, result.rows.len());
            return Ok(zip_path);
        }

        let mut written = Vec::new();
        for (name, data) in &artifacts {
            let path = self.output_file(name);
            self.storage.write_file(&path, data).await?;
            tracing::info!("📄 Wrote {}", path);
            written.push(path);
        }

        written
            .into_iter()
            .next()
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "output_formats".to_string(),
            })
    }
}
