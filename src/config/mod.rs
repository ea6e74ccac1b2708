pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::cli_args::CliConfig;

/// Default export file name for a format (`csv`, `tsv`, `json`, `zip`).
pub fn default_output_filename(format: &str) -> String {
    format!("workforce_rows.{}", format)
}

#[cfg(feature = "cli")]
mod cli_args {
    use crate::core::projector::{MonthStrategy, NetEarningsStrategy, ProjectionOptions};
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use chrono::NaiveDate;
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "workforce-rows")]
    #[command(about = "Flatten worker utilisation and earnings data into table rows")]
    pub struct CliConfig {
        /// Source JSON document
        #[arg(short, long, default_value = "source-data.json")]
        pub input: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        /// Export formats: csv, tsv, json
        #[arg(long, value_delimiter = ',', default_value = "csv")]
        pub formats: Vec<String>,

        /// Bundle the exports into a single ZIP archive
        #[arg(long)]
        pub zip: bool,

        /// Reference date (YYYY-MM-DD) used instead of today
        #[arg(long)]
        pub as_of: Option<String>,

        #[arg(long, value_enum)]
        pub month_strategy: Option<MonthStrategy>,

        #[arg(long, value_enum)]
        pub net_earnings: Option<NetEarningsStrategy>,

        /// Keep records without a worker as NaN rows
        #[arg(long)]
        pub keep_unresolved: bool,

        /// TOML configuration file; other flags override its values
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,
    }

    impl CliConfig {
        pub fn reference_date(&self) -> Option<NaiveDate> {
            self.as_of
                .as_deref()
                .and_then(|raw| validation::validate_date("as_of", raw).ok())
        }
    }

    impl ConfigProvider for CliConfig {
        fn input_path(&self) -> &str {
            &self.input
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn compression_enabled(&self) -> bool {
            self.zip
        }

        fn output_filename(&self, format: &str) -> String {
            super::default_output_filename(format)
        }

        fn projection_options(&self) -> ProjectionOptions {
            ProjectionOptions {
                month_strategy: self.month_strategy.unwrap_or_default(),
                net_earnings: self.net_earnings.unwrap_or_default(),
                keep_unresolved: self.keep_unresolved,
                reference_date: self.reference_date(),
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_non_empty_string("input", &self.input)?;
            validation::validate_path("input", &self.input)?;
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_output_formats("formats", &self.formats)?;
            if let Some(raw) = &self.as_of {
                validation::validate_date("as_of", raw)?;
            }
            Ok(())
        }
    }

}
