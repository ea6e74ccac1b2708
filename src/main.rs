use clap::Parser;
use workforce_rows::core::ConfigProvider;
use workforce_rows::utils::{logger, validation::Validate};
use workforce_rows::{CliConfig, EtlEngine, EtlError, LocalStorage, ProjectionPipeline, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting workforce-rows");
    tracing::debug!("CLI args: {:?}", args);

    let outcome = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(mut config) => {
                    apply_overrides(&mut config, &args);
                    run(config).await
                }
                Err(e) => Err(e),
            }
        }
        None => run(args.clone()).await,
    };

    match outcome {
        Ok(output_path) => {
            println!("✅ Export completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Export failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}

async fn run<C>(config: C) -> Result<String, EtlError>
where
    C: ConfigProvider + Validate,
{
    // 驗證配置
    config.validate()?;

    let pipeline = ProjectionPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new(pipeline);
    engine.run().await
}

/// 命令列參數覆蓋 TOML 設定（只覆蓋有明確指定的部分）
fn apply_overrides(config: &mut TomlConfig, args: &CliConfig) {
    if let Some(as_of) = &args.as_of {
        config.projection.reference_date = Some(as_of.clone());
        tracing::info!("🔧 Reference date overridden to: {}", as_of);
    }
    if let Some(strategy) = args.month_strategy {
        config.projection.month_strategy = Some(strategy);
        tracing::info!("🔧 Month strategy overridden to: {:?}", strategy);
    }
    if let Some(strategy) = args.net_earnings {
        config.projection.net_earnings = Some(strategy);
        tracing::info!("🔧 Net earnings strategy overridden to: {:?}", strategy);
    }
    if args.keep_unresolved {
        config.projection.keep_unresolved = Some(true);
    }
    if args.zip {
        let compression = config
            .load
            .compression
            .get_or_insert(workforce_rows::config::toml_config::CompressionConfig {
                enabled: true,
                filename: None,
            });
        compression.enabled = true;
    }
}
