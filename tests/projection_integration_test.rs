use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;
use workforce_rows::utils::validation::Validate;
use workforce_rows::{DisplayRow, EtlEngine, LocalStorage, ProjectionPipeline, TomlConfig};

fn source_document() -> serde_json::Value {
    json!([
        {
            "employees": {
                "firstname": "Ada",
                "lastname": "Lovelace",
                "workforceUtilisation": {
                    "utilisationRateLastTwelveMonths": 0.8234,
                    "utilisationRateYearToDate": 0.79,
                    "lastThreeMonthsIndividually": [
                        { "month": "August", "utilisationRate": 0.91 },
                        { "month": "July", "utilisationRate": 0.72 },
                        { "month": "June", "utilisationRate": 0.65 }
                    ]
                },
                "costsByMonth": {
                    "periods": [
                        { "start": "2019-04-01", "end": "2021-12-31", "monthlySalary": 3100 },
                        { "start": "2022-01-01", "end": "null", "monthlySalary": 4200.5 }
                    ],
                    "potentialEarningsByMonth": [
                        { "month": "2024-07", "costs": 7800 },
                        { "month": "2024-08", "costs": 9100.25 }
                    ]
                }
            }
        },
        {
            "externals": {
                "firstname": "Grace",
                "lastname": "Hopper",
                "workforceUtilisation": {
                    "utilisationRateLastTwelveMonths": "0.5",
                    "lastThreeMonthsIndividually": [
                        { "month": "June", "utilisationRate": 0.4 },
                        { "month": "August", "utilisationRate": 0.6 }
                    ]
                },
                "costsByMonth": {
                    "periods": [
                        { "start": "2024-02-01", "end": "2024-12-31", "monthlySalary": 6000 }
                    ]
                }
            }
        },
        {
            "externals": {
                "firstname": "Alan",
                "lastname": "Turing",
                "costsByMonth": {
                    "periods": [
                        { "start": "2023-01-01", "end": "2024-06-30", "monthlySalary": 5000 }
                    ]
                }
            }
        },
        { "comment": "placeholder without worker" }
    ])
}

async fn write_fixture(temp_dir: &TempDir, config_body: &str) -> Result<TomlConfig> {
    let temp_path = temp_dir.path().to_str().unwrap().replace('\\', "/");

    let source_path = format!("{}/source-data.json", temp_path);
    tokio::fs::write(&source_path, serde_json::to_vec_pretty(&source_document())?).await?;

    let config_content = format!(
        r#"
[export]
name = "integration"

[source]
input_path = "{source}"

[projection]
reference_date = "2024-09-15"

[load]
output_path = "{out}/exports"
{body}
"#,
        source = source_path,
        out = temp_path,
        body = config_body
    );

    let config_path = format!("{}/workforce-rows.toml", temp_path);
    tokio::fs::write(&config_path, config_content).await?;
    Ok(TomlConfig::from_file(&config_path)?)
}

/// 完整流程：讀取來源 JSON，輸出 CSV 與 JSON
#[tokio::test]
async fn test_end_to_end_csv_and_json_export() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = write_fixture(&temp_dir, r#"output_formats = ["csv", "json"]"#).await?;
    config.validate()?;

    let engine = EtlEngine::new(ProjectionPipeline::new(LocalStorage::default(), config));
    let output_path = engine.run().await?;
    println!("📁 Output: {}", output_path);
    assert!(output_path.ends_with("workforce_rows.csv"));

    let exports = temp_dir.path().join("exports");
    let csv = tokio::fs::read_to_string(exports.join("workforce_rows.csv")).await?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4, "header plus three workers: {:?}", lines);
    assert_eq!(
        lines[0],
        "Person,Past 12 Months,Y2D,June,July,August,Net Earnings Prev Month"
    );

    let json = tokio::fs::read(exports.join("workforce_rows.json")).await?;
    let rows: Vec<DisplayRow> = serde_json::from_slice(&json)?;
    assert_eq!(rows.len(), 3);

    let ada = &rows[0];
    assert_eq!(ada.person, "Ada Lovelace");
    assert_eq!(ada.past_12_months, "82.34%");
    assert_eq!(ada.y2d, "79%");
    assert_eq!(ada.june, "65%");
    assert_eq!(ada.july, "72%");
    assert_eq!(ada.august, "91%");
    assert_eq!(ada.net_earnings_prev_month, "4899.75 EUR");

    let grace = &rows[1];
    assert_eq!(grace.past_12_months, "50%");
    assert_eq!(grace.y2d, "NaN%");
    assert_eq!(grace.june, "40%");
    assert_eq!(grace.july, "NaN%");
    assert_eq!(grace.august, "60%");
    assert_eq!(grace.net_earnings_prev_month, "-6000 EUR");

    let alan = &rows[2];
    assert_eq!(alan.person, "Alan Turing");
    assert_eq!(alan.net_earnings_prev_month, "0 EUR");

    Ok(())
}

#[tokio::test]
async fn test_end_to_end_zip_bundle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = write_fixture(
        &temp_dir,
        r#"output_formats = ["csv", "tsv", "json"]

[load.compression]
enabled = true
filename = "table.zip"
"#,
    )
    .await?;

    let engine = EtlEngine::new(ProjectionPipeline::new(LocalStorage::default(), config));
    let output_path = engine.run().await?;
    assert!(output_path.ends_with("table.zip"));

    let zip_data = tokio::fs::read(&output_path).await?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 3);

    let mut tsv = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("workforce_rows.tsv")?, &mut tsv)?;
    let first_row = tsv.lines().nth(1).unwrap();
    assert_eq!(
        first_row,
        "Ada Lovelace\t82.34%\t79%\t65%\t72%\t91%\t4899.75 EUR"
    );

    Ok(())
}

#[tokio::test]
async fn test_keep_unresolved_and_cost_difference_from_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = write_fixture(&temp_dir, r#"output_formats = ["json"]"#).await?;
    config.projection.keep_unresolved = Some(true);
    config.projection.net_earnings =
        Some(workforce_rows::core::projector::NetEarningsStrategy::MonthlyCostDifference);

    let engine = EtlEngine::new(ProjectionPipeline::new(LocalStorage::default(), config));
    let output_path = engine.run().await?;

    let rows: Vec<DisplayRow> = serde_json::from_slice(&tokio::fs::read(&output_path).await?)?;
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3].person, "NaN");
    assert_eq!(rows[3].past_12_months, "NaN%");
    // 沒有 monthlyCostDifference 時為 0
    assert_eq!(rows[0].net_earnings_prev_month, "0 EUR");

    Ok(())
}

#[tokio::test]
async fn test_invalid_source_document_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = write_fixture(&temp_dir, r#"output_formats = ["csv"]"#).await?;
    tokio::fs::write(config.source.input_path.clone(), b"{\"rows\": 1}").await?;

    let engine = EtlEngine::new(ProjectionPipeline::new(LocalStorage::default(), config));
    let err = engine.run().await.unwrap_err();

    assert!(matches!(
        err,
        workforce_rows::EtlError::SourceFormatError { .. }
    ));
    assert_eq!(err.exit_code(), 2);
    Ok(())
}
