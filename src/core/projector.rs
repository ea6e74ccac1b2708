use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::calendar::{employment_active, PreviousMonth};
use crate::core::format::{currency, percentage, round2};
use crate::domain::model::{DisplayRow, ProjectionResult, SourceRecord, Worker, WorkerKind};

/// How the June / July / August columns find their utilisation entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum MonthStrategy {
    /// Match the entry's `month` tag. Order-independent.
    #[default]
    Tagged,
    /// Deprecated: index 0 = August, 1 = July, 2 = June.
    Positional,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum NetEarningsStrategy {
    /// 員工：上月潛在收入 - 月薪；外部人員：- 月薪
    #[default]
    SalaryNetting,
    /// 直接使用 workforceUtilisation.monthlyCostDifference
    MonthlyCostDifference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub month_strategy: MonthStrategy,
    pub net_earnings: NetEarningsStrategy,
    /// Emit `NaN` rows for records without a worker instead of dropping them.
    pub keep_unresolved: bool,
    /// Pins "today"; the local date is used when unset.
    pub reference_date: Option<NaiveDate>,
}

/// Named month columns and their position in the most-recent-first list.
const MONTH_COLUMNS: [(&str, usize); 3] = [("June", 2), ("July", 1), ("August", 0)];

/// 將來源記錄轉成表格列，本身不保存任何狀態
#[derive(Debug, Clone, Default)]
pub struct RowProjector {
    options: ProjectionOptions,
}

impl RowProjector {
    pub fn new(options: ProjectionOptions) -> Self {
        if options.month_strategy == MonthStrategy::Positional {
            tracing::warn!(
                "⚠️ Positional month lookup is deprecated; reordered month lists will land in the wrong columns"
            );
        }
        Self { options }
    }

    pub fn project(&self, records: &[SourceRecord]) -> Vec<DisplayRow> {
        self.project_with_stats(records).rows
    }

    pub fn project_with_stats(&self, records: &[SourceRecord]) -> ProjectionResult {
        let today = self
            .options
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        self.project_at(records, today)
    }

    pub fn project_at(&self, records: &[SourceRecord], today: NaiveDate) -> ProjectionResult {
        let previous = PreviousMonth::from_today(today);
        tracing::debug!(
            "Projecting {} records, previous month {}",
            records.len(),
            previous.key()
        );

        let mut rows = Vec::with_capacity(records.len());
        let mut records_skipped = 0;

        for (index, record) in records.iter().enumerate() {
            match record.resolve_worker() {
                Some((_, worker)) => {
                    rows.push(self.project_worker(record.netting_kind(), worker, &previous))
                }
                None if self.options.keep_unresolved => rows.push(unresolved_row()),
                None => {
                    tracing::debug!("Skipping record #{}: no employee or external", index);
                    records_skipped += 1;
                }
            }
        }

        tracing::info!(
            "📊 Projected {} rows ({} records skipped)",
            rows.len(),
            records_skipped
        );

        ProjectionResult {
            rows,
            records_read: records.len(),
            records_skipped,
            previous_month: previous.key(),
        }
    }

    fn project_worker(
        &self,
        kind: WorkerKind,
        worker: &Worker,
        previous: &PreviousMonth,
    ) -> DisplayRow {
        let utilisation = &worker.workforce_utilisation;
        let [june, july, august] = MONTH_COLUMNS.map(|(name, position)| {
            let rate = match self.options.month_strategy {
                MonthStrategy::Tagged => utilisation.rate_for_month(name),
                MonthStrategy::Positional => utilisation.rate_at(position),
            };
            percentage(rate)
        });

        let net = net_earnings(kind, worker, previous, self.options.net_earnings);

        DisplayRow {
            person: worker.display_name(),
            past_12_months: percentage(utilisation.utilisation_rate_last_twelve_months),
            y2d: percentage(utilisation.utilisation_rate_year_to_date),
            june,
            july,
            august,
            net_earnings_prev_month: currency(net),
        }
    }
}

fn unresolved_row() -> DisplayRow {
    let missing = percentage(None);
    DisplayRow {
        person: "NaN".to_string(),
        past_12_months: missing.clone(),
        y2d: missing.clone(),
        june: missing.clone(),
        july: missing.clone(),
        august: missing,
        net_earnings_prev_month: currency(f64::NAN),
    }
}

/// Latest period's salary, or 0 when the worker was no longer employed last month.
pub fn effective_salary(worker: &Worker, previous: &PreviousMonth) -> f64 {
    let period = worker.costs_by_month.latest_period();
    let salary = period
        .and_then(|p| p.monthly_salary)
        .filter(|salary| *salary != 0.0);

    match salary {
        Some(salary) if employment_active(period, previous) => salary,
        _ => 0.0,
    }
}

pub fn net_earnings(
    kind: WorkerKind,
    worker: &Worker,
    previous: &PreviousMonth,
    strategy: NetEarningsStrategy,
) -> f64 {
    let net = match strategy {
        NetEarningsStrategy::MonthlyCostDifference => worker
            .workforce_utilisation
            .monthly_cost_difference
            .unwrap_or(0.0),
        NetEarningsStrategy::SalaryNetting => {
            let salary = effective_salary(worker, previous);
            match kind {
                WorkerKind::External => -salary,
                WorkerKind::Employee => {
                    let potential = worker
                        .costs_by_month
                        .potential_earnings_for(&previous.key())
                        .and_then(|entry| entry.costs)
                        .unwrap_or(0.0);
                    potential - salary
                }
            }
        }
    };

    let rounded = round2(net);
    if rounded.is_finite() {
        rounded
    } else {
        0.0
    }
}
