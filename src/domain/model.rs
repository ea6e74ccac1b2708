use serde::{Deserialize, Serialize};

use crate::domain::lenient;

/// 來源資料的一筆記錄，employees 或 externals 其中之一代表這筆的 worker
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRecord {
    #[serde(default, alias = "employee", deserialize_with = "lenient::worker")]
    pub employees: Option<Worker>,
    #[serde(default, alias = "external", deserialize_with = "lenient::worker")]
    pub externals: Option<Worker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    Employee,
    External,
}

impl SourceRecord {
    /// Employee takes priority when both are present.
    pub fn resolve_worker(&self) -> Option<(WorkerKind, &Worker)> {
        if let Some(employee) = &self.employees {
            return Some((WorkerKind::Employee, employee));
        }
        self.externals
            .as_ref()
            .map(|external| (WorkerKind::External, external))
    }

    /// Netting rule for the record: any record carrying an external is netted
    /// as pure cost, even when the employee supplies the displayed values.
    pub fn netting_kind(&self) -> WorkerKind {
        if self.externals.is_some() {
            WorkerKind::External
        } else {
            WorkerKind::Employee
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(default, deserialize_with = "lenient::text")]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "lenient::subtree")]
    pub workforce_utilisation: WorkforceUtilisation,
    #[serde(default, deserialize_with = "lenient::subtree")]
    pub costs_by_month: CostsByMonth,
}

impl Worker {
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.firstname.as_deref().unwrap_or_default(),
            self.lastname.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkforceUtilisation {
    #[serde(default, deserialize_with = "lenient::number")]
    pub utilisation_rate_last_twelve_months: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub utilisation_rate_year_to_date: Option<f64>,
    /// Most recent month first.
    #[serde(default, deserialize_with = "lenient::list")]
    pub last_three_months_individually: Vec<MonthUtilisation>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub monthly_cost_difference: Option<f64>,
}

impl WorkforceUtilisation {
    pub fn rate_for_month(&self, month_name: &str) -> Option<f64> {
        let wanted = month_name.trim();
        self.last_three_months_individually
            .iter()
            .find(|entry| {
                entry
                    .month
                    .as_deref()
                    .is_some_and(|tag| tag.trim().eq_ignore_ascii_case(wanted))
            })
            .and_then(|entry| entry.utilisation_rate)
    }

    pub fn rate_at(&self, index: usize) -> Option<f64> {
        self.last_three_months_individually
            .get(index)
            .and_then(|entry| entry.utilisation_rate)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthUtilisation {
    #[serde(default, deserialize_with = "lenient::text")]
    pub month: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub utilisation_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostsByMonth {
    #[serde(default, deserialize_with = "lenient::list")]
    pub periods: Vec<Period>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub potential_earnings_by_month: Vec<MonthlyEarnings>,
}

impl CostsByMonth {
    pub fn latest_period(&self) -> Option<&Period> {
        self.periods.last()
    }

    /// First entry whose month equals `month_key` (`YYYY-MM`).
    pub fn potential_earnings_for(&self, month_key: &str) -> Option<&MonthlyEarnings> {
        self.potential_earnings_by_month
            .iter()
            .find(|entry| entry.month.as_deref() == Some(month_key))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(default, deserialize_with = "lenient::text")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "lenient::period_end")]
    pub end: PeriodEnd,
    #[serde(default, deserialize_with = "lenient::number")]
    pub monthly_salary: Option<f64>,
}

/// 區分字串 "null"（仍在職）與真正的 null / 缺欄位
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PeriodEnd {
    #[default]
    Missing,
    OpenEnded,
    Date(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEarnings {
    #[serde(default, deserialize_with = "lenient::text")]
    pub month: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub costs: Option<f64>,
}

/// 表格的一列，所有欄位都已格式化成字串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub person: String,
    #[serde(rename = "past12Months")]
    pub past_12_months: String,
    pub y2d: String,
    pub june: String,
    pub july: String,
    pub august: String,
    #[serde(rename = "netEarningsPrevMonth")]
    pub net_earnings_prev_month: String,
}

impl DisplayRow {
    /// Cells in column order.
    pub fn cells(&self) -> [&str; 7] {
        [
            self.person.as_str(),
            self.past_12_months.as_str(),
            self.y2d.as_str(),
            self.june.as_str(),
            self.july.as_str(),
            self.august.as_str(),
            self.net_earnings_prev_month.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub accessor_key: &'static str,
    pub header: &'static str,
}

pub const COLUMNS: [Column; 7] = [
    Column {
        accessor_key: "person",
        header: "Person",
    },
    Column {
        accessor_key: "past12Months",
        header: "Past 12 Months",
    },
    Column {
        accessor_key: "y2d",
        header: "Y2D",
    },
    Column {
        accessor_key: "june",
        header: "June",
    },
    Column {
        accessor_key: "july",
        header: "July",
    },
    Column {
        accessor_key: "august",
        header: "August",
    },
    Column {
        accessor_key: "netEarningsPrevMonth",
        header: "Net Earnings Prev Month",
    },
];

#[derive(Debug, Clone)]
pub struct ProjectionResult {
    pub rows: Vec<DisplayRow>,
    pub records_read: usize,
    pub records_skipped: usize,
    pub previous_month: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_employee_takes_priority_over_external() {
        let record: SourceRecord = serde_json::from_value(json!({
            "employees": { "firstname": "Ada", "lastname": "Lovelace" },
            "externals": { "firstname": "Charles", "lastname": "Babbage" }
        }))
        .unwrap();

        let (kind, worker) = record.resolve_worker().unwrap();
        assert_eq!(kind, WorkerKind::Employee);
        assert_eq!(worker.display_name(), "Ada Lovelace");
        assert_eq!(record.netting_kind(), WorkerKind::External);
    }

    #[test]
    fn test_singular_keys_are_accepted() {
        let record: SourceRecord = serde_json::from_value(json!({
            "external": { "firstname": "Grace", "lastname": "Hopper" }
        }))
        .unwrap();

        let (kind, _) = record.resolve_worker().unwrap();
        assert_eq!(kind, WorkerKind::External);
    }

    #[test]
    fn test_non_object_worker_counts_as_absent() {
        let record: SourceRecord = serde_json::from_value(json!({
            "employees": "n/a",
            "externals": null
        }))
        .unwrap();

        assert!(record.resolve_worker().is_none());
    }

    #[test]
    fn test_malformed_subtrees_fall_back_to_defaults() {
        let worker: Worker = serde_json::from_value(json!({
            "firstname": "Alan",
            "workforceUtilisation": "broken",
            "costsByMonth": { "periods": 42 }
        }))
        .unwrap();

        assert_eq!(worker.display_name(), "Alan ");
        assert!(worker.workforce_utilisation.utilisation_rate_year_to_date.is_none());
        assert!(worker.costs_by_month.latest_period().is_none());
    }

    #[test]
    fn test_rate_for_month_ignores_order_and_case() {
        let utilisation: WorkforceUtilisation = serde_json::from_value(json!({
            "lastThreeMonthsIndividually": [
                { "month": "june", "utilisationRate": 0.6 },
                { "month": "August", "utilisationRate": 0.8 },
                { "month": " July ", "utilisationRate": 0.7 }
            ]
        }))
        .unwrap();

        assert_eq!(utilisation.rate_for_month("June"), Some(0.6));
        assert_eq!(utilisation.rate_for_month("July"), Some(0.7));
        assert_eq!(utilisation.rate_for_month("August"), Some(0.8));
        assert_eq!(utilisation.rate_for_month("May"), None);
        assert_eq!(utilisation.rate_at(1), Some(0.8));
    }

    #[test]
    fn test_display_row_serializes_with_table_keys() {
        let row = DisplayRow {
            person: "Ada Lovelace".to_string(),
            past_12_months: "80%".to_string(),
            y2d: "75%".to_string(),
            june: "70%".to_string(),
            july: "NaN%".to_string(),
            august: "90%".to_string(),
            net_earnings_prev_month: "600 EUR".to_string(),
        };

        let value = serde_json::to_value(&row).unwrap();
        for column in COLUMNS {
            assert!(value.get(column.accessor_key).is_some(), "{}", column.accessor_key);
        }
    }
}
