use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Utc};

use crate::domain::model::{Period, PeriodEnd};

/// The calendar month before the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousMonth {
    start: NaiveDate,
}

impl PreviousMonth {
    pub fn from_today(today: NaiveDate) -> Self {
        let first_of_month = today.with_day(1).unwrap_or(today);
        let start = first_of_month
            .checked_sub_months(Months::new(1))
            .unwrap_or(first_of_month);
        Self { start }
    }

    /// First day of the previous month.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// `YYYY-MM`，用來比對 potentialEarningsByMonth
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.start.year(), self.start.month())
    }
}

/// 判斷最後一段僱用期間在上個月是否仍有效
pub fn employment_active(period: Option<&Period>, previous: &PreviousMonth) -> bool {
    let Some(period) = period else {
        return false;
    };

    match &period.end {
        PeriodEnd::OpenEnded => true,
        PeriodEnd::Missing => false,
        PeriodEnd::Date(raw) => match parse_end_date(raw) {
            Some(end) => end >= previous.start(),
            None => {
                tracing::debug!("Unparsable period end '{}', treating as ended", raw);
                false
            }
        },
    }
}

pub fn parse_end_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(timestamp.date());
        }
    }
    // 只有年月時視為該月第一天
    NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").ok()
}
