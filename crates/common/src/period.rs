use chrono::{Datelike, Months, NaiveDate};
use serde::Deserialize;
use validator::Validate;

/// A calendar month, stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    start: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        if !(1..=12).contains(&month) {
            return Err("month must be between 1 and 12".to_string());
        }
        if !(1..=9999).contains(&year) {
            return Err("year must be between 1 and 9999".to_string());
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|start| Self { start })
            .ok_or_else(|| format!("invalid period {}-{:02}", year, month))
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// January rolls back to December of the previous year.
    pub fn previous(&self) -> Self {
        Self { start: self.start - Months::new(1) }
    }

    /// `YYYY-MM`, matching `strftime('%Y-%m', date)` on stored `YYYY-MM-DD` dates.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year(), self.month())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PeriodQuery {
    #[validate(range(min = 1, max = 9999, message = "year must be between 1 and 9999"))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "month must be between 1 and 12"))]
    pub month: u32,
}

impl PeriodQuery {
    pub fn period(&self) -> Result<YearMonth, String> {
        YearMonth::new(self.year, self.month)
    }
}
