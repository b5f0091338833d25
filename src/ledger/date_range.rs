use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{FinanceError, Result};

/// Optional inclusive date filter applied to timestamps.
///
/// The end date covers the whole day, so a record stamped `23:59:59.999` on the end
/// date is inside the range.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(FinanceError::validation(format!(
                    "date range end {} is before start {}",
                    end, start
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// A range without bounds; matches every timestamp.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(Some(start), Some(end))
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day <= end)
    }
}

/// Calendar month in 1-based month numbering. Only built through validated constructors.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MonthPeriod {
    year: i32,
    month: u32,
}

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(FinanceError::validation(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at.year() == self.year && at.month() == self.month
    }
}

/// Calendar quarter: three whole months. The quarter is always within 1..=4.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct QuarterPeriod {
    year: i32,
    quarter: u32,
}

impl QuarterPeriod {
    pub fn new(year: i32, quarter: u32) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(FinanceError::validation(format!(
                "quarter must be between 1 and 4, got {}",
                quarter
            )));
        }
        Ok(Self { year, quarter })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u32 {
        self.quarter
    }

    /// First month of the quarter, 1-based.
    pub fn start_month(&self) -> u32 {
        (self.quarter - 1) * 3 + 1
    }

    /// Last month of the quarter, 1-based and inclusive.
    pub fn end_month(&self) -> u32 {
        self.start_month() + 2
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at.year() == self.year && (self.start_month()..=self.end_month()).contains(&at.month())
    }

    pub fn all_in(year: i32) -> [QuarterPeriod; 4] {
        [1, 2, 3, 4].map(|quarter| QuarterPeriod { year, quarter })
    }
}
