use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Currency;

use super::{
    category::Category,
    time_interval::{TimeInterval, TimeUnit},
};

/// Longest schedule preview handed out in one call.
pub const MAX_PREVIEW_DATES: usize = 120;

/// A standing order. Executing it is left to an external scheduler; this record only
/// tracks the schedule and its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringPayment {
    pub id: Uuid,
    pub account_id: Uuid,
    pub recipient_name: String,
    pub recipient_account: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub next_payment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub status: RecurringStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_id: Option<Uuid>,
}

impl RecurringPayment {
    pub fn is_active(&self) -> bool {
        matches!(self.status, RecurringStatus::Active)
    }

    /// True when `date` does not fall after the optional end date.
    pub fn allows(&self, date: NaiveDate) -> bool {
        self.end_date.map_or(true, |end| date <= end)
    }

    /// Upcoming payment dates starting at `next_payment_date`, stopping at the end date,
    /// the calendar's last date or [`MAX_PREVIEW_DATES`], whichever comes first.
    pub fn upcoming(&self, count: usize) -> Vec<NaiveDate> {
        let interval = self.frequency.interval();
        let count = count.min(MAX_PREVIEW_DATES);
        let mut dates = Vec::with_capacity(count);
        let mut candidate = Some(self.next_payment_date);
        while let Some(date) = candidate.filter(|date| dates.len() < count && self.allows(*date)) {
            dates.push(date);
            candidate = interval.next_date(date);
        }
        dates
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn interval(&self) -> TimeInterval {
        match self {
            Frequency::Weekly => TimeInterval::new(1, TimeUnit::Week),
            Frequency::Monthly => TimeInterval::new(1, TimeUnit::Month),
            Frequency::Quarterly => TimeInterval::new(3, TimeUnit::Month),
            Frequency::Yearly => TimeInterval::new(1, TimeUnit::Year),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurringStatus {
    Active,
    Paused,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn order(next: NaiveDate, frequency: Frequency) -> RecurringPayment {
        RecurringPayment {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            recipient_name: "Udlejer".into(),
            recipient_account: String::new(),
            amount: dec!(100),
            currency: Currency::DKK,
            description: String::new(),
            reference: String::new(),
            category: None,
            frequency,
            start_date: next,
            next_payment_date: next,
            end_date: None,
            status: RecurringStatus::Active,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            last_payment_id: None,
        }
    }

    #[test]
    fn open_ended_preview_is_capped() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let dates = order(start, Frequency::Weekly).upcoming(usize::MAX);
        assert_eq!(dates.len(), MAX_PREVIEW_DATES);
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2025, 1, 8).unwrap());
    }

    #[test]
    fn preview_stops_at_the_calendar_end() {
        let near_end = NaiveDate::MAX - chrono::Duration::days(20);
        let dates = order(near_end, Frequency::Weekly).upcoming(10);
        assert_eq!(dates.len(), 3);
        assert!(dates.iter().all(|date| *date <= NaiveDate::MAX));
    }
}
