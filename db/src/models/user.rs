use chrono::NaiveDate;
use common::plan::PlanId;
use serde::{Deserialize, Serialize};

/// Calendar date on the process-local clock.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub plan: PlanId,
    pub subscription_active: bool,
    /// Only meaningful for `last_operation_date`.
    pub operations_today: u32,
    pub last_operation_date: NaiveDate,
    pub payment_failed: bool,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

impl UserRecord {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            plan: PlanId::Free,
            subscription_active: false,
            operations_today: 0,
            last_operation_date: today,
            payment_failed: false,
            stripe_customer_id: None,
            stripe_subscription_id: None,
        }
    }

    /// Zeroes the counter when it belongs to a previous day.
    /// Returns true when a reset happened.
    pub fn reset_if_stale(&mut self, today: NaiveDate) -> bool {
        if self.last_operation_date == today {
            return false;
        }
        self.operations_today = 0;
        self.last_operation_date = today;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn new_record_is_free_and_inactive() {
        let record = UserRecord::new(day(1));
        assert_eq!(record.plan, PlanId::Free);
        assert!(!record.subscription_active);
        assert!(!record.payment_failed);
        assert_eq!(record.operations_today, 0);
    }

    #[test]
    fn stale_counter_is_reset() {
        let mut record = UserRecord::new(day(1));
        record.operations_today = 5;

        assert!(record.reset_if_stale(day(2)));
        assert_eq!(record.operations_today, 0);
        assert_eq!(record.last_operation_date, day(2));
    }

    #[test]
    fn same_day_counter_is_kept() {
        let mut record = UserRecord::new(day(1));
        record.operations_today = 2;

        assert!(!record.reset_if_stale(day(1)));
        assert_eq!(record.operations_today, 2);
    }
}
