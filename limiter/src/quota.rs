use std::sync::Arc;

use chrono::NaiveDate;
use common::plan::{PlanCatalog, PlanId};
use db::{
    models::user::{UserRecord, today},
    user::UserStore,
};
use serde::Serialize;

/// Snapshot of a user's plan and daily usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaStatus {
    pub plan: PlanId,
    pub active: bool,
    pub operations_today: u32,
    pub operations_max_daily: u32,
    pub payment_failed: bool,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

impl QuotaStatus {
    pub fn can_operate(&self) -> bool {
        self.operations_today < self.operations_max_daily
    }

    pub fn operations_remaining(&self) -> u32 {
        self.operations_max_daily
            .saturating_sub(self.operations_today)
    }
}

/// Outcome of an atomic check-and-register.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Registered(QuotaStatus),
    LimitReached(QuotaStatus),
}

/// Daily operation counter per user, checked against the user's plan.
///
/// Counters are reset lazily: whenever a record is touched on a day other
/// than its `last_operation_date`, the counter is zeroed first.
#[derive(Clone)]
pub struct QuotaTracker {
    store: Arc<dyn UserStore>,
    plans: Arc<PlanCatalog>,
}

impl QuotaTracker {
    pub fn new(store: Arc<dyn UserStore>, plans: Arc<PlanCatalog>) -> Self {
        Self { store, plans }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn plans(&self) -> &PlanCatalog {
        &self.plans
    }

    /// Current status, creating the user on first sight.
    pub fn get_status(&self, user_id: &str) -> QuotaStatus {
        self.get_status_on(user_id, today())
    }

    pub fn can_operate(&self, user_id: &str) -> bool {
        self.get_status(user_id).can_operate()
    }

    /// Counts one operation without looking at the quota.
    pub fn register_operation(&self, user_id: &str) -> QuotaStatus {
        self.register_operation_on(user_id, today())
    }

    /// Counts one operation only if the plan still allows it today.
    /// Check and increment happen under the record lock.
    pub fn try_register_operation(&self, user_id: &str) -> Registration {
        self.try_register_operation_on(user_id, today())
    }

    fn get_status_on(&self, user_id: &str, today: NaiveDate) -> QuotaStatus {
        let record = self.store.upsert(user_id, &mut |record| {
            record.reset_if_stale(today);
        });
        self.status_of(&record)
    }

    fn register_operation_on(&self, user_id: &str, today: NaiveDate) -> QuotaStatus {
        let record = self.store.upsert(user_id, &mut |record| {
            record.reset_if_stale(today);
            record.operations_today += 1;
        });
        log::info!(
            "User {} performed operation. Total today: {}",
            user_id,
            record.operations_today
        );
        self.status_of(&record)
    }

    fn try_register_operation_on(&self, user_id: &str, today: NaiveDate) -> Registration {
        let plans = &self.plans;
        let mut registered = false;
        let record = self.store.upsert(user_id, &mut |record| {
            record.reset_if_stale(today);
            if record.operations_today < plans.get(record.plan).operations_max_daily {
                record.operations_today += 1;
                registered = true;
            }
        });

        let status = self.status_of(&record);
        if registered {
            log::info!(
                "User {} performed operation. Total today: {}",
                user_id,
                status.operations_today
            );
            Registration::Registered(status)
        } else {
            log::info!(
                "User {} reached the daily limit of {} operations",
                user_id,
                status.operations_max_daily
            );
            Registration::LimitReached(status)
        }
    }

    fn status_of(&self, record: &UserRecord) -> QuotaStatus {
        QuotaStatus {
            plan: record.plan,
            active: record.subscription_active,
            operations_today: record.operations_today,
            operations_max_daily: self.plans.get(record.plan).operations_max_daily,
            payment_failed: record.payment_failed,
            stripe_customer_id: record.stripe_customer_id.clone(),
            stripe_subscription_id: record.stripe_subscription_id.clone(),
        }
    }
}
