use common::plan::PlanId;

use crate::models::user::UserRecord;

/// Plan state reported by the payment processor for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpdate {
    pub plan: PlanId,
    pub subscription_active: bool,
    pub payment_failed: bool,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

impl SubscriptionUpdate {
    /// Writes the plan state onto the record. Quota counters are left alone,
    /// and absent Stripe ids keep whatever the record already holds.
    pub fn apply_to(&self, record: &mut UserRecord) {
        record.plan = self.plan;
        record.subscription_active = self.subscription_active;
        record.payment_failed = self.payment_failed;
        if let Some(customer_id) = &self.stripe_customer_id {
            record.stripe_customer_id = Some(customer_id.clone());
        }
        if let Some(subscription_id) = &self.stripe_subscription_id {
            record.stripe_subscription_id = Some(subscription_id.clone());
        }
    }
}
