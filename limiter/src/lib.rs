use std::sync::Arc;

use common::plan::PlanCatalog;
use db::user::UserStore;
use quota::QuotaTracker;

pub mod quota;

pub fn quota_tracker(store: Arc<dyn UserStore>, plans: Arc<PlanCatalog>) -> QuotaTracker {
    QuotaTracker::new(store, plans)
}
