use chrono::NaiveDate;
use common::plan::PlanId;
use db::{models::user::UserRecord, user::UserStore};

/// Demo users: (id, plan, subscription active, operations already done today).
const DEMO_USERS: [(&str, PlanId, bool, u32); 3] = [
    ("user_free", PlanId::Free, false, 0),
    ("user_amateur", PlanId::Amateur, true, 1),
    ("user_pro", PlanId::Pro, true, 5),
];

/// Overwrites the demo users with fresh records dated `today`.
pub fn seed_demo_users(store: &dyn UserStore, today: NaiveDate) -> Vec<&'static str> {
    DEMO_USERS
        .iter()
        .map(|&(user_id, plan, active, operations_today)| {
            store.replace(
                user_id,
                UserRecord {
                    plan,
                    subscription_active: active,
                    operations_today,
                    ..UserRecord::new(today)
                },
            );
            user_id
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::user::MemoryUserStore;

    #[test]
    fn seeding_overwrites_existing_records() {
        let store = MemoryUserStore::new();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        store.upsert("user_pro", &mut |r| {
            r.operations_today = 11;
            r.stripe_customer_id = Some("cus_old".to_string());
        });

        let users = seed_demo_users(&store, today);

        assert_eq!(users, vec!["user_free", "user_amateur", "user_pro"]);
        let pro = store.get("user_pro").unwrap();
        assert_eq!(pro.plan, PlanId::Pro);
        assert_eq!(pro.operations_today, 5);
        assert_eq!(pro.stripe_customer_id, None);
        assert_eq!(pro.last_operation_date, today);
        assert!(!store.get("user_free").unwrap().subscription_active);
    }
}
