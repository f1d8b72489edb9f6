use dashmap::DashMap;

use crate::models::user::{UserRecord, today};

/// Storage seam for user records.
///
/// Every mutation goes through [`UserStore::upsert`], which runs the closure
/// while holding the record's lock. Implementations create a default record
/// on first reference.
pub trait UserStore: Send + Sync {
    /// Returns a copy of the record, if the user was ever seen.
    fn get(&self, user_id: &str) -> Option<UserRecord>;

    /// Creates the record when missing, applies `apply` atomically and
    /// returns the resulting record.
    fn upsert(&self, user_id: &str, apply: &mut dyn FnMut(&mut UserRecord)) -> UserRecord;

    /// Overwrites the whole record.
    fn replace(&self, user_id: &str, record: UserRecord);

    fn get_or_create(&self, user_id: &str) -> UserRecord {
        self.upsert(user_id, &mut |_| {})
    }
}

/// `UserStore` backed by a sharded concurrent map.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserStore for MemoryUserStore {
    fn get(&self, user_id: &str) -> Option<UserRecord> {
        self.users.get(user_id).map(|record| record.clone())
    }

    fn upsert(&self, user_id: &str, apply: &mut dyn FnMut(&mut UserRecord)) -> UserRecord {
        let mut entry = self
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| {
                log::debug!("Creating record for user {}", user_id);
                UserRecord::new(today())
            });
        apply(entry.value_mut());
        entry.value().clone()
    }

    fn replace(&self, user_id: &str, record: UserRecord) {
        self.users.insert(user_id.to_string(), record);
    }
}
