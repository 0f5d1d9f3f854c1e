//! Bounded per-user mutex table: serializes writes to session history and
//! memory per user id via a per-key mutex.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct UserLockTable {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
    cap: usize,
}

impl UserLockTable {
    pub fn new(cap: usize) -> Self {
        Self { locks: DashMap::new(), cap }
    }

    /// Returns the mutex for `user_id`, creating one if absent. When the
    /// table is at capacity, evicts one currently-unheld lock (an
    /// approximate LRU: exact recency isn't tracked, but an uncontended
    /// entry is the best available eviction candidate).
    pub fn lock_for(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        if let Some(existing) = self.locks.get(&user_id) {
            return existing.clone();
        }

        if self.locks.len() >= self.cap {
            if let Some(victim) = self.locks.iter().find(|e| Arc::strong_count(e.value()) == 1).map(|e| *e.key()) {
                self.locks.remove(&victim);
            }
        }

        self.locks.entry(user_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_user_id_reuses_the_same_lock() {
        let table = UserLockTable::new(10);
        let id = Uuid::new_v4();
        let a = table.lock_for(id);
        let b = table.lock_for(id);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn evicts_when_over_capacity() {
        let table = UserLockTable::new(2);
        let _ = table.lock_for(Uuid::new_v4());
        let _ = table.lock_for(Uuid::new_v4());
        let _ = table.lock_for(Uuid::new_v4());
        assert!(table.locks.len() <= 2);
    }
}
