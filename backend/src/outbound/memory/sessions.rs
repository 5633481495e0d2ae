//! Process-local session store with passive expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionId, SessionRecord};

/// [`SessionStore`] keeping records in memory.
///
/// Expired records are evicted when they are read, and every `put` sweeps
/// the whole table so abandoned sessions do not accumulate.
pub struct InMemorySessionStore {
    records: Mutex<HashMap<SessionId, SessionRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    /// Create an empty store that judges expiry with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, SessionRecord>>, SessionStoreError> {
        self.records
            .lock()
            .map_err(|_| SessionStoreError::unavailable("session table lock poisoned"))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError> {
        let now = self.clock.utc();
        let mut records = self.lock()?;
        match records.get(id) {
            Some(record) if record.is_expired(now) => {
                debug!(user_id = %record.user_id(), "session expired");
                records.remove(id);
                Ok(None)
            }
            Some(record) => Ok(Some(record.clone())),
            None => Ok(None),
        }
    }

    async fn put(&self, id: &SessionId, record: &SessionRecord) -> Result<(), SessionStoreError> {
        let now = self.clock.utc();
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|_, existing| !existing.is_expired(now));
        let evicted = before - records.len();
        if evicted > 0 {
            debug!(evicted, "expired sessions swept");
        }
        records.insert(id.clone(), record.clone());
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.lock()?.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::domain::UserId;
    use crate::test_support::MutableClock;

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
            .single()
            .expect("timestamp")
    }

    #[tokio::test]
    async fn records_expire_on_read() {
        let clock = Arc::new(MutableClock::new(start()));
        let store = InMemorySessionStore::new(clock.clone());
        let id = SessionId::generate();
        let record = SessionRecord::new(UserId::random(), start(), start() + Duration::days(7));
        store.put(&id, &record).await.expect("put");

        clock.advance_seconds(Duration::days(7).num_seconds() - 1);
        assert_eq!(store.get(&id).await.expect("get"), Some(record));

        clock.advance_seconds(1);
        assert_eq!(store.get(&id).await.expect("get"), None);
    }

    #[tokio::test]
    async fn put_sweeps_expired_records_nobody_reads() {
        let clock = Arc::new(MutableClock::new(start()));
        let store = InMemorySessionStore::new(clock.clone());
        let abandoned = SessionId::generate();
        let short = SessionRecord::new(UserId::random(), start(), start() + Duration::hours(1));
        store.put(&abandoned, &short).await.expect("put");

        clock.advance_seconds(Duration::hours(2).num_seconds());
        let fresh = SessionId::generate();
        let now = start() + Duration::hours(2);
        let live = SessionRecord::new(UserId::random(), now, now + Duration::days(7));
        store.put(&fresh, &live).await.expect("put");

        let records = store.lock().expect("lock");
        assert!(!records.contains_key(&abandoned));
        assert_eq!(records.get(&fresh), Some(&live));
    }

    #[tokio::test]
    async fn destroy_is_idempotent() {
        let store = InMemorySessionStore::new(Arc::new(MutableClock::new(start())));
        let id = SessionId::generate();
        let record = SessionRecord::new(UserId::random(), start(), start() + Duration::days(7));
        store.put(&id, &record).await.expect("put");

        store.destroy(&id).await.expect("destroy");
        store.destroy(&id).await.expect("destroy again");

        assert_eq!(store.get(&id).await.expect("get"), None);
    }
}
