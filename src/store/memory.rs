use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{AnalysisRow, PresenceStore, StoreError, StoreResult, UserDirectory};
use crate::model::presence::{NewPresence, PresenceRecord, StatusCounts};
use crate::model::user::UserProfile;

#[derive(Default)]
struct Tables {
    next_id: u64,
    presences: Vec<PresenceRecord>,
    users: HashMap<u64, UserProfile>,
}

/// In-process store for tests. Check-and-insert runs under a single lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: u64, role_id: u8, class: Option<&str>, position: Option<&str>) {
        let mut tables = self.tables.lock().unwrap();
        tables.users.insert(
            id,
            UserProfile {
                id,
                role_id,
                class: class.map(str::to_owned),
                position: position.map(str::to_owned),
            },
        );
    }

    fn sorted(mut records: Vec<PresenceRecord>) -> Vec<PresenceRecord> {
        records.sort_by_key(|r| (r.date, r.id));
        records
    }
}

#[async_trait]
impl PresenceStore for MemoryStore {
    async fn insert(&self, new: NewPresence) -> StoreResult<PresenceRecord> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .presences
            .iter()
            .any(|r| r.user_id == new.user_id && r.date == new.date)
        {
            return Err(StoreError::Duplicate);
        }

        tables.next_id += 1;
        let record = new.into_record(tables.next_id);
        tables.presences.push(record.clone());
        Ok(record)
    }

    async fn find_by_user_and_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<PresenceRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .presences
            .iter()
            .find(|r| r.user_id == user_id && r.date == date)
            .cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<PresenceRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(Self::sorted(tables.presences.clone()))
    }

    async fn list_by_user(&self, user_id: u64) -> StoreResult<Vec<PresenceRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(Self::sorted(
            tables
                .presences
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn count_by_status(
        &self,
        user_id: u64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> StoreResult<StatusCounts> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .presences
            .iter()
            .filter(|r| r.user_id == user_id && r.date >= from && r.date < until)
            .fold(StatusCounts::default(), |acc, r| acc.with(r.status)))
    }

    async fn rows_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<AnalysisRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .presences
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .filter_map(|r| {
                // inner join: records of unknown users are dropped
                tables.users.get(&r.user_id).map(|u| AnalysisRow {
                    user_id: r.user_id,
                    status: r.status,
                    class: u.class.clone(),
                    position: u.position.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, user_id: u64) -> StoreResult<Option<UserProfile>> {
        Ok(self.tables.lock().unwrap().users.get(&user_id).cloned())
    }
}
