//! Persistence seams for presence records and the user directory.
//!
//! Both traits are object safe so the HTTP layer can hold them behind
//! `Arc<dyn ...>` and tests can swap in the in-memory store.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::presence::{NewPresence, PresenceRecord, PresenceStatus, StatusCounts};
use crate::model::user::UserProfile;

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The `(user_id, date)` uniqueness constraint rejected an insert.
    #[error("a record already exists for this user and date")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back into the domain model.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// A presence record joined with the grouping attributes of its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRow {
    pub user_id: u64,
    pub status: PresenceStatus,
    pub class: Option<String>,
    pub position: Option<String>,
}

#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Inserts a record. Implementations enforce uniqueness of
    /// `(user_id, date)` atomically and return [`StoreError::Duplicate`]
    /// on violation.
    async fn insert(&self, new: NewPresence) -> StoreResult<PresenceRecord>;

    async fn find_by_user_and_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<PresenceRecord>>;

    /// All records, ordered by date then id.
    async fn list_all(&self) -> StoreResult<Vec<PresenceRecord>>;

    /// All records of one user, ordered by date then id.
    async fn list_by_user(&self, user_id: u64) -> StoreResult<Vec<PresenceRecord>>;

    /// Per-status counts for one user over `[from, until)`.
    async fn count_by_status(
        &self,
        user_id: u64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> StoreResult<StatusCounts>;

    /// Records dated within `[start, end]` joined with user attributes.
    async fn rows_between(&self, start: NaiveDate, end: NaiveDate)
        -> StoreResult<Vec<AnalysisRow>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: u64) -> StoreResult<Option<UserProfile>>;
}
