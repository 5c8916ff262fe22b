use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

use super::{AnalysisRow, PresenceStore, StoreError, StoreResult, UserDirectory};
use crate::model::presence::{NewPresence, PresenceRecord, PresenceStatus, StatusCounts};
use crate::model::user::UserProfile;

const RECORD_COLUMNS: &str = "id, user_id, `date`, `time`, status";

#[derive(FromRow)]
struct PresenceRow {
    id: u64,
    user_id: u64,
    date: NaiveDate,
    time: NaiveTime,
    status: String,
}

impl TryFrom<PresenceRow> for PresenceRecord {
    type Error = StoreError;

    fn try_from(row: PresenceRow) -> Result<Self, Self::Error> {
        Ok(PresenceRecord {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            time: row.time,
            status: parse_status(&row.status)?,
        })
    }
}

#[derive(FromRow)]
struct CountsRow {
    present: i64,
    excused: i64,
    sick: i64,
    absent: i64,
}

#[derive(FromRow)]
struct JoinedRow {
    user_id: u64,
    status: String,
    class: Option<String>,
    position: Option<String>,
}

fn parse_status(raw: &str) -> StoreResult<PresenceStatus> {
    PresenceStatus::from_str(raw).map_err(|_| StoreError::Corrupt(format!("unknown status '{raw}'")))
}

fn into_records(rows: Vec<PresenceRow>) -> StoreResult<Vec<PresenceRecord>> {
    rows.into_iter().map(PresenceRecord::try_from).collect()
}

/// `presences` / `users` tables on MySQL. See `db/schema.sql`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PresenceStore for MySqlStore {
    async fn insert(&self, new: NewPresence) -> StoreResult<PresenceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO presences (user_id, `date`, `time`, status)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.date)
        .bind(new.time)
        .bind(new.status.as_ref())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(new.into_record(done.last_insert_id())),
            Err(e) => {
                // SQLSTATE 23000 also covers FK and CHECK failures; only
                // UNIQUE KEY (user_id, date) means "already recorded".
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        debug!(user_id = new.user_id, date = %new.date, "Duplicate presence rejected");
                        return Err(StoreError::Duplicate);
                    }
                }
                Err(e.into())
            }
        }
    }

    async fn find_by_user_and_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<PresenceRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM presences WHERE user_id = ? AND `date` = ?");

        sqlx::query_as::<_, PresenceRow>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?
            .map(PresenceRecord::try_from)
            .transpose()
    }

    async fn list_all(&self) -> StoreResult<Vec<PresenceRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM presences ORDER BY `date`, id");

        let rows = sqlx::query_as::<_, PresenceRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    async fn list_by_user(&self, user_id: u64) -> StoreResult<Vec<PresenceRecord>> {
        let sql =
            format!("SELECT {RECORD_COLUMNS} FROM presences WHERE user_id = ? ORDER BY `date`, id");

        let rows = sqlx::query_as::<_, PresenceRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    async fn count_by_status(
        &self,
        user_id: u64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> StoreResult<StatusCounts> {
        // COUNT yields BIGINT; SUM(CASE ...) would come back as DECIMAL.
        let row = sqlx::query_as::<_, CountsRow>(
            r#"
            SELECT
                COUNT(CASE WHEN status = 'present' THEN 1 END) AS present,
                COUNT(CASE WHEN status = 'excused' THEN 1 END) AS excused,
                COUNT(CASE WHEN status = 'sick' THEN 1 END) AS sick,
                COUNT(CASE WHEN status = 'absent' THEN 1 END) AS absent
            FROM presences
            WHERE user_id = ?
            AND `date` >= ?
            AND `date` < ?
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;

        let count = |n: i64| u64::try_from(n).unwrap_or_default();
        Ok(StatusCounts {
            present: count(row.present),
            excused: count(row.excused),
            sick: count(row.sick),
            absent: count(row.absent),
        })
    }

    async fn rows_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<AnalysisRow>> {
        let rows = sqlx::query_as::<_, JoinedRow>(
            r#"
            SELECT p.user_id, p.status, u.`class`, u.`position`
            FROM presences p
            JOIN users u ON u.id = p.user_id
            WHERE p.`date` BETWEEN ? AND ?
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(AnalysisRow {
                    user_id: row.user_id,
                    status: parse_status(&row.status)?,
                    class: row.class,
                    position: row.position,
                })
            })
            .collect()
    }
}

#[async_trait]
impl UserDirectory for MySqlStore {
    async fn find_user(&self, user_id: u64) -> StoreResult<Option<UserProfile>> {
        Ok(sqlx::query_as::<_, UserProfile>(
            "SELECT id, role_id, `class`, `position` FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
