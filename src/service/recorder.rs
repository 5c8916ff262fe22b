use chrono::NaiveDate;
use tracing::{info, instrument};

use super::PresenceService;
use crate::auth::{actor::Actor, policy};
use crate::error::{AppError, AppResult};
use crate::model::presence::{NewPresence, PresenceRecord, PresenceStatus};

impl PresenceService {
    /// Records today's (or a future day's) status for the actor or, for
    /// admins, for the named user.
    #[instrument(skip(self, actor), fields(actor_id = actor.user_id))]
    pub async fn record(
        &self,
        actor: &Actor,
        requested_user_id: Option<u64>,
        status: PresenceStatus,
        date: Option<NaiveDate>,
    ) -> AppResult<PresenceRecord> {
        let now = self.clock.now();
        let today = now.date();

        let date = match date {
            Some(d) if d < today => {
                return Err(AppError::InvalidInput(format!(
                    "date {d} is in the past; attendance cannot be recorded retroactively"
                )));
            }
            Some(d) => d,
            None => today,
        };

        let user_id = self.resolve_record_target(actor, requested_user_id).await?;

        if self
            .store
            .find_by_user_and_date(user_id, date)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "attendance already recorded for this date".into(),
            ));
        }

        // A concurrent submission that slipped past the lookup is rejected
        // by the store's uniqueness constraint and surfaces as Conflict too.
        let record = self
            .store
            .insert(NewPresence {
                user_id,
                date,
                time: now.time(),
                status,
            })
            .await?;

        info!(record_id = record.id, user_id, %date, %status, "Attendance recorded");
        Ok(record)
    }

    async fn resolve_record_target(
        &self,
        actor: &Actor,
        requested_user_id: Option<u64>,
    ) -> AppResult<u64> {
        // Non-admins are not looked up; an id with no `users` row fails the
        // foreign key on insert and surfaces as an internal error.
        if !actor.is_admin() {
            let target = requested_user_id.unwrap_or(actor.user_id);
            policy::ensure_can_record_for(actor, target)?;
            return Ok(target);
        }

        let target = requested_user_id.ok_or_else(|| {
            AppError::InvalidInput("user_id is required when an admin records attendance".into())
        })?;
        policy::ensure_can_record_for(actor, target)?;

        if self.users.find_user(target).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "user {target} does not exist"
            )));
        }
        Ok(target)
    }
}
