use tracing::{debug, instrument};

use super::PresenceService;
use crate::auth::{actor::Actor, policy};
use crate::error::{AppError, AppResult};
use crate::model::presence::PresenceRecord;

impl PresenceService {
    /// Admins see everything, or one user's records when `target_user_id`
    /// is given. Everyone else sees only their own records.
    ///
    /// An empty list means "no records", never "not allowed".
    #[instrument(skip(self, actor), fields(actor_id = actor.user_id))]
    pub async fn history(
        &self,
        actor: &Actor,
        target_user_id: Option<u64>,
    ) -> AppResult<Vec<PresenceRecord>> {
        let records = match target_user_id {
            None if actor.is_admin() => self.store.list_all().await?,
            target => {
                let target = target.unwrap_or(actor.user_id);
                policy::ensure_can_view_history_of(actor, target)?;
                self.store.list_by_user(target).await?
            }
        };

        debug!(count = records.len(), "History fetched");
        Ok(records)
    }

    /// Admin-only lookup of one user's records. An empty result is `NotFound`.
    #[instrument(skip(self, actor), fields(actor_id = actor.user_id))]
    pub async fn history_by_user_id(
        &self,
        actor: &Actor,
        target_user_id: u64,
    ) -> AppResult<Vec<PresenceRecord>> {
        policy::ensure_can_administer(actor)?;

        let records = self.store.list_by_user(target_user_id).await?;
        if records.is_empty() {
            return Err(AppError::NotFound(format!(
                "no attendance history for user {target_user_id}"
            )));
        }
        Ok(records)
    }
}
