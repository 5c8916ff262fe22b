//! Who may record for, and read the history of, whom.
//!
//! Pure functions of the actor and the target id. Admins may act on anyone,
//! students only on themselves, and any other role on no one.

use crate::auth::actor::Actor;
use crate::error::{AppError, AppResult};
use crate::model::role::Role;

pub fn can_record_for(actor: &Actor, target_user_id: u64) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Student => actor.user_id == target_user_id,
        Role::Unrecognized(_) => false,
    }
}

pub fn can_view_history_of(actor: &Actor, target_user_id: u64) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Student => actor.user_id == target_user_id,
        Role::Unrecognized(_) => false,
    }
}

pub fn can_administer(actor: &Actor) -> bool {
    actor.role == Role::Admin
}

fn ensure_recognized(actor: &Actor) -> AppResult<()> {
    match actor.role {
        Role::Unrecognized(_) => Err(AppError::Forbidden("role not recognized".into())),
        _ => Ok(()),
    }
}

pub fn ensure_can_record_for(actor: &Actor, target_user_id: u64) -> AppResult<()> {
    ensure_recognized(actor)?;
    if can_record_for(actor, target_user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "cannot record attendance for another user".into(),
        ))
    }
}

pub fn ensure_can_view_history_of(actor: &Actor, target_user_id: u64) -> AppResult<()> {
    ensure_recognized(actor)?;
    if can_view_history_of(actor, target_user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "cannot view the attendance history of another user".into(),
        ))
    }
}

pub fn ensure_can_administer(actor: &Actor) -> AppResult<()> {
    ensure_recognized(actor)?;
    if can_administer(actor) {
        Ok(())
    } else {
        Err(AppError::Forbidden("admin only".into()))
    }
}
