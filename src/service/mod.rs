//! Attendance use cases: recording, history queries and aggregation.
//!
//! Every operation that acts on behalf of someone takes the [`Actor`]
//! explicitly and consults [`policy`](crate::auth::policy) before touching
//! the store.
//!
//! [`Actor`]: crate::auth::actor::Actor

use std::sync::Arc;

use crate::clock::Clock;
use crate::store::{PresenceStore, UserDirectory};

pub mod aggregation;
pub mod history;
pub mod recorder;

pub struct PresenceService {
    store: Arc<dyn PresenceStore>,
    users: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl PresenceService {
    pub fn new(
        store: Arc<dyn PresenceStore>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            users,
            clock,
        }
    }
}
