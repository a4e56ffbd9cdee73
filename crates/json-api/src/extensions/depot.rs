//! Depot helper extensions.

use std::any::Any;

use fulfilment_app::identity::Actor;
use salvo::prelude::{Depot, StatusError};

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_actor(&mut self, actor: Actor);

    fn actor_or_401(&self) -> Result<Actor, StatusError>;

    /// The current actor, if they are a manager or admin.
    fn staff_or_403(&self) -> Result<Actor, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_actor(&mut self, actor: Actor) {
        self.inject(actor);
    }

    fn actor_or_401(&self) -> Result<Actor, StatusError> {
        self.obtain::<Actor>()
            .copied()
            .map_err(|_ignored| StatusError::unauthorized().brief("Missing user identity"))
    }

    fn staff_or_403(&self) -> Result<Actor, StatusError> {
        let actor = self.actor_or_401()?;

        if !actor.role.is_staff() {
            return Err(StatusError::forbidden().brief("Staff role required"));
        }

        Ok(actor)
    }
}
