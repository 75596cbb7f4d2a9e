//! Async actions: objects that are created by a graph node, outlive the node's execution and
//! report back later through their own output delegates.

use crate::world::World;
use serde::{Deserialize, Serialize};
use std::{cell::Cell, rc::Rc};

/// Key of an action registered with the [`GameInstance`](crate::GameInstance).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ActionId(pub u64);

pub trait AsyncAction {
    /// Starts listening. Called exactly once, after the factory succeeded.
    fn activate(&self, world: &World);

    /// Stops listening and releases the registration. Must be safe to call repeatedly, before
    /// activation, and from world teardown.
    fn cancel(&self, world: &World);
}

/// Shared behaviour of every async action: its registration with the game instance.
#[derive(Debug, Default)]
pub struct AsyncActionBase {
    registration: Cell<Option<ActionId>>,
}

impl AsyncActionBase {
    pub fn register_with_game_instance(&self, world: &World, action: Rc<dyn AsyncAction>) {
        if let Some(previous) = self.registration.take() {
            world.game_instance().unregister_action(previous);
        }
        let id = world.game_instance().register_action(action);
        self.registration.set(Some(id));
    }

    /// Drops the game instance's reference to the action.
    pub fn set_ready_to_destroy(&self, world: &World) {
        if let Some(id) = self.registration.take() {
            world.game_instance().unregister_action(id);
        }
    }

    /// Default cancellation.
    pub fn cancel(&self, world: &World) {
        self.set_ready_to_destroy(world);
    }

    pub fn action_id(&self) -> Option<ActionId> {
        self.registration.get()
    }

    pub fn is_registered(&self) -> bool {
        self.registration.get().is_some()
    }
}
