//! The execution environment: actors, their components and the game instance.

use crate::{
    action::{ActionId, AsyncAction},
    component::MeleeTraceComponent,
    error::WorldError,
    pool::{Handle, Pool},
    LOG_TARGET,
};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fmt,
    rc::Rc,
};

#[derive(Debug, Clone)]
pub struct Actor {
    name: String,
    melee_trace: Handle<MeleeTraceComponent>,
}

impl Actor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle of the attached melee trace component, [`Handle::NONE`] if there is none.
    pub fn melee_trace_component(&self) -> Handle<MeleeTraceComponent> {
        self.melee_trace
    }
}

/// Anything that can resolve the world it runs in.
pub trait WorldContext {
    fn world(&self) -> Option<&World>;
}

impl WorldContext for World {
    fn world(&self) -> Option<&World> {
        Some(self)
    }
}

impl<'a> WorldContext for Option<&'a World> {
    fn world(&self) -> Option<&World> {
        *self
    }
}

/// Keeps async actions alive until they finish or the world goes away.
#[derive(Default)]
pub struct GameInstance {
    actions: RefCell<BTreeMap<ActionId, Rc<dyn AsyncAction>>>,
    next_action_id: Cell<u64>,
}

impl fmt::Debug for GameInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameInstance")
            .field("actions", &self.registered_action_count())
            .finish()
    }
}

impl GameInstance {
    pub fn register_action(&self, action: Rc<dyn AsyncAction>) -> ActionId {
        let id = ActionId(self.next_action_id.get() + 1);
        self.next_action_id.set(id.0);
        self.actions.borrow_mut().insert(id, action);
        id
    }

    pub fn unregister_action(&self, id: ActionId) -> Option<Rc<dyn AsyncAction>> {
        self.actions.borrow_mut().remove(&id)
    }

    pub fn action(&self, id: ActionId) -> Option<Rc<dyn AsyncAction>> {
        self.actions.borrow().get(&id).cloned()
    }

    pub fn is_registered(&self, id: ActionId) -> bool {
        self.actions.borrow().contains_key(&id)
    }

    pub fn registered_action_count(&self) -> usize {
        self.actions.borrow().len()
    }

    fn take_actions(&self) -> Vec<Rc<dyn AsyncAction>> {
        std::mem::take(&mut *self.actions.borrow_mut())
            .into_values()
            .collect()
    }
}

#[derive(Default)]
pub struct World {
    actors: Pool<Actor>,
    melee_traces: Pool<MeleeTraceComponent>,
    game_instance: GameInstance,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("actors", &self.actors.alive_count())
            .field("melee_traces", &self.melee_traces.alive_count())
            .field("game_instance", &self.game_instance)
            .finish()
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_actor(&mut self, name: impl Into<String>) -> Handle<Actor> {
        let name = name.into();
        tracing::debug!(target: LOG_TARGET, %name, "spawning actor");
        self.actors.spawn(Actor {
            name,
            melee_trace: Handle::NONE,
        })
    }

    /// Destroys the actor together with its components. Bindings on the component's delegates
    /// are dropped with it.
    pub fn destroy_actor(&mut self, handle: Handle<Actor>) -> bool {
        let Some(actor) = self.actors.free(handle) else {
            return false;
        };
        tracing::debug!(target: LOG_TARGET, name = %actor.name, "destroying actor");
        if actor.melee_trace.is_some() {
            self.melee_traces.free(actor.melee_trace);
        }
        true
    }

    pub fn actor(&self, handle: Handle<Actor>) -> Option<&Actor> {
        self.actors.try_borrow(handle)
    }

    pub fn actors(&self) -> impl Iterator<Item = (Handle<Actor>, &Actor)> {
        self.actors.pair_iter()
    }

    pub fn add_melee_trace_component(
        &mut self,
        actor: Handle<Actor>,
    ) -> Result<Handle<MeleeTraceComponent>, WorldError> {
        let existing = self
            .actors
            .try_borrow(actor)
            .ok_or(WorldError::ActorNotFound)?
            .melee_trace;
        if self.melee_traces.is_valid_handle(existing) {
            return Err(WorldError::ComponentAlreadyAttached);
        }

        let handle = self.melee_traces.spawn(MeleeTraceComponent::new(actor));
        if let Some(component) = self.melee_traces.try_borrow_mut(handle) {
            component.set_handle(handle);
        }
        if let Some(actor) = self.actors.try_borrow_mut(actor) {
            actor.melee_trace = handle;
        }
        Ok(handle)
    }

    pub fn melee_trace_component(
        &self,
        handle: Handle<MeleeTraceComponent>,
    ) -> Option<&MeleeTraceComponent> {
        self.melee_traces.try_borrow(handle)
    }

    /// Looks up the melee trace capability of an actor. Stale actors and stale components both
    /// yield `None`.
    pub fn find_melee_trace_component(
        &self,
        actor: Handle<Actor>,
    ) -> Option<Handle<MeleeTraceComponent>> {
        let handle = self.actor(actor)?.melee_trace;
        self.melee_traces.is_valid_handle(handle).then_some(handle)
    }

    pub fn game_instance(&self) -> &GameInstance {
        &self.game_instance
    }

    /// Cancels every action still registered with the game instance.
    pub fn shutdown(&self) {
        let actions = self.game_instance.take_actions();
        if !actions.is_empty() {
            tracing::debug!(
                target: LOG_TARGET,
                count = actions.len(),
                "cancelling outstanding async actions"
            );
        }
        for action in actions {
            action.cancel(self);
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.shutdown();
    }
}
