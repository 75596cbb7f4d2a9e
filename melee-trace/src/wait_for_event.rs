//! Async action that watches an actor's melee trace component and re-broadcasts its
//! notifications to whoever armed the watch (usually a visual script).

use crate::{
    action::{ActionId, AsyncAction, AsyncActionBase},
    component::{MeleeTraceComponent, MeleeTraceInstanceHandle, TraceEnded, TraceHit, TraceStarted},
    delegate::{DelegateHandle, MulticastDelegate},
    error::WaitForMeleeTraceEventError,
    pool::Handle,
    world::{Actor, World, WorldContext},
    LOG_TARGET,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::{
    cell::Cell,
    rc::{Rc, Weak},
};

/// Payload of the `OnHit` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncMeleeHitInfo {
    pub owner_trace_component: Handle<MeleeTraceComponent>,
    pub hit_actor: Handle<Actor>,
    pub hit_location: Vec3,
    pub hit_normal: Vec3,
    pub hit_bone_name: String,
}

/// Parameters the watch was armed with. Fixed for the lifetime of the action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRequest {
    pub actor_to_watch: Handle<Actor>,
    pub once_per_multi_trace: bool,
}

/// Whether the next hit of the running trace may be forwarded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitGate {
    Armed,
    #[default]
    Spent,
}

pub type HitEvent = (AsyncMeleeHitInfo, MeleeTraceInstanceHandle);

// State reachable from the component's delegates. Bindings hold it weakly.
#[derive(Debug, Default)]
struct WatchState {
    once_per_multi_trace: bool,
    gate: Cell<HitGate>,
    on_hit: MulticastDelegate<HitEvent>,
    on_started: MulticastDelegate<()>,
    on_ended: MulticastDelegate<()>,
}

impl WatchState {
    fn handle_trace_hit(&self, hit: &TraceHit) {
        if self.gate.get() == HitGate::Spent {
            return;
        }

        let info = AsyncMeleeHitInfo {
            owner_trace_component: hit.component,
            hit_actor: hit.hit_actor,
            hit_location: hit.hit_location,
            hit_normal: hit.hit_normal,
            hit_bone_name: hit.hit_bone_name.clone(),
        };
        tracing::trace!(
            target: LOG_TARGET,
            trace = hit.trace.id(),
            bone = %info.hit_bone_name,
            "forwarding melee hit"
        );
        self.on_hit.broadcast(&(info, hit.trace));

        // A listener may have re-armed or spent the gate while the hit was broadcast.
        if self.gate.get() == HitGate::Armed && self.once_per_multi_trace {
            self.gate.set(HitGate::Spent);
        }
    }

    fn handle_trace_started(&self, _started: &TraceStarted) {
        self.gate.set(HitGate::Armed);
        self.on_started.broadcast(&());
    }

    fn handle_trace_ended(&self, _ended: &TraceEnded) {
        // The hit count is not part of the output.
        self.on_ended.broadcast(&());
    }
}

#[derive(Debug, Copy, Clone)]
struct Subscriptions {
    hit: DelegateHandle,
    start: DelegateHandle,
    end: DelegateHandle,
}

/// Waits for hit, start and end notifications of an actor's [`MeleeTraceComponent`].
///
/// Lifecycle: created by [`WaitForMeleeTraceEvent::wait_for_melee_trace_event_hit`] (which also
/// registers it with the game instance), activated once, then torn down by
/// [`AsyncAction::cancel`] or by world shutdown.
///
/// With `once_per_multi_trace` set, at most one hit is forwarded between two trace starts;
/// otherwise every hit is forwarded.
#[derive(Debug)]
pub struct WaitForMeleeTraceEvent {
    base: AsyncActionBase,
    request: WatchRequest,
    state: Rc<WatchState>,
    actor_to_watch: Cell<Handle<Actor>>,
    melee_trace_component: Cell<Handle<MeleeTraceComponent>>,
    subscriptions: Cell<Option<Subscriptions>>,
}

impl WaitForMeleeTraceEvent {
    /// Graph-facing factory. Returns `None` when the watch cannot be armed: silently when the
    /// context has no world, with an error log otherwise.
    pub fn wait_for_melee_trace_event_hit(
        context: &dyn WorldContext,
        actor_to_watch: Handle<Actor>,
        once_per_multi_trace: bool,
    ) -> Option<Rc<Self>> {
        let world = context.world()?;

        match Self::try_new(world, actor_to_watch, once_per_multi_trace) {
            Ok(action) => Some(action),
            Err(err) => {
                tracing::error!(
                    target: LOG_TARGET,
                    "WaitForMeleeTraceEvent::wait_for_melee_trace_event_hit: {err}"
                );
                None
            }
        }
    }

    pub fn try_new(
        world: &World,
        actor_to_watch: Handle<Actor>,
        once_per_multi_trace: bool,
    ) -> Result<Rc<Self>, WaitForMeleeTraceEventError> {
        if world.actor(actor_to_watch).is_none() {
            return Err(WaitForMeleeTraceEventError::InvalidActorToWatch);
        }

        let melee_trace_component = world
            .find_melee_trace_component(actor_to_watch)
            .ok_or(WaitForMeleeTraceEventError::MissingMeleeTraceComponent)?;

        let action = Rc::new(Self {
            base: AsyncActionBase::default(),
            request: WatchRequest {
                actor_to_watch,
                once_per_multi_trace,
            },
            state: Rc::new(WatchState {
                once_per_multi_trace,
                ..Default::default()
            }),
            actor_to_watch: Cell::new(actor_to_watch),
            melee_trace_component: Cell::new(melee_trace_component),
            subscriptions: Cell::new(None),
        });
        action
            .base
            .register_with_game_instance(world, action.clone());

        tracing::debug!(
            target: LOG_TARGET,
            actor = ?actor_to_watch,
            component = ?melee_trace_component,
            once_per_multi_trace,
            "melee trace watch created"
        );
        Ok(action)
    }

    pub fn request(&self) -> WatchRequest {
        self.request
    }

    pub fn once_per_multi_trace(&self) -> bool {
        self.request.once_per_multi_trace
    }

    pub fn gate(&self) -> HitGate {
        self.state.gate.get()
    }

    /// Watched actor; [`Handle::NONE`] once cancelled.
    pub fn actor_to_watch(&self) -> Handle<Actor> {
        self.actor_to_watch.get()
    }

    /// Watched component; [`Handle::NONE`] once cancelled.
    pub fn melee_trace_component(&self) -> Handle<MeleeTraceComponent> {
        self.melee_trace_component.get()
    }

    pub fn is_active(&self) -> bool {
        self.subscriptions.get().is_some()
    }

    pub fn action_id(&self) -> Option<ActionId> {
        self.base.action_id()
    }

    pub fn is_registered(&self) -> bool {
        self.base.is_registered()
    }

    pub fn on_hit(&self) -> &MulticastDelegate<HitEvent> {
        &self.state.on_hit
    }

    pub fn on_started(&self) -> &MulticastDelegate<()> {
        &self.state.on_started
    }

    pub fn on_ended(&self) -> &MulticastDelegate<()> {
        &self.state.on_ended
    }

    fn bind<A: 'static>(
        &self,
        delegate: &MulticastDelegate<A>,
        handler: fn(&WatchState, &A),
    ) -> DelegateHandle {
        let state: Weak<WatchState> = Rc::downgrade(&self.state);
        delegate.add(move |args| {
            if let Some(state) = state.upgrade() {
                handler(&state, args);
            }
        })
    }
}

impl AsyncAction for WaitForMeleeTraceEvent {
    fn activate(&self, world: &World) {
        if self.is_active() {
            tracing::warn!(
                target: LOG_TARGET,
                "WaitForMeleeTraceEvent::activate: already active, ignoring"
            );
            return;
        }

        let Some(component) = world.melee_trace_component(self.melee_trace_component.get())
        else {
            tracing::warn!(
                target: LOG_TARGET,
                "WaitForMeleeTraceEvent::activate: watched MeleeTraceComponent is gone"
            );
            return;
        };

        self.subscriptions.set(Some(Subscriptions {
            hit: self.bind(component.on_trace_hit(), WatchState::handle_trace_hit),
            start: self.bind(component.on_trace_start(), WatchState::handle_trace_started),
            end: self.bind(component.on_trace_end(), WatchState::handle_trace_ended),
        }));
    }

    fn cancel(&self, world: &World) {
        let subscriptions = self.subscriptions.take();
        if let (Some(component), Some(subscriptions)) = (
            world.melee_trace_component(self.melee_trace_component.get()),
            subscriptions,
        ) {
            component.on_trace_hit().remove(subscriptions.hit);
            component.on_trace_start().remove(subscriptions.start);
            component.on_trace_end().remove(subscriptions.end);
        }

        self.actor_to_watch.set(Handle::NONE);
        self.melee_trace_component.set(Handle::NONE);

        self.base.cancel(world);
    }
}
