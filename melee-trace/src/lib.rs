#![forbid(unsafe_code)]

//! Melee trace notifications for scripting.
//!
//! A [`MeleeTraceComponent`] attached to an actor announces the start, the hits and the end of
//! every melee trace it runs. [`WaitForMeleeTraceEvent`] is the async action that scripts use to
//! listen to those notifications without holding on to the actor.

pub mod action;
pub mod component;
pub mod delegate;
pub mod error;
pub mod pool;
pub mod wait_for_event;
pub mod world;

pub use crate::{
    action::{ActionId, AsyncAction, AsyncActionBase},
    component::{
        MeleeHitResult, MeleeTraceComponent, MeleeTraceInstanceHandle, TraceEnded, TraceHit,
        TraceStarted,
    },
    delegate::{DelegateHandle, MulticastDelegate},
    error::{MeleeTraceError, WaitForMeleeTraceEventError, WorldError},
    pool::{Handle, Pool},
    wait_for_event::{AsyncMeleeHitInfo, HitEvent, HitGate, WaitForMeleeTraceEvent, WatchRequest},
    world::{Actor, GameInstance, World, WorldContext},
};

pub use glam;

/// `tracing` target of everything this crate logs.
pub const LOG_TARGET: &str = "melee_trace";
