use crate::component::MeleeTraceInstanceHandle;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("actor does not exist")]
    ActorNotFound,

    #[error("actor already has a MeleeTraceComponent attached")]
    ComponentAlreadyAttached,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeleeTraceError {
    #[error("trace {0:?} is not running on this component")]
    UnknownTrace(MeleeTraceInstanceHandle),
}

/// Reasons the watch factory refuses to create an action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaitForMeleeTraceEventError {
    #[error("Invalid reference for actor to watch passed as parameter")]
    InvalidActorToWatch,

    #[error("Actor to watch doesn't have MeleeTraceComponent attached")]
    MissingMeleeTraceComponent,
}
