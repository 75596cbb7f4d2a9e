//! Runtime execution for built-in nodes.

mod cancel_async_action;
mod wait_for_melee_trace_event;

pub use cancel_async_action::*;
pub use wait_for_melee_trace_event::*;

use crate::{
    error::RuntimeError,
    interpret::{ExecutionEvent, ExecutionQueue},
    model::{DataType, Node, NodeKind, PinDirection, Value},
};
use melee_trace::{ActionId, Actor, Handle, World};
use std::collections::BTreeMap;

pub struct NodeContext<'a> {
    pub world: &'a World,
    pub node: &'a Node,
    /// Values arriving over links, keyed by input pin name.
    pub inputs: &'a BTreeMap<String, Value>,
    pub queue: &'a ExecutionQueue,
}

impl NodeContext<'_> {
    /// Linked input first, then the node property of the same name. `Unit` counts as unset.
    fn read<T>(
        &self,
        name: &str,
        expected: DataType,
        extract: fn(&Value) -> Option<T>,
    ) -> Result<Option<T>, RuntimeError> {
        let value = self
            .inputs
            .get(name)
            .or_else(|| self.node.properties.get(name))
            .filter(|v| **v != Value::Unit);

        let Some(value) = value else {
            return Ok(None);
        };
        extract(value).map(Some).ok_or_else(|| RuntimeError::TypeMismatch {
            node: self.node.id,
            pin: name.to_string(),
            expected,
            found: value.data_type(),
        })
    }

    pub fn read_bool(&self, name: &str) -> Result<Option<bool>, RuntimeError> {
        self.read(name, DataType::Bool, |v| match v {
            Value::Bool(b) => Some(*b),
            _ => None,
        })
    }

    pub fn read_actor(&self, name: &str) -> Result<Option<Handle<Actor>>, RuntimeError> {
        self.read(name, DataType::Actor, |v| match v {
            Value::Actor(handle) => Some(*handle),
            _ => None,
        })
    }

    pub fn read_async_action(&self, name: &str) -> Result<Option<ActionId>, RuntimeError> {
        self.read(name, DataType::AsyncAction, |v| match v {
            Value::AsyncAction(id) => Some(*id),
            _ => None,
        })
    }

    /// Fires one of the node's exec outputs right away.
    pub fn fire(
        &self,
        pin: &str,
        outputs: BTreeMap<String, Value>,
    ) -> Result<(), RuntimeError> {
        let is_exec_out = self.node.pin_named(pin).is_some_and(|p| {
            p.direction == PinDirection::Output && p.data_type == DataType::Exec
        });
        if !is_exec_out {
            return Err(RuntimeError::UnknownPin {
                node: self.node.id,
                pin: pin.to_string(),
            });
        }

        self.queue.push(ExecutionEvent {
            node: self.node.id,
            pin: pin.to_string(),
            outputs,
        });
        Ok(())
    }
}

pub trait NodeRuntime: Send + Sync {
    /// Execute a node. Immediate exec outputs go through [`NodeContext::fire`].
    fn execute(&self, ctx: &NodeContext<'_>) -> Result<(), RuntimeError>;
}

static WAIT_FOR_MELEE_TRACE_EVENT: WaitForMeleeTraceEventRuntime = WaitForMeleeTraceEventRuntime;
static CANCEL_ASYNC_ACTION: CancelAsyncActionRuntime = CancelAsyncActionRuntime;

pub fn runtime_for(kind: NodeKind) -> &'static dyn NodeRuntime {
    match kind {
        NodeKind::WaitForMeleeTraceEvent => &WAIT_FOR_MELEE_TRACE_EVENT,
        NodeKind::CancelAsyncAction => &CANCEL_ASYNC_ACTION,
    }
}
