use crate::{
    error::RuntimeError,
    model::{Node, NodeId, Value},
    runtime::{runtime_for, NodeContext},
};
use melee_trace::World;
use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::{Rc, Weak},
};

/// An exec output pin fired, together with the data outputs that belong to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionEvent {
    pub node: NodeId,
    pub pin: String,
    pub outputs: BTreeMap<String, Value>,
}

impl ExecutionEvent {
    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InterpreterOutput {
    pub events: Vec<ExecutionEvent>,
}

impl InterpreterOutput {
    /// Names of the fired pins, in firing order.
    pub fn fired_pins(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.pin.as_str()).collect()
    }
}

/// Pin firings waiting to be picked up by the interpreter.
#[derive(Debug, Default, Clone)]
pub struct ExecutionQueue {
    events: Rc<RefCell<Vec<ExecutionEvent>>>,
}

impl ExecutionQueue {
    pub fn push(&self, event: ExecutionEvent) {
        self.events.borrow_mut().push(event);
    }

    pub fn drain(&self) -> Vec<ExecutionEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Weak producer end, for callbacks that may outlive the interpreter.
    pub fn sink(&self) -> ExecutionSink {
        ExecutionSink {
            events: Rc::downgrade(&self.events),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionSink {
    events: Weak<RefCell<Vec<ExecutionEvent>>>,
}

impl ExecutionSink {
    /// Returns `false` once the interpreter is gone.
    pub fn push(&self, event: ExecutionEvent) -> bool {
        match self.events.upgrade() {
            Some(events) => {
                events.borrow_mut().push(event);
                true
            }
            None => false,
        }
    }
}

/// Executes nodes and collects the pins they fire, both right away and later on behalf of
/// latent nodes.
#[derive(Debug, Default)]
pub struct Interpreter {
    queue: ExecutionQueue,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `node` with the given linked input values. The output holds everything fired since
    /// the last drain, ending with the node's own immediate outputs.
    pub fn execute_node(
        &mut self,
        world: &World,
        node: &Node,
        inputs: &BTreeMap<String, Value>,
    ) -> Result<InterpreterOutput, RuntimeError> {
        let ctx = NodeContext {
            world,
            node,
            inputs,
            queue: &self.queue,
        };
        runtime_for(node.kind).execute(&ctx)?;
        Ok(self.poll())
    }

    /// Drains pins fired by latent nodes since the last call.
    pub fn poll(&mut self) -> InterpreterOutput {
        InterpreterOutput {
            events: self.queue.drain(),
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired(pin: &str) -> ExecutionEvent {
        ExecutionEvent {
            node: NodeId(7),
            pin: pin.to_string(),
            outputs: BTreeMap::new(),
        }
    }

    #[test]
    fn sink_goes_quiet_once_the_queue_is_dropped() {
        let queue = ExecutionQueue::default();
        let sink = queue.sink();

        assert!(sink.push(fired("OnStarted")));
        assert_eq!(queue.drain(), vec![fired("OnStarted")]);
        assert!(queue.is_empty());

        drop(queue);
        assert!(!sink.push(fired("OnHit")));
    }

    #[test]
    fn poll_drains_in_firing_order() {
        let mut interpreter = Interpreter::new();
        let sink = interpreter.queue.sink();
        sink.push(fired("OnStarted"));
        sink.push(fired("OnEnded"));
        assert!(interpreter.has_pending());

        assert_eq!(interpreter.poll().fired_pins(), vec!["OnStarted", "OnEnded"]);
        assert!(!interpreter.has_pending());
    }
}
