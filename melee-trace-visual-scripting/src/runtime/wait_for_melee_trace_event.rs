use crate::{
    error::RuntimeError,
    interpret::{ExecutionEvent, ExecutionSink},
    model::{NodeId, Value},
    runtime::{NodeContext, NodeRuntime},
};
use melee_trace::{
    AsyncAction, AsyncMeleeHitInfo, Handle, MeleeTraceInstanceHandle, WaitForMeleeTraceEvent,
};
use std::collections::BTreeMap;

pub struct WaitForMeleeTraceEventRuntime;

impl NodeRuntime for WaitForMeleeTraceEventRuntime {
    fn execute(&self, ctx: &NodeContext<'_>) -> Result<(), RuntimeError> {
        // An unlinked actor reaches the factory as NONE and is rejected (and logged) there.
        let actor_to_watch = ctx.read_actor("actor_to_watch")?.unwrap_or(Handle::NONE);
        let once_per_multi_trace = ctx.read_bool("once_per_multi_trace")?.unwrap_or(false);

        let async_action = match WaitForMeleeTraceEvent::wait_for_melee_trace_event_hit(
            ctx.world,
            actor_to_watch,
            once_per_multi_trace,
        ) {
            Some(action) => {
                bind_outputs(&action, ctx.node.id, ctx.queue.sink());
                action.activate(ctx.world);
                action
                    .action_id()
                    .map(Value::AsyncAction)
                    .unwrap_or(Value::Unit)
            }
            None => Value::Unit,
        };

        ctx.fire(
            "then",
            BTreeMap::from([("async_action".to_string(), async_action)]),
        )
    }
}

fn bind_outputs(action: &WaitForMeleeTraceEvent, node: NodeId, sink: ExecutionSink) {
    {
        let sink = sink.clone();
        action.on_hit().add(move |(info, trace)| {
            sink.push(ExecutionEvent {
                node,
                pin: "OnHit".to_string(),
                outputs: hit_outputs(info, *trace),
            });
        });
    }
    {
        let sink = sink.clone();
        action.on_started().add(move |_| {
            sink.push(ExecutionEvent {
                node,
                pin: "OnStarted".to_string(),
                outputs: BTreeMap::new(),
            });
        });
    }
    action.on_ended().add(move |_| {
        sink.push(ExecutionEvent {
            node,
            pin: "OnEnded".to_string(),
            outputs: BTreeMap::new(),
        });
    });
}

fn hit_outputs(
    info: &AsyncMeleeHitInfo,
    trace: MeleeTraceInstanceHandle,
) -> BTreeMap<String, Value> {
    BTreeMap::from([
        (
            "owner_trace_component".to_string(),
            Value::MeleeTraceComponent(info.owner_trace_component),
        ),
        ("hit_actor".to_string(), Value::Actor(info.hit_actor)),
        ("hit_location".to_string(), Value::Vec3(info.hit_location)),
        ("hit_normal".to_string(), Value::Vec3(info.hit_normal)),
        (
            "hit_bone_name".to_string(),
            Value::String(info.hit_bone_name.clone()),
        ),
        ("trace_handle".to_string(), Value::TraceHandle(trace)),
    ])
}
