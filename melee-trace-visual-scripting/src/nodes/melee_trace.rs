//! Melee trace nodes.

use super::{NodeCategory, NodeDefinition, PinDef, PropertyDef};
use crate::model::{DataType, Value};

/// Wait For Melee Trace Event - latent node forwarding the trace notifications of an actor.
pub struct WaitForMeleeTraceEventNode;

impl NodeDefinition for WaitForMeleeTraceEventNode {
    fn kind_name(&self) -> &'static str {
        "WaitForMeleeTraceEvent"
    }

    fn display_name(&self) -> &'static str {
        "Wait For Melee Trace Event"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Latent
    }

    fn description(&self) -> &'static str {
        "Fires OnStarted, OnHit and OnEnded whenever the watched actor's melee trace \
         starts, connects or ends. With 'Once Per Multi Trace' only the first hit of \
         each trace fires OnHit."
    }

    fn pins(&self) -> Vec<PinDef> {
        vec![
            PinDef::exec_in("exec"),
            PinDef::input("actor_to_watch", DataType::Actor),
            PinDef::input("once_per_multi_trace", DataType::Bool),
            PinDef::exec_out("then"),
            PinDef::output("async_action", DataType::AsyncAction),
            PinDef::exec_out("OnHit"),
            PinDef::exec_out("OnStarted"),
            PinDef::exec_out("OnEnded"),
            // OnHit payload.
            PinDef::output("owner_trace_component", DataType::MeleeTraceComponent),
            PinDef::output("hit_actor", DataType::Actor),
            PinDef::output("hit_location", DataType::Vec3),
            PinDef::output("hit_normal", DataType::Vec3),
            PinDef::output("hit_bone_name", DataType::String),
            PinDef::output("trace_handle", DataType::TraceHandle),
        ]
    }

    fn properties(&self) -> Vec<PropertyDef> {
        vec![PropertyDef::new("once_per_multi_trace", Value::Bool(false))]
    }

    fn is_latent(&self) -> bool {
        true
    }
}
