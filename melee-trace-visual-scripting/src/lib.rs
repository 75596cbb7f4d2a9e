#![forbid(unsafe_code)]

pub mod error;
pub mod interpret;
pub mod model;
pub mod nodes;
pub mod runtime;

pub use crate::{
    error::RuntimeError,
    interpret::{ExecutionEvent, ExecutionQueue, ExecutionSink, Interpreter, InterpreterOutput},
    model::{DataType, Node, NodeId, NodeKind, Pin, PinDirection, PinId, Value},
    nodes::{all_node_definitions, get_node_definition, NodeCategory, NodeDefinition},
};

/// `tracing` target of everything this crate logs.
pub const LOG_TARGET: &str = "melee_trace_visual_scripting";

#[cfg(test)]
mod tests {
    use super::*;
    use melee_trace::{
        glam::Vec3, Actor, Handle, MeleeHitResult, MeleeTraceComponent, World,
    };
    use std::collections::BTreeMap;

    struct Arena {
        world: World,
        knight: Handle<Actor>,
        dummy: Handle<Actor>,
        sword: Handle<MeleeTraceComponent>,
    }

    fn arena() -> Arena {
        let mut world = World::new();
        let knight = world.spawn_actor("Knight");
        let dummy = world.spawn_actor("Dummy");
        let sword = world.add_melee_trace_component(knight).unwrap();
        Arena {
            world,
            knight,
            dummy,
            sword,
        }
    }

    fn wait_node(once: bool) -> Node {
        let mut node = Node::new(NodeId(1), NodeKind::WaitForMeleeTraceEvent);
        node.set_property_bool("once_per_multi_trace", once);
        node
    }

    fn watch(actor: Handle<Actor>) -> BTreeMap<String, Value> {
        BTreeMap::from([("actor_to_watch".to_string(), Value::Actor(actor))])
    }

    fn swing(arena: &Arena, bones: &[&str]) {
        let sword = arena.world.melee_trace_component(arena.sword).unwrap();
        let trace = sword.start_trace();
        for bone in bones {
            sword
                .report_hit(
                    trace,
                    MeleeHitResult {
                        hit_actor: arena.dummy,
                        location: Vec3::new(0.0, 1.0, 0.0),
                        normal: Vec3::X,
                        bone_name: bone.to_string(),
                    },
                )
                .unwrap();
        }
        sword.end_trace(trace).unwrap();
    }

    #[test]
    fn wait_node_fires_then_with_async_action() {
        let arena = arena();
        let mut interpreter = Interpreter::new();

        let out = interpreter
            .execute_node(&arena.world, &wait_node(false), &watch(arena.knight))
            .unwrap();

        assert_eq!(out.fired_pins(), vec!["then"]);
        assert!(matches!(
            out.events[0].output("async_action"),
            Some(Value::AsyncAction(_))
        ));
        assert_eq!(arena.world.game_instance().registered_action_count(), 1);
    }

    #[test]
    fn latent_outputs_follow_the_trace() {
        let arena = arena();
        let mut interpreter = Interpreter::new();
        interpreter
            .execute_node(&arena.world, &wait_node(false), &watch(arena.knight))
            .unwrap();

        swing(&arena, &["head", "spine"]);

        let out = interpreter.poll();
        assert_eq!(
            out.fired_pins(),
            vec!["OnStarted", "OnHit", "OnHit", "OnEnded"]
        );
        let hit = &out.events[1];
        assert_eq!(hit.node, NodeId(1));
        assert_eq!(
            hit.output("hit_bone_name"),
            Some(&Value::String("head".to_string()))
        );
        assert_eq!(hit.output("hit_actor"), Some(&Value::Actor(arena.dummy)));
        assert_eq!(
            hit.output("owner_trace_component"),
            Some(&Value::MeleeTraceComponent(arena.sword))
        );
        assert_eq!(
            hit.output("hit_location"),
            Some(&Value::Vec3(Vec3::new(0.0, 1.0, 0.0)))
        );
        assert!(matches!(
            hit.output("trace_handle"),
            Some(Value::TraceHandle(_))
        ));
        assert!(!interpreter.has_pending());
    }

    #[test]
    fn once_property_limits_on_hit() {
        let arena = arena();
        let mut interpreter = Interpreter::new();
        interpreter
            .execute_node(&arena.world, &wait_node(true), &watch(arena.knight))
            .unwrap();

        swing(&arena, &["head", "spine", "arm"]);
        swing(&arena, &["leg"]);

        let hits = interpreter
            .poll()
            .events
            .into_iter()
            .filter(|e| e.pin == "OnHit")
            .count();
        assert_eq!(hits, 2);
    }

    #[test]
    fn linked_input_overrides_property() {
        let arena = arena();
        let mut interpreter = Interpreter::new();
        let mut inputs = watch(arena.knight);
        inputs.insert("once_per_multi_trace".to_string(), Value::Bool(true));

        interpreter
            .execute_node(&arena.world, &wait_node(false), &inputs)
            .unwrap();
        swing(&arena, &["head", "spine"]);

        assert_eq!(
            interpreter.poll().fired_pins(),
            vec!["OnStarted", "OnHit", "OnEnded"]
        );
    }

    #[test]
    fn unarmed_watch_still_continues() {
        let arena = arena();
        let mut interpreter = Interpreter::new();

        for inputs in [watch(arena.dummy), BTreeMap::new()] {
            let out = interpreter
                .execute_node(&arena.world, &wait_node(false), &inputs)
                .unwrap();
            assert_eq!(out.fired_pins(), vec!["then"]);
            assert_eq!(out.events[0].output("async_action"), Some(&Value::Unit));
        }
        assert_eq!(arena.world.game_instance().registered_action_count(), 0);
    }

    #[test]
    fn wrong_input_type_is_an_error() {
        let arena = arena();
        let mut interpreter = Interpreter::new();
        let inputs = BTreeMap::from([(
            "actor_to_watch".to_string(),
            Value::String("Knight".to_string()),
        )]);

        let err = interpreter
            .execute_node(&arena.world, &wait_node(false), &inputs)
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::TypeMismatch {
                node: NodeId(1),
                pin: "actor_to_watch".to_string(),
                expected: DataType::Actor,
                found: DataType::String,
            }
        );
        assert!(!interpreter.has_pending());
    }

    #[test]
    fn cancel_node_stops_the_watch() {
        let arena = arena();
        let mut interpreter = Interpreter::new();
        let out = interpreter
            .execute_node(&arena.world, &wait_node(false), &watch(arena.knight))
            .unwrap();
        let action = out.events[0].output("async_action").cloned().unwrap();

        let cancel = Node::new(NodeId(2), NodeKind::CancelAsyncAction);
        let inputs = BTreeMap::from([("action".to_string(), action)]);
        let out = interpreter
            .execute_node(&arena.world, &cancel, &inputs)
            .unwrap();
        assert_eq!(out.fired_pins(), vec!["then"]);
        assert_eq!(arena.world.game_instance().registered_action_count(), 0);

        swing(&arena, &["head"]);
        assert!(interpreter.poll().events.is_empty());

        // Cancelling twice is harmless.
        let out = interpreter
            .execute_node(&arena.world, &cancel, &inputs)
            .unwrap();
        assert_eq!(out.fired_pins(), vec!["then"]);
    }

    #[test]
    fn dropped_interpreter_stops_collecting() {
        let arena = arena();
        {
            let mut interpreter = Interpreter::new();
            interpreter
                .execute_node(&arena.world, &wait_node(false), &watch(arena.knight))
                .unwrap();
        }

        // A second watch on the same component, armed by a live interpreter.
        let mut interpreter = Interpreter::new();
        let mut second = Node::new(NodeId(2), NodeKind::WaitForMeleeTraceEvent);
        second.set_property_bool("once_per_multi_trace", false);
        interpreter
            .execute_node(&arena.world, &second, &watch(arena.knight))
            .unwrap();

        swing(&arena, &["head"]);

        // The first watch is still subscribed, but its firings have nowhere to go.
        assert_eq!(arena.world.game_instance().registered_action_count(), 2);
        let out = interpreter.poll();
        assert_eq!(out.fired_pins(), vec!["OnStarted", "OnHit", "OnEnded"]);
        assert!(out.events.iter().all(|e| e.node == NodeId(2)));
    }

    #[test]
    fn node_and_values_serialize() {
        let node = wait_node(true);
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, NodeKind::WaitForMeleeTraceEvent);
        assert_eq!(
            back.properties.get("once_per_multi_trace"),
            Some(&Value::Bool(true))
        );
        assert_eq!(back.pins.len(), node.pins.len());

        let value = Value::Vec3(Vec3::new(1.0, 2.0, 3.0));
        let back: Value = serde_json::from_str(&serde_json::to_string(&value).unwrap()).unwrap();
        assert_eq!(back, value);
    }
}
