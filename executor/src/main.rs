//! Scenario replayer.
//!
//! Arms a "Wait For Melee Trace Event" node on the watcher actor, replays the scenario's traces
//! through its melee trace component and logs every pin the graph fires. `--list-nodes` logs the
//! node palette instead.

use anyhow::{Context, Result};
use glam::Vec3;
use melee_trace::{Actor, Handle, MeleeHitResult, World};
use melee_trace_visual_scripting::{
    all_node_definitions, Interpreter, InterpreterOutput, Node, NodeId, NodeKind, Value,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

const DEFAULT_SCENARIO: &str = include_str!("../scenarios/duel.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Scenario {
    watcher: String,
    #[serde(default)]
    once_per_multi_trace: bool,
    /// Index of the trace after which the watch is cancelled through a "Cancel Async Action"
    /// node.
    #[serde(default)]
    cancel_after_trace: Option<usize>,
    traces: Vec<ScenarioTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScenarioTrace {
    #[serde(default)]
    hits: Vec<ScenarioHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScenarioHit {
    victim: String,
    #[serde(default)]
    location: Vec3,
    #[serde(default)]
    normal: Vec3,
    #[serde(default)]
    bone: String,
}

fn scenario_path_arg() -> Option<PathBuf> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == "--scenario" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

fn has_flag(flag: &str) -> bool {
    std::env::args().any(|arg| arg == flag)
}

/// One line per available node, in palette order.
fn palette() -> Vec<String> {
    all_node_definitions()
        .into_iter()
        .map(|def| {
            let latent = if def.is_latent() { " (latent)" } else { "" };
            format!(
                "[{}] {}{}: {}",
                def.category().display_name(),
                def.display_name(),
                latent,
                def.description()
            )
        })
        .collect()
}

fn load_scenario(path: Option<PathBuf>) -> Result<Scenario> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read scenario {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse scenario {}", path.display()))
        }
        None => serde_json::from_str(DEFAULT_SCENARIO).context("built-in scenario is malformed"),
    }
}

/// Spawns the watcher (with its component) and every victim the scenario names.
fn populate(world: &mut World, scenario: &Scenario) -> Result<BTreeMap<String, Handle<Actor>>> {
    let mut actors = BTreeMap::new();
    let watcher = world.spawn_actor(scenario.watcher.clone());
    world.add_melee_trace_component(watcher)?;
    actors.insert(scenario.watcher.clone(), watcher);

    for hit in scenario.traces.iter().flat_map(|t| &t.hits) {
        if !actors.contains_key(&hit.victim) {
            let victim = world.spawn_actor(hit.victim.clone());
            tracing::debug!(victim = %hit.victim, "spawned victim");
            actors.insert(hit.victim.clone(), victim);
        }
    }

    Ok(actors)
}

fn record(output: InterpreterOutput, fired: &mut Vec<String>) {
    for event in output.events {
        match event.output("hit_bone_name") {
            Some(Value::String(bone)) => {
                tracing::info!(node = event.node.0, pin = %event.pin, bone = %bone, "fired");
            }
            _ => tracing::info!(node = event.node.0, pin = %event.pin, "fired"),
        }
        fired.push(event.pin);
    }
}

/// Replays `scenario` and returns the names of the fired pins, in order.
fn run(scenario: &Scenario) -> Result<Vec<String>> {
    let mut world = World::new();
    let actors = populate(&mut world, scenario)?;
    let watcher = actors[&scenario.watcher];
    let sword = world
        .find_melee_trace_component(watcher)
        .context("watcher lost its melee trace component")?;

    let mut interpreter = Interpreter::new();
    let mut fired = Vec::new();

    let mut wait = Node::new(NodeId(1), NodeKind::WaitForMeleeTraceEvent);
    wait.set_property_bool("once_per_multi_trace", scenario.once_per_multi_trace);
    let inputs = BTreeMap::from([("actor_to_watch".to_string(), Value::Actor(watcher))]);
    let output = interpreter.execute_node(&world, &wait, &inputs)?;

    let action = output
        .events
        .iter()
        .find(|e| e.pin == "then")
        .and_then(|e| e.output("async_action"))
        .cloned()
        .unwrap_or(Value::Unit);
    record(output, &mut fired);

    let cancel = Node::new(NodeId(2), NodeKind::CancelAsyncAction);
    for (index, trace) in scenario.traces.iter().enumerate() {
        let component = world
            .melee_trace_component(sword)
            .context("melee trace component was destroyed")?;

        let instance = component.start_trace();
        for hit in &trace.hits {
            component.report_hit(
                instance,
                MeleeHitResult {
                    hit_actor: actors[&hit.victim],
                    location: hit.location,
                    normal: hit.normal,
                    bone_name: hit.bone.clone(),
                },
            )?;
        }
        let hit_count = component.end_trace(instance)?;
        tracing::debug!(index, hit_count, "trace replayed");
        record(interpreter.poll(), &mut fired);

        if scenario.cancel_after_trace == Some(index) {
            let inputs = BTreeMap::from([("action".to_string(), action.clone())]);
            record(interpreter.execute_node(&world, &cancel, &inputs)?, &mut fired);
        }
    }

    world.shutdown();
    Ok(fired)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    if has_flag("--list-nodes") {
        for line in palette() {
            tracing::info!("{line}");
        }
        return Ok(());
    }

    let scenario = load_scenario(scenario_path_arg())?;
    tracing::info!(
        watcher = %scenario.watcher,
        traces = scenario.traces.len(),
        "replaying scenario"
    );

    let fired = run(&scenario)?;
    tracing::info!(count = fired.len(), "scenario finished");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pins(fired: &[String]) -> Vec<&str> {
        fired.iter().map(String::as_str).collect()
    }

    #[test]
    fn default_scenario_replays() {
        let scenario = load_scenario(None).unwrap();
        assert_eq!(scenario.watcher, "Knight");
        assert!(scenario.once_per_multi_trace);

        let fired = run(&scenario).unwrap();
        assert_eq!(
            pins(&fired),
            vec![
                "then",
                "OnStarted",
                "OnHit",
                "OnEnded",
                "OnStarted",
                "OnHit",
                "OnEnded",
                "OnStarted",
                "OnEnded",
            ]
        );
    }

    #[test]
    fn cancel_after_first_trace() {
        let mut scenario = load_scenario(None).unwrap();
        scenario.cancel_after_trace = Some(0);
        scenario.once_per_multi_trace = false;

        let fired = run(&scenario).unwrap();
        assert_eq!(
            pins(&fired),
            vec!["then", "OnStarted", "OnHit", "OnHit", "OnEnded", "then"]
        );
    }

    #[test]
    fn minimal_scenario_uses_defaults() {
        let scenario: Scenario = serde_json::from_str(
            r#"{ "watcher": "Knight", "traces": [ { "hits": [ { "victim": "Dummy" } ] } ] }"#,
        )
        .unwrap();
        assert!(!scenario.once_per_multi_trace);
        assert_eq!(scenario.cancel_after_trace, None);
        assert_eq!(scenario.traces[0].hits[0].location, Vec3::ZERO);

        let fired = run(&scenario).unwrap();
        assert_eq!(pins(&fired), vec!["then", "OnStarted", "OnHit", "OnEnded"]);
    }

    #[test]
    fn palette_lists_every_node() {
        let lines = palette();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[Async] Wait For Melee Trace Event (latent): Fires OnStarted"));
        assert!(lines[1].starts_with("[Utilities] Cancel: Cancels an async action."));
    }

    #[test]
    fn missing_scenario_file_is_an_error() {
        let err = load_scenario(Some(PathBuf::from("does/not/exist.json"))).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
