//! Node definitions for visual scripting.
//!
//! To add a new node type:
//! 1. Implement `NodeDefinition` for it in this folder
//! 2. Add a `NodeKind` variant and map it in `definition_for`
//! 3. Give it a runtime in `crate::runtime`

mod base;

mod melee_trace;
mod utilities;

pub use base::*;

pub use melee_trace::*;
pub use utilities::*;

use crate::model::NodeKind;

/// Registry of all available node definitions, in palette order.
pub fn all_node_definitions() -> Vec<&'static dyn NodeDefinition> {
    let definitions: [&'static dyn NodeDefinition; 2] =
        [&WaitForMeleeTraceEventNode, &CancelAsyncActionNode];
    definitions.to_vec()
}

/// Get a node definition by its kind name.
pub fn get_node_definition(kind: &str) -> Option<&'static dyn NodeDefinition> {
    all_node_definitions()
        .into_iter()
        .find(|def| def.kind_name() == kind)
}

pub fn definition_for(kind: NodeKind) -> &'static dyn NodeDefinition {
    match kind {
        NodeKind::WaitForMeleeTraceEvent => &WaitForMeleeTraceEventNode,
        NodeKind::CancelAsyncAction => &CancelAsyncActionNode,
    }
}

/// Node category for organizing the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Latent,
    Utility,
}

impl NodeCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeCategory::Latent => "Async",
            NodeCategory::Utility => "Utilities",
        }
    }
}
