//! Utility nodes.

use super::{NodeCategory, NodeDefinition, PinDef};
use crate::model::DataType;

/// Cancel Async Action - stops a latent node's action and releases it.
pub struct CancelAsyncActionNode;

impl NodeDefinition for CancelAsyncActionNode {
    fn kind_name(&self) -> &'static str {
        "CancelAsyncAction"
    }

    fn display_name(&self) -> &'static str {
        "Cancel"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Utility
    }

    fn description(&self) -> &'static str {
        "Cancels an async action. Does nothing if it already finished."
    }

    fn pins(&self) -> Vec<PinDef> {
        vec![
            PinDef::exec_in("exec"),
            PinDef::input("action", DataType::AsyncAction),
            PinDef::exec_out("then"),
        ]
    }
}
