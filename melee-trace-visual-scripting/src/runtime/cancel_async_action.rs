use crate::{
    error::RuntimeError,
    runtime::{NodeContext, NodeRuntime},
    LOG_TARGET,
};
use std::collections::BTreeMap;

pub struct CancelAsyncActionRuntime;

impl NodeRuntime for CancelAsyncActionRuntime {
    fn execute(&self, ctx: &NodeContext<'_>) -> Result<(), RuntimeError> {
        if let Some(id) = ctx.read_async_action("action")? {
            match ctx.world.game_instance().action(id) {
                Some(action) => action.cancel(ctx.world),
                None => tracing::debug!(
                    target: LOG_TARGET,
                    ?id,
                    "Cancel: async action already finished"
                ),
            }
        }

        ctx.fire("then", BTreeMap::new())
    }
}
