use crate::model::{DataType, NodeId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("pin '{pin}' of node {node:?} expects {expected:?}, got {found:?}")]
    TypeMismatch {
        node: NodeId,
        pin: String,
        expected: DataType,
        found: DataType,
    },

    #[error("node {node:?} has no pin named '{pin}'")]
    UnknownPin { node: NodeId, pin: String },
}
