use crate::nodes::definition_for;
use melee_trace::{
    glam::Vec3, ActionId, Actor, Handle, MeleeTraceComponent, MeleeTraceInstanceHandle,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PinId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinDirection {
    Input,
    Output,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Exec,
    Bool,
    String,
    Vec3,
    Actor,
    MeleeTraceComponent,
    TraceHandle,
    AsyncAction,
    Unit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    String(String),
    Vec3(Vec3),
    Actor(Handle<Actor>),
    MeleeTraceComponent(Handle<MeleeTraceComponent>),
    TraceHandle(MeleeTraceInstanceHandle),
    AsyncAction(ActionId),
    Unit,
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Bool(_) => DataType::Bool,
            Value::String(_) => DataType::String,
            Value::Vec3(_) => DataType::Vec3,
            Value::Actor(_) => DataType::Actor,
            Value::MeleeTraceComponent(_) => DataType::MeleeTraceComponent,
            Value::TraceHandle(_) => DataType::TraceHandle,
            Value::AsyncAction(_) => DataType::AsyncAction,
            Value::Unit => DataType::Unit,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    WaitForMeleeTraceEvent,
    CancelAsyncAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    pub id: PinId,
    pub name: String,
    pub direction: PinDirection,
    pub data_type: DataType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    #[serde(default)]
    pub position: [f32; 2],
    pub pins: Vec<Pin>,
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    /// Creates a node with the pins and default properties of its definition.
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        let definition = definition_for(kind);
        Self {
            id,
            kind,
            position: [0.0, 0.0],
            pins: definition.create_pins(),
            properties: definition.create_properties(),
        }
    }

    pub fn pin_named(&self, name: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.name == name)
    }

    pub fn set_property_bool(&mut self, key: &str, value: bool) {
        self.properties.insert(key.to_string(), Value::Bool(value));
    }
}
