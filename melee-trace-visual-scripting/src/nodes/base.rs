//! Base node trait and common utilities.

use crate::model::{DataType, Pin, PinDirection, PinId, Value};
use std::collections::BTreeMap;

use super::NodeCategory;

/// Pin definition for node templates (before IDs are assigned).
#[derive(Debug, Clone)]
pub struct PinDef {
    pub name: String,
    pub direction: PinDirection,
    pub data_type: DataType,
}

impl PinDef {
    pub fn input(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            direction: PinDirection::Input,
            data_type,
        }
    }

    pub fn output(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            direction: PinDirection::Output,
            data_type,
        }
    }

    pub fn exec_in(name: impl Into<String>) -> Self {
        Self::input(name, DataType::Exec)
    }

    pub fn exec_out(name: impl Into<String>) -> Self {
        Self::output(name, DataType::Exec)
    }

    pub fn to_pin(&self, id: u32) -> Pin {
        Pin {
            id: PinId(id),
            name: self.name.clone(),
            direction: self.direction,
            data_type: self.data_type,
        }
    }
}

/// Property definition for node configuration.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub default_value: Value,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, default_value: Value) -> Self {
        Self {
            name: name.into(),
            default_value,
        }
    }
}

pub trait NodeDefinition: Send + Sync {
    /// Unique identifier for this node type (e.g., "WaitForMeleeTraceEvent").
    fn kind_name(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    fn category(&self) -> NodeCategory;

    /// Description shown in tooltips.
    fn description(&self) -> &'static str {
        ""
    }

    fn pins(&self) -> Vec<PinDef>;

    fn properties(&self) -> Vec<PropertyDef> {
        vec![]
    }

    /// Latent nodes keep firing exec outputs after their own execution has finished.
    fn is_latent(&self) -> bool {
        false
    }

    /// Pins numbered in declaration order.
    fn create_pins(&self) -> Vec<Pin> {
        self.pins()
            .into_iter()
            .enumerate()
            .map(|(i, def)| def.to_pin(i as u32))
            .collect()
    }

    fn create_properties(&self) -> BTreeMap<String, Value> {
        self.properties()
            .into_iter()
            .map(|p| (p.name, p.default_value))
            .collect()
    }
}
