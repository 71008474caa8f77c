//! Wire codec for the untagged JSON document shape.
//!
//! Literals are stored bare; a binding is an object carrying exactly
//! `field`/`constantValue`/`constantValueEnabled`; a slot is an array
//! whose every element is node-shaped (`type` plus optional `id`/`props`).
//! Decoding re-checks the invariants the typed model guarantees.

use crate::{
    document::{Node, ZoneKey},
    value::{BindingValueError, EntityBinding, PropMap, PropValue},
};
use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::Error as _,
    ser::SerializeMap,
};
use serde_json::Number;

const BINDING_FIELD: &str = "field";
const BINDING_CONSTANT: &str = "constantValue";
const BINDING_ENABLED: &str = "constantValueEnabled";

///
/// PropWire
///
/// Decode shape: plain JSON first, reinterpreted into the typed union by
/// `into_value`.
///

#[derive(Deserialize)]
#[serde(untagged)]
enum PropWire {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Array(Vec<PropWire>),
    Object(IndexMap<String, PropWire>),
}

impl PropWire {
    fn into_value(self) -> Result<PropValue, BindingValueError> {
        match self {
            Self::Null => Ok(PropValue::Null),
            Self::Bool(v) => Ok(PropValue::Bool(v)),
            Self::Number(v) => Ok(PropValue::Number(v)),
            Self::Text(v) => Ok(PropValue::Text(v)),
            Self::Array(items) => {
                if !items.is_empty() && items.iter().all(PropWire::is_node_shaped) {
                    let nodes = items
                        .into_iter()
                        .map(PropWire::into_node)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(PropValue::Slot(nodes))
                } else {
                    let values = items
                        .into_iter()
                        .map(PropWire::into_value)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(PropValue::List(values))
                }
            }
            Self::Object(map) => {
                if is_binding_shaped(&map) {
                    into_binding(map).map(PropValue::Binding)
                } else {
                    let entries = map
                        .into_iter()
                        .map(|(key, value)| Ok((key, value.into_value()?)))
                        .collect::<Result<PropMap, BindingValueError>>()?;
                    Ok(PropValue::Struct(entries))
                }
            }
        }
    }

    /// Node-shaped: a `type` string, optionally an `id` string and a
    /// `props` object, and nothing else.
    fn is_node_shaped(&self) -> bool {
        let Self::Object(map) = self else {
            return false;
        };

        if !matches!(map.get("type"), Some(Self::Text(_))) {
            return false;
        }

        map.iter().all(|(key, value)| match key.as_str() {
            "type" => true,
            "id" => matches!(value, Self::Text(_)),
            "props" => matches!(value, Self::Object(_)),
            _ => false,
        })
    }

    fn into_node(self) -> Result<Node, BindingValueError> {
        let Self::Object(mut map) = self else {
            unreachable!("into_node is only called on node-shaped objects");
        };

        let id = match map.shift_remove("id") {
            Some(Self::Text(id)) => Some(id),
            _ => None,
        };
        let ty = match map.shift_remove("type") {
            Some(Self::Text(ty)) => ty,
            _ => unreachable!("node shape guarantees a type string"),
        };
        let props = match map.shift_remove("props") {
            Some(Self::Object(entries)) => entries
                .into_iter()
                .map(|(key, value)| Ok((key, value.into_value()?)))
                .collect::<Result<PropMap, BindingValueError>>()?,
            _ => PropMap::new(),
        };

        Ok(Node {
            id,
            ty,
            props,
        })
    }
}

fn is_binding_shaped(map: &IndexMap<String, PropWire>) -> bool {
    map.len() == 3
        && matches!(map.get(BINDING_FIELD), Some(PropWire::Text(_)))
        && map.contains_key(BINDING_CONSTANT)
        && matches!(map.get(BINDING_ENABLED), Some(PropWire::Bool(_)))
}

fn into_binding(mut map: IndexMap<String, PropWire>) -> Result<EntityBinding, BindingValueError> {
    let Some(PropWire::Text(field)) = map.shift_remove(BINDING_FIELD) else {
        unreachable!("binding shape guarantees a field string");
    };
    let Some(constant) = map.shift_remove(BINDING_CONSTANT) else {
        unreachable!("binding shape guarantees a constant");
    };
    let Some(PropWire::Bool(enabled)) = map.shift_remove(BINDING_ENABLED) else {
        unreachable!("binding shape guarantees an enabled flag");
    };

    EntityBinding::new(field, constant.into_value()?, enabled)
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Number(v) => v.serialize(serializer),
            Self::Text(v) => serializer.serialize_str(v),
            Self::Binding(binding) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry(BINDING_FIELD, &binding.field)?;
                map.serialize_entry(BINDING_CONSTANT, binding.constant_value.as_ref())?;
                map.serialize_entry(BINDING_ENABLED, &binding.constant_value_enabled)?;
                map.end()
            }
            Self::Slot(nodes) => nodes.serialize(serializer),
            Self::List(values) => values.serialize(serializer),
            Self::Struct(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PropValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        PropWire::deserialize(deserializer)?
            .into_value()
            .map_err(D::Error::custom)
    }
}

impl Serialize for ZoneKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ZoneKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

///
/// TESTS
///
