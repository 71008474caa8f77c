use crate::document::Node;
use indexmap::IndexMap;
use serde_json::Number;
use thiserror::Error as ThisError;

///
/// BindingValueError
///
/// Invariant violation raised when constructing an `EntityBinding` whose
/// constant is not a literal.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("binding constant must be a literal, found {found}")]
pub struct BindingValueError {
    pub found: &'static str,
}

///
/// PropKind
///
/// Discriminant of `PropValue`, used in diagnostics and catalog field
/// definitions.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropKind {
    Binding,
    Bool,
    List,
    Null,
    Number,
    Slot,
    Struct,
    Text,
}

impl PropKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binding => "binding",
            Self::Bool => "bool",
            Self::List => "list",
            Self::Null => "null",
            Self::Number => "number",
            Self::Slot => "slot",
            Self::Struct => "struct",
            Self::Text => "text",
        }
    }
}

///
/// PropValue
///
/// Closed union over every value shape a node prop can hold.
///
/// Null/Bool/Number/Text → literals, stored bare on the wire.
/// Binding              → tri-state entity binding.
/// Slot                 → fixed-name child collection embedded in props.
/// List/Struct          → plain JSON composites, recursing into the above.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PropValue {
    Binding(EntityBinding),
    Bool(bool),
    List(Vec<PropValue>),
    Null,
    Number(Number),
    Slot(Vec<Node>),
    Struct(PropMap),
    Text(String),
}

impl PropValue {
    #[must_use]
    pub const fn kind(&self) -> PropKind {
        match self {
            Self::Binding(_) => PropKind::Binding,
            Self::Bool(_) => PropKind::Bool,
            Self::List(_) => PropKind::List,
            Self::Null => PropKind::Null,
            Self::Number(_) => PropKind::Number,
            Self::Slot(_) => PropKind::Slot,
            Self::Struct(_) => PropKind::Struct,
            Self::Text(_) => PropKind::Text,
        }
    }

    /// Literals are the values an entity binding may hold as its constant.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::Text(_)
        )
    }

    #[must_use]
    pub fn as_slot(&self) -> Option<&[Node]> {
        match self {
            Self::Slot(nodes) => Some(nodes),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_struct(&self) -> Option<&PropMap> {
        match self {
            Self::Struct(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        }
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        Self::Number(Number::from(v))
    }
}

impl From<u64> for PropValue {
    fn from(v: u64) -> Self {
        Self::Number(Number::from(v))
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

///
/// EntityBinding
///
/// Tri-state binding: when `constant_value_enabled` the literal in
/// `constant_value` is used; otherwise `field` resolves against the
/// business document. `constant_value` is always a literal.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityBinding {
    pub field: String,
    pub constant_value: Box<PropValue>,
    pub constant_value_enabled: bool,
}

impl EntityBinding {
    pub fn new(
        field: impl Into<String>,
        constant_value: PropValue,
        constant_value_enabled: bool,
    ) -> Result<Self, BindingValueError> {
        if !constant_value.is_literal() {
            return Err(BindingValueError {
                found: constant_value.kind().as_str(),
            });
        }

        Ok(Self {
            field: field.into(),
            constant_value: Box::new(constant_value),
            constant_value_enabled,
        })
    }

    /// A binding carrying only a literal, as produced when converting a
    /// bare prop value. `field` stays empty: no prior binding existed.
    pub fn constant(value: PropValue) -> Result<Self, BindingValueError> {
        Self::new("", value, true)
    }
}

///
/// PropMap
///
/// Insertion-ordered prop map. Order is part of the persisted shape, so
/// plain `HashMap`/`BTreeMap` are not substitutes.
///

#[derive(
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    derive_more::Deref,
    derive_more::DerefMut,
    derive_more::IntoIterator,
)]
#[serde(transparent)]
pub struct PropMap(IndexMap<String, PropValue>);

impl PropMap {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove a prop preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.0.shift_remove(key)
    }
}

impl From<IndexMap<String, PropValue>> for PropMap {
    fn from(map: IndexMap<String, PropValue>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, PropValue)> for PropMap {
    fn from_iter<I: IntoIterator<Item = (String, PropValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PropMap {
    type Item = (&'a String, &'a PropValue);
    type IntoIter = indexmap::map::Iter<'a, String, PropValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

///
/// TESTS
///
