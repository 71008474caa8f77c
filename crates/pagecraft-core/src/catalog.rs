//! Component catalog boundary. The engine consumes the catalog read-only:
//! migration units ask it for current field shapes and defaults of types
//! they restructure, and the runner validates post-migration node types
//! against it. Component definitions themselves live outside this crate.

use crate::{
    document::Node,
    error::MigrationAssertionError,
    value::{PropKind, PropMap},
};
use indexmap::IndexMap;

///
/// FieldKind
///
/// Current shape of a component field, mirroring the prop value kinds.
///

pub type FieldKind = PropKind;

///
/// FieldDef
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDef {
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDef {
    #[must_use]
    pub const fn required(kind: FieldKind) -> Self {
        Self {
            kind,
            required: true,
        }
    }

    #[must_use]
    pub const fn optional(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
        }
    }
}

///
/// ComponentDef
///
/// Current field schema and default props of one component type.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ComponentDef {
    pub fields: IndexMap<String, FieldDef>,
    pub defaults: PropMap,
}

impl ComponentDef {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    #[must_use]
    pub fn with_default(
        mut self,
        name: impl Into<String>,
        value: impl Into<crate::value::PropValue>,
    ) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }
}

///
/// ComponentRegistry
///
/// Read-only view of the component catalog.
///

pub trait ComponentRegistry {
    fn definition(&self, ty: &str) -> Option<&ComponentDef>;

    fn contains(&self, ty: &str) -> bool {
        self.definition(ty).is_some()
    }
}

///
/// ComponentCatalog
///
/// The shipped `ComponentRegistry` implementation: constructed once at
/// process start, immutable afterwards.
///

#[derive(Clone, Debug, Default)]
pub struct ComponentCatalog {
    components: IndexMap<String, ComponentDef>,
}

impl ComponentCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_component(mut self, ty: impl Into<String>, def: ComponentDef) -> Self {
        self.components.insert(ty.into(), def);
        self
    }
}

impl ComponentRegistry for ComponentCatalog {
    fn definition(&self, ty: &str) -> Option<&ComponentDef> {
        self.components.get(ty)
    }
}

/// Check one node against the catalog: the type must be known and every
/// required field present. Units that introduce required fields fill
/// them from the catalog defaults before this runs.
pub fn validate_node(
    node: &Node,
    registry: &dyn ComponentRegistry,
) -> Result<(), MigrationAssertionError> {
    let Some(def) = registry.definition(&node.ty) else {
        return Err(MigrationAssertionError::UnknownType {
            ty: node.ty.clone(),
        });
    };

    for (name, field) in &def.fields {
        if field.required && !node.props.contains_key(name) {
            return Err(MigrationAssertionError::MissingProp {
                ty: node.ty.clone(),
                prop: name.clone(),
            });
        }
    }

    Ok(())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PropValue;

    fn catalog() -> ComponentCatalog {
        ComponentCatalog::new().with_component(
            "Hero",
            ComponentDef::new()
                .with_field("heading", FieldDef::required(FieldKind::Binding))
                .with_field("accent", FieldDef::optional(FieldKind::Text))
                .with_default("accent", "blue"),
        )
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = validate_node(&Node::new("Ghost"), &catalog()).unwrap_err();

        assert_eq!(
            err,
            MigrationAssertionError::UnknownType {
                ty: "Ghost".to_string()
            }
        );
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = validate_node(&Node::new("Hero"), &catalog()).unwrap_err();

        assert!(matches!(err, MigrationAssertionError::MissingProp { .. }));
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let node = Node::new("Hero").with_prop("heading", PropValue::Null);

        validate_node(&node, &catalog()).expect("optional field may be absent");
    }

    #[test]
    fn defaults_are_exposed_for_units() {
        let registry = catalog();
        let def = registry.definition("Hero").expect("Hero is registered");

        assert_eq!(def.defaults.get("accent"), Some(&PropValue::from("blue")));
    }
}
