//! Shared fixtures for pagecraft test surfaces: a small component
//! catalog, a three-unit migration registry telling a realistic upgrade
//! story, and documents at various stored versions.

use pagecraft::prelude::*;
use pagecraft_core::{edit, value::EntityBinding};
use serde_json::json;

/// Component catalog the fixture registry migrates documents toward.
#[must_use]
pub fn catalog() -> ComponentCatalog {
    ComponentCatalog::new()
        .with_component(
            "Foo",
            ComponentDef::new().with_field("heading", FieldDef::optional(FieldKind::Binding)),
        )
        .with_component(
            "Hero",
            ComponentDef::new()
                .with_field("heading", FieldDef::optional(FieldKind::Binding))
                .with_field("accent", FieldDef::optional(FieldKind::Text))
                .with_default("accent", "blue"),
        )
        .with_component("Section", ComponentDef::new())
        .with_component(
            "Columns",
            ComponentDef::new().with_field("gap", FieldDef::optional(FieldKind::Number)),
        )
        .with_component(
            "Column",
            ComponentDef::new().with_field("span", FieldDef::optional(FieldKind::Number)),
        )
        .with_component(
            "Card",
            ComponentDef::new().with_field("title", FieldDef::optional(FieldKind::Text)),
        )
        .with_component(
            "Text",
            ComponentDef::new().with_field("body", FieldDef::optional(FieldKind::Text)),
        )
}

/// Unit 0: `title` becomes `heading` and bare literals become tri-state
/// bindings. When a business document carries a `headline` field the
/// binding points at it instead of the inlined constant.
#[must_use]
pub fn title_to_heading_unit() -> Box<dyn MigrationUnit> {
    Box::new(NodeUnit::new(
        "title-to-heading-binding",
        |node: &Node,
         _: &[PathSegment],
         _: CollectionKind,
         ctx: &MigrationContext<'_>|
         -> Result<VisitAction, MigrationAssertionError> {
            if !node.props.contains_key("title") {
                return Ok(VisitAction::Keep);
            }

            let renamed = edit::rename_prop(node, "title", "heading")?;
            let mut bound = edit::literal_to_binding(&renamed, "heading")?;

            if let Some(business) = ctx.business
                && business.has("headline")
                && let Some(PropValue::Binding(binding)) = bound.props.get("heading")
            {
                let rebound = EntityBinding::new(
                    "headline",
                    (*binding.constant_value).clone(),
                    false,
                )
                .map_err(|err| MigrationAssertionError::InvalidBindingConstant {
                    prop: "heading".to_string(),
                    found: err.found,
                })?;
                bound
                    .props
                    .insert("heading".to_string(), PropValue::Binding(rebound));
            }

            Ok(VisitAction::Replace(bound))
        },
    ))
}

/// Unit 1: fill in ids for nodes that predate id-bearing documents.
#[must_use]
pub fn assign_ids_unit() -> Box<dyn MigrationUnit> {
    Box::new(NodeUnit::new(
        "assign-node-ids",
        |node: &Node,
         path: &[PathSegment],
         _: CollectionKind,
         _: &MigrationContext<'_>|
         -> Result<VisitAction, MigrationAssertionError> {
            if node.id.is_some() {
                Ok(VisitAction::Keep)
            } else {
                Ok(VisitAction::Replace(edit::assign_id(node, path)))
            }
        },
    ))
}

/// Unit 2: decompose monolithic `Columns` nodes — the `columns` list
/// prop becomes generated `Column` children in a `columns` zone.
#[must_use]
pub fn split_columns_unit() -> Box<dyn MigrationUnit> {
    Box::new(
        NodeUnit::new(
            "split-columns-to-zone",
            |node: &Node,
             _: &[PathSegment],
             _: CollectionKind,
             _: &MigrationContext<'_>|
             -> Result<VisitAction, MigrationAssertionError> {
                match edit::split_to_zone(node, "columns", "columns", "Column")? {
                    Some(splice) => Ok(VisitAction::Splice(splice)),
                    None => Ok(VisitAction::Keep),
                }
            },
        )
        .with_types(&["Columns"]),
    )
}

/// The full fixture registry: three units, current version 3.
#[must_use]
pub fn registry() -> MigrationRegistry {
    MigrationRegistry::new(vec![
        title_to_heading_unit(),
        assign_ids_unit(),
        split_columns_unit(),
    ])
}

/// A version-0 document exercising every containment mechanism: content,
/// a slot inside a zone-addressed node, and a slot within that slot.
#[must_use]
pub fn doc_v0() -> Document {
    serde_json::from_value(json!({
        "root": {"props": {"title": "Landing"}},
        "content": [
            {"id": "hero-1", "type": "Hero", "props": {"title": "Welcome"}},
            {"id": "cols-1", "type": "Columns", "props": {
                "gap": 16,
                "columns": [{"span": 6}, {"span": 6}]
            }},
            {"id": "section-1", "type": "Section", "props": {}}
        ],
        "zones": {
            "section-1:body": [
                {"id": "card-1", "type": "Card", "props": {
                    "title": "Pricing",
                    "content": [
                        {"id": "text-1", "type": "Text", "props": {
                            "wrapper": [
                                {"type": "Text", "props": {"title": "Deep", "body": "nested"}}
                            ]
                        }}
                    ]
                }}
            ]
        }
    }))
    .expect("fixture document should decode")
}

/// A business document whose `headline` field the fixture units bind to.
#[must_use]
pub fn business() -> BusinessDocument {
    BusinessDocument::new(json!({
        "headline": "From the business doc",
        "vendor": {"name": "Acme"}
    }))
}
