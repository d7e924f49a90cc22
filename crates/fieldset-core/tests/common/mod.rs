//! Shared fixtures for codec integration tests.
#![allow(dead_code)]

use fieldset_core::resolve::{ResolveSession, ResolvedField, Resolver};
use fieldset_schema::{
    node::{FieldDef, FieldGroup, FieldKind, Layout},
    registry::DefinitionStore,
    types::{FieldKey, RowBounds, ScalarKind},
};

pub fn text(key: &str, name: &str) -> FieldDef {
    FieldDef::new(key, name, name, FieldKind::Scalar(ScalarKind::Text))
}

pub fn image(key: &str, name: &str) -> FieldDef {
    FieldDef::new(key, name, name, FieldKind::Scalar(ScalarKind::Image))
}

/// `gallery_list`: repeater with `min=1, max=3` and two scalar sub-fields.
pub fn gallery_store() -> DefinitionStore {
    let mut store = DefinitionStore::new();
    store
        .insert_group(FieldGroup::new(
            "grp_gallery",
            "Gallery",
            vec![FieldDef::new(
                "fk_gallery",
                "gallery_list",
                "Gallery List",
                FieldKind::Repeater {
                    sub_fields: vec![text("fk_caption", "caption"), image("fk_image", "image")],
                    bounds: RowBounds::new(Some(1), Some(3)),
                },
            )],
        ))
        .unwrap();
    store
}

/// `blocks`: flexible field with `text_block` and `image_block` layouts.
pub fn blocks_store() -> DefinitionStore {
    let mut store = DefinitionStore::new();
    store
        .insert_group(FieldGroup::new(
            "grp_content",
            "Content",
            vec![FieldDef::new(
                "fk_blocks",
                "blocks",
                "Blocks",
                FieldKind::Flexible {
                    layouts: vec![
                        Layout::new("text_block", "Text Block", vec![text("fk_body", "body")]),
                        Layout::new(
                            "image_block",
                            "Image Block",
                            vec![image("fk_img", "img"), text("fk_credit", "credit")],
                        ),
                    ],
                },
            )],
        ))
        .unwrap();
    store
}

pub fn resolve_one(store: &DefinitionStore, key: &str) -> ResolvedField {
    let mut session = ResolveSession::new();
    let mut resolved = Resolver::new(store)
        .resolve_field(store.field(&FieldKey::from(key)).unwrap(), &mut session);
    assert_eq!(resolved.len(), 1, "fixture should resolve to one field");
    resolved.remove(0)
}
