//! Clone resolution feeding the codec: rewritten names drive storage keys,
//! so sibling clones of one field never share a value space.

mod common;

use common::{gallery_store, resolve_one};
use fieldset_core::{
    codec::{LoadExecutor, SaveExecutor},
    resolve::{ResolveSession, Resolver},
    row::{LoadMode, RowValue, RowsValue, Subject},
    store::{KeyStore, MemoryStore},
    value::Value,
};
use fieldset_schema::{
    node::{FieldDef, FieldGroup, FieldKind},
    registry::DefinitionStore,
    types::{CloneDisplay, FieldKey, Selector},
};

fn store_with_clones() -> DefinitionStore {
    let mut store = gallery_store();
    store
        .insert_group(FieldGroup::new(
            "grp_layout",
            "Layout",
            vec![
                FieldDef::new(
                    "fk_header",
                    "header",
                    "Header",
                    FieldKind::Clone {
                        selectors: vec![Selector::Field(FieldKey::from("fk_gallery"))],
                        display: CloneDisplay::Seamless,
                        prefix_name: true,
                        prefix_label: false,
                    },
                ),
                FieldDef::new(
                    "fk_footer",
                    "footer",
                    "Footer",
                    FieldKind::Clone {
                        selectors: vec![Selector::Field(FieldKey::from("fk_gallery"))],
                        display: CloneDisplay::Seamless,
                        prefix_name: true,
                        prefix_label: false,
                    },
                ),
            ],
        ))
        .unwrap();
    store
}

fn gallery_row(caption: &str) -> RowValue {
    RowValue::new()
        .with_scalar("fk_caption", Value::Text(caption.to_string()))
        .with_scalar("fk_image", Value::Uint(1))
}

#[test]
fn cloned_repeater_stores_under_prefixed_names() {
    let store_def = store_with_clones();
    let field = resolve_one(&store_def, "fk_header");
    let subject = Subject::from("post_1");
    let mut store = MemoryStore::new();
    let mut session = ResolveSession::new();

    assert_eq!(field.effective_name(), "header_gallery_list");

    let rows = RowsValue::from(vec![gallery_row("masthead")]);
    SaveExecutor::new(&mut store)
        .update(&mut session, &subject, &field, &rows)
        .unwrap();

    assert_eq!(
        store.read(&subject, "header_gallery_list"),
        Some(Value::Uint(1))
    );
    assert_eq!(
        store.read(&subject, "header_gallery_list_0_caption"),
        Some(Value::Text("masthead".into()))
    );

    let loaded = LoadExecutor::new(&store)
        .rows(&mut session, &subject, &field, LoadMode::Edit)
        .unwrap()
        .unwrap();
    assert_eq!(loaded, rows);
}

#[test]
fn sibling_clones_keep_disjoint_value_spaces() {
    let store_def = store_with_clones();
    let subject = Subject::from("post_1");
    let mut store = MemoryStore::new();
    let mut session = ResolveSession::new();
    let resolver = Resolver::new(&store_def);

    let header = resolver
        .resolve_field(store_def.field(&FieldKey::from("fk_header")).unwrap(), &mut session)
        .remove(0);
    let footer = resolver
        .resolve_field(store_def.field(&FieldKey::from("fk_footer")).unwrap(), &mut session)
        .remove(0);

    assert_ne!(header.effective_key(), footer.effective_key());

    SaveExecutor::new(&mut store)
        .update(
            &mut session,
            &subject,
            &header,
            &RowsValue::from(vec![gallery_row("top")]),
        )
        .unwrap();
    SaveExecutor::new(&mut store)
        .update(
            &mut session,
            &subject,
            &footer,
            &RowsValue::from(vec![gallery_row("bottom")]),
        )
        .unwrap();

    assert_eq!(
        store.read(&subject, "header_gallery_list_0_caption"),
        Some(Value::Text("top".into()))
    );
    assert_eq!(
        store.read(&subject, "footer_gallery_list_0_caption"),
        Some(Value::Text("bottom".into()))
    );
}
