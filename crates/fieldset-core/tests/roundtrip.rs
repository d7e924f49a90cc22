//! Repeater codec round-trip and cleanup coverage.

mod common;

use common::{gallery_store, resolve_one, text};
use fieldset_core::{
    codec::{DeleteExecutor, LoadExecutor, SaveExecutor},
    resolve::ResolveSession,
    row::{LoadMode, RowValue, RowsValue, SubValue, Subject},
    store::{KeyStore, MemoryStore, StoreError},
    value::Value,
};
use fieldset_schema::{
    node::{FieldDef, FieldGroup, FieldKind},
    registry::DefinitionStore,
    types::RowBounds,
};
use proptest::prelude::*;

fn gallery_row(caption: &str, image: u64) -> RowValue {
    RowValue::new()
        .with_scalar("fk_caption", Value::Text(caption.to_string()))
        .with_scalar("fk_image", Value::Uint(image))
}

#[test]
fn save_two_rows_load_two_rows() {
    let store_def = gallery_store();
    let field = resolve_one(&store_def, "fk_gallery");
    let subject = Subject::from("post_1");
    let mut store = MemoryStore::new();
    let mut session = ResolveSession::new();

    let rows = RowsValue::from(vec![gallery_row("first", 10), gallery_row("second", 11)]);
    SaveExecutor::new(&mut store)
        .update(&mut session, &subject, &field, &rows)
        .unwrap();

    let loaded = LoadExecutor::new(&store)
        .rows(&mut session, &subject, &field, LoadMode::Edit)
        .unwrap()
        .unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(
        loaded.get(0).unwrap().scalar("fk_caption"),
        Some(&Value::Text("first".to_string()))
    );
    assert_eq!(
        loaded.get(1).unwrap().scalar("fk_image"),
        Some(&Value::Uint(11))
    );

    // Wire scheme: marker plus one key per sub-field per row.
    assert_eq!(store.read(&subject, "gallery_list"), Some(Value::Uint(2)));
    assert_eq!(
        store.read(&subject, "gallery_list_0_caption"),
        Some(Value::Text("first".to_string()))
    );
    assert_eq!(
        store.read(&subject, "gallery_list_1_image"),
        Some(Value::Uint(11))
    );
}

#[test]
fn shrinking_row_count_sweeps_orphaned_keys() {
    let store_def = gallery_store();
    let field = resolve_one(&store_def, "fk_gallery");
    let subject = Subject::from("post_1");
    let mut store = MemoryStore::new();
    let mut session = ResolveSession::new();

    let rows = RowsValue::from(vec![gallery_row("first", 10), gallery_row("second", 11)]);
    SaveExecutor::new(&mut store)
        .update(&mut session, &subject, &field, &rows)
        .unwrap();

    let rows = RowsValue::from(vec![gallery_row("only", 20)]);
    SaveExecutor::new(&mut store)
        .update(&mut session, &subject, &field, &rows)
        .unwrap();

    let loaded = LoadExecutor::new(&store)
        .rows(&mut session, &subject, &field, LoadMode::Edit)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.len(), 1);

    // The second row's former keys are gone.
    assert!(!store.names_for(&subject).any(|name| name.starts_with("gallery_list_1_")));
}

#[test]
fn absent_entry_leaves_stored_value_untouched() {
    let store_def = gallery_store();
    let field = resolve_one(&store_def, "fk_gallery");
    let subject = Subject::from("post_1");
    let mut store = MemoryStore::new();
    let mut session = ResolveSession::new();

    let rows = RowsValue::from(vec![gallery_row("first", 10)]);
    SaveExecutor::new(&mut store)
        .update(&mut session, &subject, &field, &rows)
        .unwrap();

    // Second save: the caption entry is absent (hidden by a display-time
    // condition), not Null.
    let partial = RowsValue::from(vec![
        RowValue::new().with_scalar("fk_image", Value::Uint(99)),
    ]);
    SaveExecutor::new(&mut store)
        .update(&mut session, &subject, &field, &partial)
        .unwrap();

    assert_eq!(
        store.read(&subject, "gallery_list_0_caption"),
        Some(Value::Text("first".to_string()))
    );
    assert_eq!(store.read(&subject, "gallery_list_0_image"), Some(Value::Uint(99)));
}

#[test]
fn delete_removes_every_row_key_and_the_marker() {
    let store_def = gallery_store();
    let field = resolve_one(&store_def, "fk_gallery");
    let subject = Subject::from("post_1");
    let mut store = MemoryStore::new();
    let mut session = ResolveSession::new();

    let rows = RowsValue::from(vec![gallery_row("first", 10), gallery_row("second", 11)]);
    SaveExecutor::new(&mut store)
        .update(&mut session, &subject, &field, &rows)
        .unwrap();

    DeleteExecutor::new(&mut store)
        .delete(&mut session, &subject, &field)
        .unwrap();

    assert_eq!(store.names_for(&subject).count(), 0);
}

#[test]
fn nested_repeater_round_trips() {
    let mut store_def = DefinitionStore::new();
    store_def
        .insert_group(FieldGroup::new(
            "grp_sections",
            "Sections",
            vec![FieldDef::new(
                "fk_sections",
                "sections",
                "Sections",
                FieldKind::Repeater {
                    sub_fields: vec![
                        text("fk_heading", "heading"),
                        FieldDef::new(
                            "fk_links",
                            "links",
                            "Links",
                            FieldKind::Repeater {
                                sub_fields: vec![text("fk_url", "url")],
                                bounds: RowBounds::default(),
                            },
                        ),
                    ],
                    bounds: RowBounds::default(),
                },
            )],
        ))
        .unwrap();

    let field = resolve_one(&store_def, "fk_sections");
    let subject = Subject::from("post_1");
    let mut store = MemoryStore::new();
    let mut session = ResolveSession::new();

    let links = RowsValue::from(vec![
        RowValue::new().with_scalar("fk_url", Value::Text("https://a".into())),
        RowValue::new().with_scalar("fk_url", Value::Text("https://b".into())),
    ]);
    let rows = RowsValue::from(vec![
        RowValue::new()
            .with_scalar("fk_heading", Value::Text("Top".into()))
            .with_entry("fk_links", SubValue::Rows(links.clone())),
    ]);

    SaveExecutor::new(&mut store)
        .update(&mut session, &subject, &field, &rows)
        .unwrap();

    // Nested keys follow the same scheme, recursively.
    assert_eq!(store.read(&subject, "sections_0_links"), Some(Value::Uint(2)));
    assert_eq!(
        store.read(&subject, "sections_0_links_1_url"),
        Some(Value::Text("https://b".into()))
    );

    let loaded = LoadExecutor::new(&store)
        .rows(&mut session, &subject, &field, LoadMode::Edit)
        .unwrap()
        .unwrap();
    assert_eq!(
        loaded.get(0).unwrap().entries.get("fk_links"),
        Some(&SubValue::Rows(links))
    );
}

///
/// FailingStore
/// Fails every write after the first N, for marker-ordering coverage.
///

struct FailingStore {
    inner: MemoryStore,
    writes_left: usize,
}

impl KeyStore for FailingStore {
    fn read(&self, subject: &Subject, name: &str) -> Option<Value> {
        self.inner.read(subject, name)
    }

    fn write(&mut self, subject: &Subject, name: &str, value: Value) -> Result<(), StoreError> {
        if self.writes_left == 0 {
            return Err(StoreError::WriteRejected {
                name: name.to_string(),
                reason: "store full".to_string(),
            });
        }
        self.writes_left -= 1;
        self.inner.write(subject, name, value)
    }

    fn remove(&mut self, subject: &Subject, name: &str) -> Result<(), StoreError> {
        self.inner.remove(subject, name)
    }
}

#[test]
fn failed_partial_write_never_advertises_unwritten_rows() {
    let store_def = gallery_store();
    let field = resolve_one(&store_def, "fk_gallery");
    let subject = Subject::from("post_1");
    let mut session = ResolveSession::new();

    // Three rows need six sub-field writes plus the marker; allow four.
    let mut store = FailingStore {
        inner: MemoryStore::new(),
        writes_left: 4,
    };
    let rows = RowsValue::from(vec![
        gallery_row("a", 1),
        gallery_row("b", 2),
        gallery_row("c", 3),
    ]);

    let err = SaveExecutor::new(&mut store)
        .update(&mut session, &subject, &field, &rows)
        .unwrap_err();
    assert!(err.to_string().contains("store full"));

    // The marker is written last, so no count advertises the torn write.
    assert_eq!(store.inner.read(&subject, "gallery_list"), None);

    // A load sees an unsaved field, not a half-written one.
    let loaded = LoadExecutor::new(&store.inner)
        .rows(&mut session, &subject, &field, LoadMode::Edit)
        .unwrap();
    assert!(loaded.is_none());
}

proptest! {
    /// `load(update(V))` reproduces `V` for any full row set consistent
    /// with the gallery shape.
    #[test]
    fn update_then_load_round_trips(
        rows in proptest::collection::vec(("[a-z]{0,12}", 0u64..1000), 0..6)
    ) {
        let store_def = gallery_store();
        let field = resolve_one(&store_def, "fk_gallery");
        let subject = Subject::from("post_prop");
        let mut store = MemoryStore::new();
        let mut session = ResolveSession::new();

        let value: RowsValue = rows
            .iter()
            .map(|(caption, image)| gallery_row(caption, *image))
            .collect();

        SaveExecutor::new(&mut store)
            .update(&mut session, &subject, &field, &value)
            .unwrap();

        let loaded = LoadExecutor::new(&store)
            .rows(&mut session, &subject, &field, LoadMode::Edit)
            .unwrap()
            .unwrap();

        prop_assert_eq!(loaded, value);
    }
}
