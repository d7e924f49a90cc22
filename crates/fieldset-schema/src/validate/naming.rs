use crate::{
    err,
    error::ErrorTree,
    node::FieldKind,
    registry::DefinitionStore,
    types::{FieldKey, Selector},
    validate::walk_fields,
};
use std::collections::BTreeMap;

/// Field keys must be unique across the whole registry: one resolution pass
/// may pull fields from several groups into a single value space.
pub fn validate_key_uniqueness(store: &DefinitionStore, errs: &mut ErrorTree) {
    let mut by_key: BTreeMap<FieldKey, String> = BTreeMap::new();

    walk_fields(store, &mut |field, path| {
        if let Some(prev) = by_key.insert(field.key.clone(), path.to_string()) {
            err!(
                errs,
                "duplicate field key '{}' for '{prev}' and '{path}'",
                field.key
            );
        }
    });
}

/// Dangling selectors are dropped silently at resolution time; surface them
/// here so the operator can see the drift.
pub fn validate_selector_targets(store: &DefinitionStore, errs: &mut ErrorTree) {
    let mut checks: Vec<(String, Selector)> = Vec::new();

    walk_fields(store, &mut |field, path| {
        if let FieldKind::Clone { selectors, .. } = &field.kind {
            for selector in selectors {
                checks.push((path.to_string(), selector.clone()));
            }
        }
    });

    for (path, selector) in checks {
        match &selector {
            Selector::Field(key) => {
                if store.field(key).is_none() {
                    errs.add_at(&path, format!("clone selector field '{key}' does not resolve"));
                }
            }
            Selector::Group(key) => {
                if store.group(key).is_none() {
                    errs.add_at(&path, format!("clone selector group '{key}' does not resolve"));
                }
            }
        }
    }
}

///
/// TESTS
///
