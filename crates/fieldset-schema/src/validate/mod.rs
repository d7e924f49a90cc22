//! Definition-store validation orchestration and shared helpers.

pub mod naming;

use crate::{
    error::ErrorTree,
    node::{FieldDef, FieldKind, ValidateNode},
    registry::DefinitionStore,
};

/// Run full definition-store validation in a staged, deterministic order.
pub fn validate_store(store: &DefinitionStore) -> Result<(), ErrorTree> {
    // Phase 1: validate each node (structural + local invariants).
    let mut errors = validate_nodes(store);

    // Phase 2: enforce registry-wide invariants.
    validate_global(store, &mut errors);

    errors.result()
}

// Validate all nodes, composing route-aware paths while descending.
fn validate_nodes(store: &DefinitionStore) -> ErrorTree {
    let mut errs = ErrorTree::new();

    for group in store.groups() {
        if let Err(tree) = group.validate() {
            errs.merge(group.key.as_str(), tree);
        }

        for field in &group.fields {
            validate_field(field, group.key.as_str(), &mut errs);
        }
    }

    errs
}

fn validate_field(field: &FieldDef, prefix: &str, errs: &mut ErrorTree) {
    let path = format!("{prefix}.{}", field.name);

    if let Err(tree) = field.validate() {
        errs.merge(&path, tree);
    }

    match &field.kind {
        FieldKind::Repeater { sub_fields, .. } | FieldKind::Group { sub_fields } => {
            for sub in sub_fields {
                validate_field(sub, &path, errs);
            }
        }
        FieldKind::Flexible { layouts } => {
            for layout in layouts {
                let layout_path = format!("{path}[{}]", layout.tag);
                if let Err(tree) = layout.validate() {
                    errs.merge(&layout_path, tree);
                }
                for sub in &layout.sub_fields {
                    validate_field(sub, &layout_path, errs);
                }
            }
        }
        FieldKind::Clone { .. } | FieldKind::Scalar(_) => {}
    }
}

// Run global validation passes that require a full registry view.
fn validate_global(store: &DefinitionStore, errors: &mut ErrorTree) {
    naming::validate_key_uniqueness(store, errors);
    naming::validate_selector_targets(store, errors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        node::{FieldDef, FieldGroup},
        registry::DefinitionStore,
        types::ScalarKind,
    };

    #[test]
    fn every_bad_field_is_reported_with_its_own_path() {
        let mut store = DefinitionStore::new();
        store
            .insert_group(FieldGroup::new(
                "grp_hero",
                "Hero",
                vec![
                    FieldDef::new("fk_a", "BadName", "A", FieldKind::Scalar(ScalarKind::Text)),
                    FieldDef::new("fk_b", "also-bad", "B", FieldKind::Scalar(ScalarKind::Text)),
                ],
            ))
            .unwrap();

        let errs = validate_store(&store).unwrap_err();
        let rendered = errs.to_string();

        assert!(rendered.contains("grp_hero.BadName"));
        assert!(rendered.contains("grp_hero.also-bad"));
    }
}

/// Visit every field in the store depth-first with its route path.
pub(crate) fn walk_fields(store: &DefinitionStore, f: &mut impl FnMut(&FieldDef, &str)) {
    for group in store.groups() {
        for field in &group.fields {
            walk_field(field, group.key.as_str(), f);
        }
    }
}

fn walk_field(field: &FieldDef, prefix: &str, f: &mut impl FnMut(&FieldDef, &str)) {
    let path = format!("{prefix}.{}", field.name);
    f(field, &path);

    match &field.kind {
        FieldKind::Repeater { sub_fields, .. } | FieldKind::Group { sub_fields } => {
            for sub in sub_fields {
                walk_field(sub, &path, f);
            }
        }
        FieldKind::Flexible { layouts } => {
            for layout in layouts {
                let layout_path = format!("{path}[{}]", layout.tag);
                for sub in &layout.sub_fields {
                    walk_field(sub, &layout_path, f);
                }
            }
        }
        FieldKind::Clone { .. } | FieldKind::Scalar(_) => {}
    }
}
