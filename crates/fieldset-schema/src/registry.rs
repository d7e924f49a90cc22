use crate::{
    node::{FieldDef, FieldGroup, FieldKind},
    types::{FieldKey, GroupKey},
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("duplicate group key: {key}")]
    DuplicateGroup { key: GroupKey },
}

///
/// DefinitionStore
///
/// Registry of field groups and their field trees. Retrieval only; all
/// resolution logic lives in `fieldset-core`.
///

#[derive(Clone, Debug, Default)]
pub struct DefinitionStore {
    groups: BTreeMap<GroupKey, FieldGroup>,
}

impl DefinitionStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    pub fn insert_group(&mut self, group: FieldGroup) -> Result<(), RegistryError> {
        if self.groups.contains_key(&group.key) {
            return Err(RegistryError::DuplicateGroup { key: group.key });
        }

        self.groups.insert(group.key.clone(), group);
        Ok(())
    }

    #[must_use]
    pub fn group(&self, key: &GroupKey) -> Option<&FieldGroup> {
        self.groups.get(key)
    }

    pub fn groups(&self) -> impl Iterator<Item = &FieldGroup> {
        self.groups.values()
    }

    /// Look up a field by its stable key, descending into composite
    /// sub-trees so a clone selector can denote any nested field.
    #[must_use]
    pub fn field(&self, key: &FieldKey) -> Option<&FieldDef> {
        self.groups
            .values()
            .find_map(|group| find_in(&group.fields, key))
    }
}

fn find_in<'a>(fields: &'a [FieldDef], key: &FieldKey) -> Option<&'a FieldDef> {
    for field in fields {
        if &field.key == key {
            return Some(field);
        }

        let found = match &field.kind {
            FieldKind::Repeater { sub_fields, .. } | FieldKind::Group { sub_fields } => {
                find_in(sub_fields, key)
            }
            FieldKind::Flexible { layouts } => layouts
                .iter()
                .find_map(|layout| find_in(&layout.sub_fields, key)),
            // Clones own no sub-fields until resolution.
            FieldKind::Clone { .. } | FieldKind::Scalar(_) => None,
        };

        if found.is_some() {
            return found;
        }
    }

    None
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{node::Layout, types::ScalarKind};

    fn text(key: &str, name: &str) -> FieldDef {
        FieldDef::new(key, name, name, FieldKind::Scalar(ScalarKind::Text))
    }

    fn store() -> DefinitionStore {
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
                        layouts: vec![Layout::new(
                            "text_block",
                            "Text Block",
                            vec![text("fk_body", "body")],
                        )],
                    },
                )],
            ))
            .unwrap();
        store
    }

    #[test]
    fn field_lookup_descends_into_layouts() {
        let store = store();
        let field = store.field(&FieldKey::from("fk_body")).unwrap();
        assert_eq!(field.name, "body");
    }

    #[test]
    fn duplicate_group_key_is_rejected() {
        let mut store = store();
        let err = store
            .insert_group(FieldGroup::new("grp_content", "Content Again", vec![]))
            .unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateGroup { .. }));
    }

    #[test]
    fn missing_field_returns_none() {
        assert!(store().field(&FieldKey::from("fk_absent")).is_none());
    }
}
