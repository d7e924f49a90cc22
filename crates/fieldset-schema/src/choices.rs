use crate::registry::DefinitionStore;
use serde::Serialize;

///
/// Choice
///
/// One pickable clone target: either a field key or a field-group key.
///

#[derive(Clone, Debug, Serialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

///
/// ChoiceGroup
///

#[derive(Clone, Debug, Serialize)]
pub struct ChoiceGroup {
    pub label: String,
    pub children: Vec<Choice>,
}

/// Build the hierarchical clone-selector picker list: one group per field
/// group, the group itself first, then its top-level fields. An optional
/// query filters children by case-insensitive label match; groups with no
/// surviving children are dropped.
#[must_use]
pub fn selector_choices(store: &DefinitionStore, query: Option<&str>) -> Vec<ChoiceGroup> {
    let needle = query.map(str::to_lowercase);
    let mut out = Vec::new();

    for group in store.groups() {
        let mut children = Vec::new();

        let all_label = format!("{} (all fields)", group.title);
        if matches(&all_label, needle.as_deref()) {
            children.push(Choice {
                id: group.key.to_string(),
                label: all_label,
            });
        }

        for field in &group.fields {
            if matches(&field.label, needle.as_deref()) {
                children.push(Choice {
                    id: field.key.to_string(),
                    label: field.label.clone(),
                });
            }
        }

        if !children.is_empty() {
            out.push(ChoiceGroup {
                label: group.title.clone(),
                children,
            });
        }
    }

    out
}

fn matches(label: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|n| label.to_lowercase().contains(n))
}

///
/// TESTS
///
