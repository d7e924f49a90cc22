use crate::{MAX_FIELD_NAME_LEN, err, prelude::*};
use convert_case::{Case, Casing};
use std::collections::BTreeMap;

///
/// FieldDef
///
/// One field definition node. `key` is the stable identity; `name` is the
/// storage-facing identifier an operator may rename; `origin_name` keeps the
/// value `name` had when the field was created, so logic that must recognize
/// the "same" field across renames and resolution passes still can.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FieldDef {
    pub key: FieldKey,
    pub name: String,
    pub origin_name: String,
    pub label: String,
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<FieldKey>,

    pub kind: FieldKind,
}

impl FieldDef {
    pub fn new(
        key: impl Into<FieldKey>,
        name: impl Into<String>,
        label: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        let name = name.into();

        Self {
            key: key.into(),
            origin_name: name.clone(),
            name,
            label: label.into(),
            required: false,
            parent: None,
            kind,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<FieldKey>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Rename the storage-facing identifier, preserving `origin_name`.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::Repeater { .. }
                | FieldKind::Flexible { .. }
                | FieldKind::Clone { .. }
                | FieldKind::Group { .. }
        )
    }

    /// Direct children, for kinds that own them. Clones own nothing until
    /// resolution; flexible children belong to layouts.
    #[must_use]
    pub fn sub_fields(&self) -> &[Self] {
        match &self.kind {
            FieldKind::Repeater { sub_fields, .. } | FieldKind::Group { sub_fields } => sub_fields,
            _ => &[],
        }
    }
}

impl ValidateNode for FieldDef {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.name.is_empty() {
            err!(errs, "field name is empty");
        } else if self.name.len() > MAX_FIELD_NAME_LEN {
            err!(
                errs,
                "field name '{}' exceeds {MAX_FIELD_NAME_LEN} characters",
                self.name
            );
        } else if self.name != self.name.to_case(Case::Snake) {
            err!(errs, "field name '{}' is not snake_case", self.name);
        }

        match &self.kind {
            FieldKind::Repeater { sub_fields, bounds } => {
                if bounds.is_inverted() {
                    err!(
                        errs,
                        "row bounds are inverted: min {:?} > max {:?}",
                        bounds.min,
                        bounds.max
                    );
                }
                check_sibling_names(sub_fields, &mut errs);
            }
            FieldKind::Flexible { layouts } => {
                if layouts.is_empty() {
                    err!(errs, "flexible field defines no layouts");
                }

                let mut seen: BTreeMap<&str, ()> = BTreeMap::new();
                for layout in layouts {
                    if seen.insert(layout.tag.as_str(), ()).is_some() {
                        err!(errs, "duplicate layout tag '{}'", layout.tag);
                    }
                }
            }
            FieldKind::Clone { selectors, .. } => {
                if selectors.is_empty() {
                    err!(errs, "clone field has no selectors");
                }
            }
            FieldKind::Group { sub_fields } => {
                check_sibling_names(sub_fields, &mut errs);
            }
            FieldKind::Scalar(_) => {}
        }

        errs.result()
    }
}

/// Sibling names must be unique: they share one storage prefix.
pub(crate) fn check_sibling_names(fields: &[FieldDef], errs: &mut ErrorTree) {
    let mut seen: BTreeMap<&str, ()> = BTreeMap::new();

    for field in fields {
        if seen.insert(field.name.as_str(), ()).is_some() {
            err!(errs, "duplicate sibling field name '{}'", field.name);
        }
    }
}

///
/// FieldKind
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum FieldKind {
    Scalar(ScalarKind),

    /// Ordered rows with one fixed shape.
    Repeater {
        sub_fields: Vec<FieldDef>,
        bounds: RowBounds,
    },

    /// Ordered rows whose shape each row selects from the named layouts.
    Flexible { layouts: Vec<Layout> },

    /// Stands in for other fields; replaced at resolution time.
    Clone {
        selectors: Vec<Selector>,
        display: CloneDisplay,
        prefix_name: bool,
        prefix_label: bool,
    },

    /// Plain named container; the codec treats it as a single implicit row.
    Group { sub_fields: Vec<FieldDef> },
}

///
/// TESTS
///
