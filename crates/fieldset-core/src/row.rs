use crate::value::Value;
use derive_more::Display;
use fieldset_schema::types::LayoutTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Subject
///
/// The entity a set of field values belongs to (a post, a page, an options
/// screen). Opaque to the codec beyond identity.
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Subject(String);

impl Subject {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Subject {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

///
/// LoadMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Editing surface: disabled rows are retained and flagged.
    Edit,
    /// Public-facing output: disabled rows are excluded entirely.
    Output,
}

///
/// SubValue
///
/// One sub-field's in-memory value: a scalar leaf, or the nested rows of a
/// composite sub-field.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SubValue {
    Scalar(Value),
    Rows(RowsValue),
}

impl SubValue {
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Rows(_) => None,
        }
    }

    #[must_use]
    pub const fn as_rows(&self) -> Option<&RowsValue> {
        match self {
            Self::Rows(rows) => Some(rows),
            Self::Scalar(_) => None,
        }
    }
}

///
/// RowValue
///
/// One row of a composite field's value. `entries` is keyed by sub-field
/// effective key. `disabled` and `custom_label` travel with the row on the
/// editing surface but are persisted in the layout-meta side record, never
/// in any sub-field's own value space.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowValue {
    pub layout: Option<LayoutTag>,
    pub entries: BTreeMap<String, SubValue>,
    pub disabled: bool,
    pub custom_label: Option<String>,
}

impl RowValue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            layout: None,
            entries: BTreeMap::new(),
            disabled: false,
            custom_label: None,
        }
    }

    #[must_use]
    pub fn with_layout(mut self, tag: impl Into<LayoutTag>) -> Self {
        self.layout = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: SubValue) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_scalar(self, key: impl Into<String>, value: Value) -> Self {
        self.with_entry(key, SubValue::Scalar(value))
    }

    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn scalar(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)?.as_scalar()
    }
}

///
/// RowsValue
///
/// Ordered rows of one composite field. Rows are owned by the field's value
/// and have no independent lifecycle.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowsValue(Vec<RowValue>);

impl RowsValue {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, row: RowValue) {
        self.0.push(row);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RowValue> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowValue> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, RowValue> {
        self.0.iter_mut()
    }
}

impl From<Vec<RowValue>> for RowsValue {
    fn from(rows: Vec<RowValue>) -> Self {
        Self(rows)
    }
}

impl FromIterator<RowValue> for RowsValue {
    fn from_iter<I: IntoIterator<Item = RowValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RowsValue {
    type Item = &'a RowValue;
    type IntoIter = std::slice::Iter<'a, RowValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
