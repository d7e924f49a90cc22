use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// FieldKey
///
/// Globally stable, immutable field identifier. Unlike `name`, a key never
/// changes after the field is created.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct FieldKey(String);

impl FieldKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

///
/// GroupKey
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct GroupKey(String);

impl GroupKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

///
/// LayoutTag
///
/// Name of a flexible-field layout, persisted per row as the row's shape
/// selector.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct LayoutTag(String);

impl LayoutTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LayoutTag {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

///
/// ScalarKind
///
/// Leaf input kinds. Rendering is external; the kind only drives value
/// formatting and validation.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, PartialEq, Serialize)]
#[remain::sorted]
pub enum ScalarKind {
    Bool,
    Image,
    Number,
    Select,
    Text,
    Url,
}

///
/// CloneDisplay
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize)]
pub enum CloneDisplay {
    /// The clone's container disappears; its resolved sub-fields take its
    /// place directly in the parent's field list.
    #[default]
    Seamless,
    /// The clone renders as a named group wrapping its resolved sub-fields.
    Grouped,
}

///
/// Selector
///
/// One clone target: a single field, or an entire field group (which
/// expands to all of that group's top-level fields).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Selector {
    Field(FieldKey),
    Group(GroupKey),
}

///
/// RowBounds
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RowBounds {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl RowBounds {
    #[must_use]
    pub const fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(lo), Some(hi)) if lo > hi)
    }

    #[must_use]
    pub fn below_min(&self, count: usize) -> bool {
        self.min.is_some_and(|lo| count < lo as usize)
    }

    #[must_use]
    pub fn above_max(&self, count: usize) -> bool {
        self.max.is_some_and(|hi| count > hi as usize)
    }
}

///
/// TESTS
///
