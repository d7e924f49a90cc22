use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// MapValueError
///
/// Invariant violations for `Value::Map` construction.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MapValueError {
    #[error("map key at index {index} is empty")]
    EmptyKey { index: usize },

    #[error("map contains duplicate key '{key}'")]
    DuplicateKey { key: String },
}

///
/// Value
///
/// The persisted value space. Row-count markers are `Uint`, flexible layout
/// order is `List` of `Text` tags, layout meta records are `Map`.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[remain::sorted]
pub enum Value {
    Bool(bool),
    Float(f64),
    Int(i64),
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
    Null,
    Text(String),
    Uint(u64),
}

impl Value {
    /// Build a `Map` value, rejecting empty and duplicate keys.
    pub fn map_from_pairs(
        pairs: impl IntoIterator<Item = (String, Self)>,
    ) -> Result<Self, MapValueError> {
        let mut out: Vec<(String, Self)> = Vec::new();

        for (index, (key, value)) in pairs.into_iter().enumerate() {
            if key.is_empty() {
                return Err(MapValueError::EmptyKey { index });
            }
            if out.iter().any(|(k, _)| *k == key) {
                return Err(MapValueError::DuplicateKey { key });
            }
            out.push((key, value));
        }

        Ok(Self::Map(out))
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&[(String, Self)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a map entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map()?
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }
}

///
/// TESTS
///
