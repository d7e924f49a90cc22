use crate::{
    error::InternalError,
    resolve::ResolveSession,
    row::Subject,
    store::KeyStore,
    value::Value,
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

/// Derived storage key for a flexible field's side record.
#[must_use]
pub fn layout_meta_key(name: &str) -> String {
    format!("_{name}_layout_meta")
}

///
/// MetaDecodeError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum MetaDecodeError {
    #[error("layout meta record is not a map")]
    NotAMap,

    #[error("layout meta '{entry}' entry is malformed")]
    BadEntry { entry: &'static str },
}

///
/// LayoutMeta
///
/// Auxiliary per-row state for flexible fields: which row indices are
/// disabled, and custom display-label overrides. Rewritten in full on every
/// save of the parent field; read once per resolution session.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LayoutMeta {
    pub disabled: BTreeSet<usize>,
    pub renamed: BTreeMap<usize, String>,
}

impl LayoutMeta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.disabled.is_empty() && self.renamed.is_empty()
    }

    #[must_use]
    pub fn is_disabled(&self, index: usize) -> bool {
        self.disabled.contains(&index)
    }

    #[must_use]
    pub fn label_for(&self, index: usize) -> Option<&str> {
        self.renamed.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        let disabled = Value::List(
            self.disabled
                .iter()
                .map(|&index| Value::Uint(index as u64))
                .collect(),
        );
        let renamed = Value::Map(
            self.renamed
                .iter()
                .map(|(index, label)| (index.to_string(), Value::Text(label.clone())))
                .collect(),
        );

        Value::Map(vec![
            ("disabled".to_string(), disabled),
            ("renamed".to_string(), renamed),
        ])
    }

    pub fn try_from_value(value: &Value) -> Result<Self, MetaDecodeError> {
        let map = value.as_map().ok_or(MetaDecodeError::NotAMap)?;
        let mut meta = Self::default();

        if let Some(disabled) = map.iter().find_map(|(k, v)| (k == "disabled").then_some(v)) {
            let items = disabled
                .as_list()
                .ok_or(MetaDecodeError::BadEntry { entry: "disabled" })?;
            for item in items {
                let index = item
                    .as_uint()
                    .ok_or(MetaDecodeError::BadEntry { entry: "disabled" })?;
                meta.disabled.insert(index as usize);
            }
        }

        if let Some(renamed) = map.iter().find_map(|(k, v)| (k == "renamed").then_some(v)) {
            let entries = renamed
                .as_map()
                .ok_or(MetaDecodeError::BadEntry { entry: "renamed" })?;
            for (index, label) in entries {
                let index: usize = index
                    .parse()
                    .map_err(|_| MetaDecodeError::BadEntry { entry: "renamed" })?;
                let label = label
                    .as_text()
                    .ok_or(MetaDecodeError::BadEntry { entry: "renamed" })?;
                meta.renamed.insert(index, label.to_string());
            }
        }

        Ok(meta)
    }

    /// Read the record for one field, through the session cache.
    pub fn load(
        store: &impl KeyStore,
        session: &mut ResolveSession,
        subject: &Subject,
        name: &str,
    ) -> Result<Self, InternalError> {
        if let Some(meta) = session.cached_meta(subject, name) {
            return Ok(meta.clone());
        }

        let meta = match store.read(subject, &layout_meta_key(name)) {
            Some(value) => Self::try_from_value(&value).map_err(|err| {
                InternalError::meta_corruption(format!("layout meta for '{name}': {err}"))
            })?,
            None => Self::default(),
        };

        session.cache_meta(subject, name, meta.clone());
        Ok(meta)
    }

    /// Fully replace the stored record. An empty record removes the key.
    pub fn store(
        &self,
        store: &mut impl KeyStore,
        session: &mut ResolveSession,
        subject: &Subject,
        name: &str,
    ) -> Result<(), InternalError> {
        if self.is_empty() {
            store.remove(subject, &layout_meta_key(name))?;
        } else {
            store.write(subject, &layout_meta_key(name), self.to_value())?;
        }

        session.cache_meta(subject, name, self.clone());
        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn sample() -> LayoutMeta {
        let mut meta = LayoutMeta::default();
        meta.disabled.insert(1);
        meta.renamed.insert(2, "Closing block".to_string());
        meta
    }

    #[test]
    fn value_round_trip() {
        let meta = sample();
        let decoded = LayoutMeta::try_from_value(&meta.to_value()).unwrap();
        assert_eq!(decoded, meta);
    }

    #[test]
    fn corrupt_record_is_rejected() {
        let err = LayoutMeta::try_from_value(&Value::Text("nope".into())).unwrap_err();
        assert_eq!(err, MetaDecodeError::NotAMap);

        let bad = Value::Map(vec![("disabled".to_string(), Value::Text("x".into()))]);
        assert!(LayoutMeta::try_from_value(&bad).is_err());
    }

    #[test]
    fn load_reads_store_once_per_session() {
        let subject = Subject::from("post_1");
        let mut store = MemoryStore::new();
        let mut session = ResolveSession::new();

        sample()
            .store(&mut store, &mut session, &subject, "blocks")
            .unwrap();

        // Remove behind the cache's back; the session still serves the
        // cached record.
        store.clear();

        let meta = LayoutMeta::load(&store, &mut session, &subject, "blocks").unwrap();
        assert_eq!(meta, sample());

        // A fresh session observes the store.
        let mut fresh = ResolveSession::new();
        let meta = LayoutMeta::load(&store, &mut fresh, &subject, "blocks").unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn empty_meta_removes_stored_key() {
        let subject = Subject::from("post_1");
        let mut store = MemoryStore::new();
        let mut session = ResolveSession::new();

        sample()
            .store(&mut store, &mut session, &subject, "blocks")
            .unwrap();
        assert!(store.read(&subject, "_blocks_layout_meta").is_some());

        let mut fresh = ResolveSession::new();
        LayoutMeta::default()
            .store(&mut store, &mut fresh, &subject, "blocks")
            .unwrap();
        assert!(store.read(&subject, "_blocks_layout_meta").is_none());
    }
}
