use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    row::Subject,
    value::Value,
};
use derive_more::{Deref, DerefMut};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("write rejected for '{name}': {reason}")]
    WriteRejected { name: String, reason: String },

    #[error("remove rejected for '{name}': {reason}")]
    RemoveRejected { name: String, reason: String },
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Store, err.to_string())
    }
}

///
/// KeyStore
///
/// Flat, string-keyed persistence boundary. The codec never sees anything
/// richer than read/write/remove of one named value per subject.
///

pub trait KeyStore {
    fn read(&self, subject: &Subject, name: &str) -> Option<Value>;

    fn write(&mut self, subject: &Subject, name: &str, value: Value) -> Result<(), StoreError>;

    fn remove(&mut self, subject: &Subject, name: &str) -> Result<(), StoreError>;
}

///
/// MemoryStore
///

#[derive(Debug, Default, Deref, DerefMut)]
pub struct MemoryStore(BTreeMap<(Subject, String), Value>);

impl MemoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Names stored for a subject, in key order.
    pub fn names_for<'a>(&'a self, subject: &'a Subject) -> impl Iterator<Item = &'a str> {
        self.0
            .keys()
            .filter(move |(s, _)| s == subject)
            .map(|(_, name)| name.as_str())
    }
}

impl KeyStore for MemoryStore {
    fn read(&self, subject: &Subject, name: &str) -> Option<Value> {
        self.0.get(&(subject.clone(), name.to_string())).cloned()
    }

    fn write(&mut self, subject: &Subject, name: &str, value: Value) -> Result<(), StoreError> {
        self.0.insert((subject.clone(), name.to_string()), value);
        Ok(())
    }

    fn remove(&mut self, subject: &Subject, name: &str) -> Result<(), StoreError> {
        self.0.remove(&(subject.clone(), name.to_string()));
        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_one_value() {
        let subject = Subject::from("post_1");
        let mut store = MemoryStore::new();

        store
            .write(&subject, "gallery", Value::Uint(2))
            .unwrap();
        assert_eq!(store.read(&subject, "gallery"), Some(Value::Uint(2)));

        store.remove(&subject, "gallery").unwrap();
        assert_eq!(store.read(&subject, "gallery"), None);
    }

    #[test]
    fn names_for_filters_by_subject() {
        let a = Subject::from("post_a");
        let b = Subject::from("post_b");
        let mut store = MemoryStore::new();

        store.write(&a, "title", Value::Text("x".into())).unwrap();
        store.write(&b, "title", Value::Text("y".into())).unwrap();

        let names: Vec<&str> = store.names_for(&a).collect();
        assert_eq!(names, vec!["title"]);
    }
}
