use crate::{meta::LayoutMeta, row::Subject};
use fieldset_schema::types::FieldKey;
use std::collections::{BTreeMap, BTreeSet};

///
/// ResolveSession
///
/// Per-pass resolution state: the clone cycle guard and the layout-meta
/// read cache. Scoped to one resolution/render/save pass and dropped with
/// it, so repeated passes in the same process cannot interfere.
///

#[derive(Debug, Default)]
pub struct ResolveSession {
    in_progress: BTreeSet<FieldKey>,
    meta_cache: BTreeMap<(Subject, String), LayoutMeta>,
}

impl ResolveSession {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_progress: BTreeSet::new(),
            meta_cache: BTreeMap::new(),
        }
    }

    /// Mark a clone as in-progress. Returns `false` when the key is
    /// already being resolved, which is the cycle signal.
    pub(crate) fn enter(&mut self, key: FieldKey) -> bool {
        self.in_progress.insert(key)
    }

    pub(crate) fn exit(&mut self, key: &FieldKey) {
        self.in_progress.remove(key);
    }

    #[must_use]
    pub(crate) fn cached_meta(&self, subject: &Subject, name: &str) -> Option<&LayoutMeta> {
        self.meta_cache.get(&(subject.clone(), name.to_string()))
    }

    pub(crate) fn cache_meta(&mut self, subject: &Subject, name: &str, meta: LayoutMeta) {
        self.meta_cache
            .insert((subject.clone(), name.to_string()), meta);
    }
}
