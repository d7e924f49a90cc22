//! Composite value codec: `load`, `format`, `update`, `delete` over a flat
//! key-value store. Repeater and flexible fields share the traversal; they
//! differ only in how a row's shape is chosen.

mod format;
mod keys;

pub use format::{format_rows, format_scalar};
pub use keys::{group_scoped_name, row_scoped_name};

use crate::{
    error::InternalError,
    meta::LayoutMeta,
    obs::sink::{self, ExecKind, MetricsEvent, Span},
    resolve::{ResolveSession, ResolvedField, ResolvedKind, ResolvedLayout},
    row::{LoadMode, RowValue, RowsValue, SubValue, Subject},
    store::KeyStore,
    value::Value,
};
use fieldset_schema::types::LayoutTag;

///
/// LoadExecutor
///

pub struct LoadExecutor<'a, S: KeyStore> {
    store: &'a S,
}

impl<'a, S: KeyStore> LoadExecutor<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load a composite field's rows. Returns `None` when the field was
    /// never saved (no marker present).
    pub fn rows(
        &self,
        session: &mut ResolveSession,
        subject: &Subject,
        field: &ResolvedField,
        mode: LoadMode,
    ) -> Result<Option<RowsValue>, InternalError> {
        let mut span = Span::new(ExecKind::Load);

        let out = self.rows_at(session, subject, field, field.effective_name(), mode)?;
        if let Some(rows) = &out {
            span.set_rows(rows.len() as u64);
        }

        Ok(out)
    }

    fn rows_at(
        &self,
        session: &mut ResolveSession,
        subject: &Subject,
        field: &ResolvedField,
        stored_name: &str,
        mode: LoadMode,
    ) -> Result<Option<RowsValue>, InternalError> {
        match &field.kind {
            ResolvedKind::Repeater { sub_fields, .. } => {
                self.repeater_rows(session, subject, sub_fields, stored_name, mode)
            }
            ResolvedKind::Flexible { layouts } => {
                self.flexible_rows(session, subject, layouts, stored_name, mode)
            }
            ResolvedKind::Group { sub_fields } => {
                self.group_rows(session, subject, sub_fields, stored_name, mode)
            }
            ResolvedKind::Scalar(_) => Err(InternalError::codec_invariant(format!(
                "load called on scalar field '{stored_name}'"
            ))),
        }
    }

    fn repeater_rows(
        &self,
        session: &mut ResolveSession,
        subject: &Subject,
        sub_fields: &[ResolvedField],
        stored_name: &str,
        mode: LoadMode,
    ) -> Result<Option<RowsValue>, InternalError> {
        // All selectors dangling: the field is a no-op.
        if sub_fields.is_empty() {
            return Ok(None);
        }

        let Some(marker) = self.store.read(subject, stored_name) else {
            return Ok(None);
        };
        let count = read_count(&marker, stored_name)?;

        let mut rows = RowsValue::new();
        for index in 0..count {
            rows.push(self.read_row(session, subject, sub_fields, stored_name, index, mode)?);
        }

        Ok(Some(rows))
    }

    fn flexible_rows(
        &self,
        session: &mut ResolveSession,
        subject: &Subject,
        layouts: &[ResolvedLayout],
        stored_name: &str,
        mode: LoadMode,
    ) -> Result<Option<RowsValue>, InternalError> {
        if layouts.is_empty() {
            return Ok(None);
        }

        let Some(marker) = self.store.read(subject, stored_name) else {
            return Ok(None);
        };
        let tags = read_tags(&marker, stored_name)?;
        let meta = LayoutMeta::load(self.store, session, subject, stored_name)?;

        let mut rows = RowsValue::new();
        for (index, tag) in tags.iter().enumerate() {
            if mode == LoadMode::Output && meta.is_disabled(index) {
                continue;
            }

            // A stored tag whose layout was removed from the definition:
            // skip the row, never abort the load.
            let Some(layout) = layouts.iter().find(|layout| layout.matches(tag)) else {
                sink::record(MetricsEvent::LayoutSkipped);
                continue;
            };

            let mut row =
                self.read_row(session, subject, &layout.sub_fields, stored_name, index, mode)?;
            row.layout = Some(tag.clone());
            row.disabled = meta.is_disabled(index);
            row.custom_label = meta.label_for(index).map(str::to_string);
            rows.push(row);
        }

        Ok(Some(rows))
    }

    fn group_rows(
        &self,
        session: &mut ResolveSession,
        subject: &Subject,
        sub_fields: &[ResolvedField],
        stored_name: &str,
        mode: LoadMode,
    ) -> Result<Option<RowsValue>, InternalError> {
        if sub_fields.is_empty() {
            return Ok(None);
        }

        if self.store.read(subject, stored_name).is_none() {
            return Ok(None);
        }

        let mut row = RowValue::new();
        for sub in sub_fields {
            let name = group_scoped_name(stored_name, sub.effective_name());
            row.entries.insert(
                sub.effective_key().to_string(),
                self.read_sub(session, subject, sub, &name, mode)?,
            );
        }

        Ok(Some(RowsValue::from(vec![row])))
    }

    fn read_row(
        &self,
        session: &mut ResolveSession,
        subject: &Subject,
        sub_fields: &[ResolvedField],
        base: &str,
        index: usize,
        mode: LoadMode,
    ) -> Result<RowValue, InternalError> {
        let mut row = RowValue::new();

        for sub in sub_fields {
            let name = row_scoped_name(base, index, sub.effective_name());
            row.entries.insert(
                sub.effective_key().to_string(),
                self.read_sub(session, subject, sub, &name, mode)?,
            );
        }

        Ok(row)
    }

    fn read_sub(
        &self,
        session: &mut ResolveSession,
        subject: &Subject,
        sub: &ResolvedField,
        stored_name: &str,
        mode: LoadMode,
    ) -> Result<SubValue, InternalError> {
        if sub.is_composite() {
            let nested = self
                .rows_at(session, subject, sub, stored_name, mode)?
                .unwrap_or_default();
            Ok(SubValue::Rows(nested))
        } else {
            // Absence is not deletion; a missing sub-key loads as Null.
            let value = self
                .store
                .read(subject, stored_name)
                .unwrap_or(Value::Null);
            Ok(SubValue::Scalar(value))
        }
    }
}

///
/// SaveExecutor
///

pub struct SaveExecutor<'a, S: KeyStore> {
    store: &'a mut S,
}

impl<'a, S: KeyStore> SaveExecutor<'a, S> {
    #[must_use]
    pub const fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Diff `new_value` against the stored row set and persist it. Rows
    /// that shrank away or changed layout have their whole sub-field set
    /// deleted; the count/order marker is written last so a failed partial
    /// write never advertises more rows than were written.
    pub fn update(
        &mut self,
        session: &mut ResolveSession,
        subject: &Subject,
        field: &ResolvedField,
        new_value: &RowsValue,
    ) -> Result<(), InternalError> {
        let mut span = Span::new(ExecKind::Save);

        self.update_at(session, subject, field, field.effective_name(), new_value)?;
        span.set_rows(new_value.len() as u64);

        Ok(())
    }

    fn update_at(
        &mut self,
        session: &mut ResolveSession,
        subject: &Subject,
        field: &ResolvedField,
        stored_name: &str,
        new_value: &RowsValue,
    ) -> Result<(), InternalError> {
        match &field.kind {
            ResolvedKind::Repeater { sub_fields, .. } => {
                self.repeater_update(session, subject, sub_fields, stored_name, new_value)
            }
            ResolvedKind::Flexible { layouts } => {
                self.flexible_update(session, subject, layouts, stored_name, new_value)
            }
            ResolvedKind::Group { sub_fields } => {
                self.group_update(session, subject, sub_fields, stored_name, new_value)
            }
            ResolvedKind::Scalar(_) => Err(InternalError::codec_invariant(format!(
                "update called on scalar field '{stored_name}'"
            ))),
        }
    }

    fn repeater_update(
        &mut self,
        session: &mut ResolveSession,
        subject: &Subject,
        sub_fields: &[ResolvedField],
        stored_name: &str,
        new_value: &RowsValue,
    ) -> Result<(), InternalError> {
        if sub_fields.is_empty() {
            return Ok(());
        }

        let prev_count = match self.store.read(subject, stored_name) {
            Some(marker) => read_count(&marker, stored_name)?,
            None => 0,
        };

        for (index, row) in new_value.iter().enumerate() {
            self.write_row(session, subject, sub_fields, stored_name, index, row)?;
        }

        // Shrink cleanup: a later load must not resurrect stale rows.
        let mut removed = 0;
        for index in new_value.len()..prev_count {
            removed += delete_row_keys(self.store, session, subject, sub_fields, stored_name, index)?;
        }
        if removed > 0 {
            sink::record(MetricsEvent::OrphanSweep {
                keys_removed: removed,
            });
        }

        self.store
            .write(subject, stored_name, Value::Uint(new_value.len() as u64))?;

        Ok(())
    }

    fn flexible_update(
        &mut self,
        session: &mut ResolveSession,
        subject: &Subject,
        layouts: &[ResolvedLayout],
        stored_name: &str,
        new_value: &RowsValue,
    ) -> Result<(), InternalError> {
        if layouts.is_empty() {
            return Ok(());
        }

        let prev_tags = match self.store.read(subject, stored_name) {
            Some(marker) => read_tags(&marker, stored_name)?,
            None => Vec::new(),
        };

        let mut removed = 0;
        let mut new_tags = Vec::with_capacity(new_value.len());
        let mut meta = LayoutMeta::default();

        for (index, row) in new_value.iter().enumerate() {
            let tag = row.layout.as_ref().ok_or_else(|| {
                InternalError::codec_invariant(format!(
                    "flexible row {index} of '{stored_name}' carries no layout tag"
                ))
            })?;
            let layout = layouts
                .iter()
                .find(|layout| layout.matches(tag))
                .ok_or_else(|| {
                    InternalError::codec_invariant(format!(
                        "unknown layout tag '{tag}' for '{stored_name}'"
                    ))
                })?;

            // A row that swapped layout leaves the old shape's keys behind
            // unless they are swept here.
            if let Some(prev_tag) = prev_tags.get(index)
                && prev_tag != tag
            {
                match layouts.iter().find(|layout| layout.matches(prev_tag)) {
                    Some(prev_layout) => {
                        removed += delete_row_keys(
                            self.store,
                            session,
                            subject,
                            &prev_layout.sub_fields,
                            stored_name,
                            index,
                        )?;
                    }
                    None => sink::record(MetricsEvent::LayoutSkipped),
                }
            }

            self.write_row(session, subject, &layout.sub_fields, stored_name, index, row)?;
            new_tags.push(tag.clone());

            if row.disabled {
                meta.disabled.insert(index);
            }
            if let Some(label) = &row.custom_label {
                meta.renamed.insert(index, label.clone());
            }
        }

        // Shrink cleanup for rows past the new end.
        for (index, prev_tag) in prev_tags.iter().enumerate().skip(new_value.len()) {
            match layouts.iter().find(|layout| layout.matches(prev_tag)) {
                Some(prev_layout) => {
                    removed += delete_row_keys(
                        self.store,
                        session,
                        subject,
                        &prev_layout.sub_fields,
                        stored_name,
                        index,
                    )?;
                }
                None => sink::record(MetricsEvent::LayoutSkipped),
            }
        }
        if removed > 0 {
            sink::record(MetricsEvent::OrphanSweep {
                keys_removed: removed,
            });
        }

        // Layout meta rides along in the same pass, then the order marker
        // goes last.
        meta.store(self.store, session, subject, stored_name)?;
        self.store.write(
            subject,
            stored_name,
            Value::List(
                new_tags
                    .iter()
                    .map(|tag| Value::Text(tag.to_string()))
                    .collect(),
            ),
        )?;

        Ok(())
    }

    fn group_update(
        &mut self,
        session: &mut ResolveSession,
        subject: &Subject,
        sub_fields: &[ResolvedField],
        stored_name: &str,
        new_value: &RowsValue,
    ) -> Result<(), InternalError> {
        if sub_fields.is_empty() {
            return Ok(());
        }

        let Some(row) = new_value.get(0) else {
            return Ok(());
        };

        for sub in sub_fields {
            let Some(entry) = row.entries.get(sub.effective_key()) else {
                continue;
            };
            let name = group_scoped_name(stored_name, sub.effective_name());
            self.write_sub(session, subject, sub, &name, entry)?;
        }

        self.store.write(subject, stored_name, Value::Uint(1))?;

        Ok(())
    }

    fn write_row(
        &mut self,
        session: &mut ResolveSession,
        subject: &Subject,
        sub_fields: &[ResolvedField],
        base: &str,
        index: usize,
        row: &RowValue,
    ) -> Result<(), InternalError> {
        for sub in sub_fields {
            // A sub-field with no entry (hidden by a display-time
            // condition) is left untouched.
            let Some(entry) = row.entries.get(sub.effective_key()) else {
                continue;
            };

            let name = row_scoped_name(base, index, sub.effective_name());
            self.write_sub(session, subject, sub, &name, entry)?;
        }

        Ok(())
    }

    fn write_sub(
        &mut self,
        session: &mut ResolveSession,
        subject: &Subject,
        sub: &ResolvedField,
        stored_name: &str,
        entry: &SubValue,
    ) -> Result<(), InternalError> {
        match (entry, sub.is_composite()) {
            (SubValue::Rows(rows), true) => {
                self.update_at(session, subject, sub, stored_name, rows)
            }
            (SubValue::Scalar(value), false) => {
                self.store.write(subject, stored_name, value.clone())?;
                Ok(())
            }
            (SubValue::Rows(_), false) | (SubValue::Scalar(_), true) => {
                Err(InternalError::codec_invariant(format!(
                    "value shape does not match field shape at '{stored_name}'"
                )))
            }
        }
    }
}

///
/// DeleteExecutor
///

pub struct DeleteExecutor<'a, S: KeyStore> {
    store: &'a mut S,
}

impl<'a, S: KeyStore> DeleteExecutor<'a, S> {
    #[must_use]
    pub const fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Delete every row's every sub-field, then the marker itself.
    /// Returns the number of stored keys removed.
    pub fn delete(
        &mut self,
        session: &mut ResolveSession,
        subject: &Subject,
        field: &ResolvedField,
    ) -> Result<u64, InternalError> {
        let mut span = Span::new(ExecKind::Delete);

        let removed =
            delete_field_at(self.store, session, subject, field, field.effective_name())?;
        span.set_rows(removed);

        Ok(removed)
    }
}

// ----------------------------------------------------------------------
// Shared traversal helpers
// ----------------------------------------------------------------------

fn read_count(marker: &Value, stored_name: &str) -> Result<usize, InternalError> {
    marker
        .as_uint()
        .map(|count| count as usize)
        .ok_or_else(|| {
            InternalError::codec_corruption(format!(
                "row marker for '{stored_name}' is not a count: {marker:?}"
            ))
        })
}

fn read_tags(marker: &Value, stored_name: &str) -> Result<Vec<LayoutTag>, InternalError> {
    let items = marker.as_list().ok_or_else(|| {
        InternalError::codec_corruption(format!(
            "layout marker for '{stored_name}' is not a list: {marker:?}"
        ))
    })?;

    items
        .iter()
        .map(|item| {
            item.as_text().map(LayoutTag::from).ok_or_else(|| {
                InternalError::codec_corruption(format!(
                    "layout marker for '{stored_name}' holds a non-text tag: {item:?}"
                ))
            })
        })
        .collect()
}

/// Remove every stored key of one row. Composite sub-fields recurse into a
/// full field delete at their row-scoped name.
fn delete_row_keys<S: KeyStore>(
    store: &mut S,
    session: &mut ResolveSession,
    subject: &Subject,
    sub_fields: &[ResolvedField],
    base: &str,
    index: usize,
) -> Result<u64, InternalError> {
    let mut removed = 0;

    for sub in sub_fields {
        let name = row_scoped_name(base, index, sub.effective_name());
        if sub.is_composite() {
            removed += delete_field_at(store, session, subject, sub, &name)?;
        } else {
            store.remove(subject, &name)?;
            removed += 1;
        }
    }

    Ok(removed)
}

fn delete_field_at<S: KeyStore>(
    store: &mut S,
    session: &mut ResolveSession,
    subject: &Subject,
    field: &ResolvedField,
    stored_name: &str,
) -> Result<u64, InternalError> {
    let mut removed = 0;

    match &field.kind {
        ResolvedKind::Repeater { sub_fields, .. } => {
            if sub_fields.is_empty() {
                return Ok(0);
            }

            let count = match store.read(subject, stored_name) {
                Some(marker) => read_count(&marker, stored_name)?,
                None => return Ok(0),
            };

            for index in 0..count {
                removed +=
                    delete_row_keys(store, session, subject, sub_fields, stored_name, index)?;
            }
        }
        ResolvedKind::Flexible { layouts } => {
            if layouts.is_empty() {
                return Ok(0);
            }

            let tags = match store.read(subject, stored_name) {
                Some(marker) => read_tags(&marker, stored_name)?,
                None => return Ok(0),
            };

            for (index, tag) in tags.iter().enumerate() {
                match layouts.iter().find(|layout| layout.matches(tag)) {
                    Some(layout) => {
                        removed += delete_row_keys(
                            store,
                            session,
                            subject,
                            &layout.sub_fields,
                            stored_name,
                            index,
                        )?;
                    }
                    None => sink::record(MetricsEvent::LayoutSkipped),
                }
            }

            store.remove(subject, &crate::meta::layout_meta_key(stored_name))?;
            session.cache_meta(subject, stored_name, LayoutMeta::default());
        }
        ResolvedKind::Group { sub_fields } => {
            if sub_fields.is_empty() {
                return Ok(0);
            }

            if store.read(subject, stored_name).is_none() {
                return Ok(0);
            }

            for sub in sub_fields {
                let name = group_scoped_name(stored_name, sub.effective_name());
                if sub.is_composite() {
                    removed += delete_field_at(store, session, subject, sub, &name)?;
                } else {
                    store.remove(subject, &name)?;
                    removed += 1;
                }
            }
        }
        ResolvedKind::Scalar(_) => {
            return Err(InternalError::codec_invariant(format!(
                "delete called on scalar field '{stored_name}'"
            )));
        }
    }

    store.remove(subject, stored_name)?;

    Ok(removed)
}
