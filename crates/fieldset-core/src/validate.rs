//! Runtime row validation: configured row-count bounds and required-value
//! checks, reported per offending row/sub-field path so the UI can point
//! at the exact nested location.

use crate::{
    resolve::{ResolvedField, ResolvedKind},
    row::{RowValue, RowsValue, SubValue},
};
use fieldset_schema::{error::ErrorTree, types::RowBounds};

/// Validate a loaded (or about-to-be-saved) value against its resolved
/// field. All issues are collected; nothing fails fast.
pub fn validate_rows(field: &ResolvedField, value: Option<&RowsValue>) -> Result<(), ErrorTree> {
    let mut errs = ErrorTree::new();
    check_field(field, value, field.effective_name(), &mut errs);
    errs.result()
}

fn check_field(
    field: &ResolvedField,
    value: Option<&RowsValue>,
    path: &str,
    errs: &mut ErrorTree,
) {
    let count = value.map_or(0, RowsValue::len);

    if field.required && field.is_composite() && count == 0 {
        errs.add_at(path, "required field has no rows");
    }

    match &field.kind {
        ResolvedKind::Repeater { sub_fields, bounds } => {
            check_bounds(bounds, count, path, errs);

            if let Some(rows) = value {
                for (index, row) in rows.iter().enumerate() {
                    check_row(sub_fields, row, &format!("{path}[{index}]"), errs);
                }
            }
        }
        ResolvedKind::Flexible { layouts } => {
            if let Some(rows) = value {
                for layout in layouts {
                    let occurrences = rows
                        .iter()
                        .filter(|row| row.layout.as_ref() == Some(&layout.tag))
                        .count();
                    check_bounds(
                        &layout.bounds,
                        occurrences,
                        &format!("{path}[{}]", layout.tag),
                        errs,
                    );
                }

                for (index, row) in rows.iter().enumerate() {
                    let row_path = format!("{path}[{index}]");
                    let Some(tag) = &row.layout else {
                        errs.add_at(&row_path, "row carries no layout tag");
                        continue;
                    };
                    match layouts.iter().find(|layout| layout.matches(tag)) {
                        Some(layout) => check_row(&layout.sub_fields, row, &row_path, errs),
                        None => errs.add_at(&row_path, format!("unknown layout tag '{tag}'")),
                    }
                }
            }
        }
        ResolvedKind::Group { sub_fields } => {
            if let Some(row) = value.and_then(|rows| rows.get(0)) {
                check_row(sub_fields, row, path, errs);
            }
        }
        ResolvedKind::Scalar(_) => {}
    }
}

fn check_row(sub_fields: &[ResolvedField], row: &RowValue, path: &str, errs: &mut ErrorTree) {
    for sub in sub_fields {
        let sub_path = format!("{path}.{}", sub.effective_name());

        match row.entries.get(sub.effective_key()) {
            Some(SubValue::Scalar(value)) => {
                if sub.required && value.is_null() {
                    errs.add_at(sub_path, "required value is empty");
                }
            }
            Some(SubValue::Rows(rows)) => check_field(sub, Some(rows), &sub_path, errs),
            None => {
                if sub.required {
                    errs.add_at(sub_path, "required value is missing");
                }
            }
        }
    }
}

fn check_bounds(bounds: &RowBounds, count: usize, path: &str, errs: &mut ErrorTree) {
    if let Some(min) = bounds.min
        && bounds.below_min(count)
    {
        errs.add_at(path, format!("row count {count} is below the minimum of {min}"));
    }

    if let Some(max) = bounds.max
        && bounds.above_max(count)
    {
        errs.add_at(path, format!("row count {count} is above the maximum of {max}"));
    }
}

///
/// TESTS
///
