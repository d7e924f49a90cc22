use crate::{
    resolve::{ResolvedField, ResolvedKind},
    row::{RowValue, RowsValue, SubValue},
    value::Value,
};
use fieldset_schema::types::ScalarKind;

/// Replace every leaf of an already-loaded value with its display-formatted
/// form. The traversal mirrors `load`'s shape but never touches storage.
#[must_use]
pub fn format_rows(field: &ResolvedField, value: &RowsValue) -> RowsValue {
    value
        .iter()
        .map(|row| format_row(field, row))
        .collect()
}

fn format_row(field: &ResolvedField, row: &RowValue) -> RowValue {
    let sub_fields: &[ResolvedField] = match &field.kind {
        ResolvedKind::Repeater { sub_fields, .. } | ResolvedKind::Group { sub_fields } => {
            sub_fields
        }
        ResolvedKind::Flexible { layouts } => row
            .layout
            .as_ref()
            .and_then(|tag| layouts.iter().find(|layout| layout.matches(tag)))
            .map_or(&[], |layout| layout.sub_fields.as_slice()),
        ResolvedKind::Scalar(_) => &[],
    };

    let mut out = row.clone();

    for sub in sub_fields {
        let Some(entry) = out.entries.get_mut(sub.effective_key()) else {
            continue;
        };

        match (entry, &sub.kind) {
            (SubValue::Scalar(value), ResolvedKind::Scalar(kind)) => {
                let formatted = format_scalar(*kind, value);
                *value = formatted;
            }
            (SubValue::Rows(rows), _) => {
                let formatted = format_rows(sub, rows);
                *rows = formatted;
            }
            (SubValue::Scalar(_), _) => {}
        }
    }

    out
}

/// Per-kind display formatting. Unknown shapes pass through untouched;
/// formatting never fails.
#[must_use]
pub fn format_scalar(kind: ScalarKind, value: &Value) -> Value {
    match (kind, value) {
        (ScalarKind::Bool, Value::Bool(flag)) => {
            Value::Text(if *flag { "Yes" } else { "No" }.to_string())
        }
        (ScalarKind::Number, Value::Int(n)) => Value::Text(n.to_string()),
        (ScalarKind::Number, Value::Uint(n)) => Value::Text(n.to_string()),
        (ScalarKind::Number, Value::Float(n)) => Value::Text(n.to_string()),
        _ => value.clone(),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        resolve::{ResolveSession, Resolver},
        row::RowValue,
    };
    use fieldset_schema::{
        node::{FieldDef, FieldGroup, FieldKind},
        registry::DefinitionStore,
        types::{FieldKey, RowBounds},
    };

    #[test]
    fn format_walks_rows_and_replaces_leaves() {
        let mut store = DefinitionStore::new();
        store
            .insert_group(FieldGroup::new(
                "grp_main",
                "Main",
                vec![FieldDef::new(
                    "fk_prices",
                    "prices",
                    "Prices",
                    FieldKind::Repeater {
                        sub_fields: vec![
                            FieldDef::new(
                                "fk_amount",
                                "amount",
                                "Amount",
                                FieldKind::Scalar(ScalarKind::Number),
                            ),
                            FieldDef::new(
                                "fk_on_sale",
                                "on_sale",
                                "On Sale",
                                FieldKind::Scalar(ScalarKind::Bool),
                            ),
                        ],
                        bounds: RowBounds::default(),
                    },
                )],
            ))
            .unwrap();

        let mut session = ResolveSession::new();
        let field = Resolver::new(&store)
            .resolve_field(store.field(&FieldKey::from("fk_prices")).unwrap(), &mut session)
            .remove(0);

        let rows = RowsValue::from(vec![
            RowValue::new()
                .with_scalar("fk_amount", Value::Uint(12))
                .with_scalar("fk_on_sale", Value::Bool(true)),
        ]);

        let formatted = format_rows(&field, &rows);
        let row = formatted.get(0).unwrap();
        assert_eq!(row.scalar("fk_amount"), Some(&Value::Text("12".to_string())));
        assert_eq!(row.scalar("fk_on_sale"), Some(&Value::Text("Yes".to_string())));

        // The source value is untouched.
        assert_eq!(rows.get(0).unwrap().scalar("fk_on_sale"), Some(&Value::Bool(true)));
    }

    #[test]
    fn bool_formats_to_yes_no() {
        assert_eq!(
            format_scalar(ScalarKind::Bool, &Value::Bool(true)),
            Value::Text("Yes".to_string())
        );
        assert_eq!(
            format_scalar(ScalarKind::Bool, &Value::Bool(false)),
            Value::Text("No".to_string())
        );
    }

    #[test]
    fn null_passes_through() {
        assert_eq!(format_scalar(ScalarKind::Bool, &Value::Null), Value::Null);
    }

    #[test]
    fn number_formats_to_text() {
        assert_eq!(
            format_scalar(ScalarKind::Number, &Value::Int(-3)),
            Value::Text("-3".to_string())
        );
    }
}
