mod field;
mod session;

pub use field::{FieldIdentity, ResolvedField, ResolvedKind, ResolvedLayout};
pub use session::ResolveSession;

use crate::obs::sink::{self, MetricsEvent};
use fieldset_schema::{
    node::{FieldDef, FieldGroup, FieldKind},
    registry::DefinitionStore,
    types::{CloneDisplay, Selector},
};

///
/// Resolver
///
/// Expands field definitions into their runtime shape. The only stateful
/// part of resolution is the session's cycle guard; everything else is a
/// pure function of the definition store.
///

pub struct Resolver<'a> {
    store: &'a DefinitionStore,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub const fn new(store: &'a DefinitionStore) -> Self {
        Self { store }
    }

    /// Resolve all of a group's top-level fields.
    pub fn resolve_group(
        &self,
        group: &FieldGroup,
        session: &mut ResolveSession,
    ) -> Vec<ResolvedField> {
        group
            .fields
            .iter()
            .flat_map(|field| self.resolve_field(field, session))
            .collect()
    }

    /// Resolve one definition. Non-clone kinds produce exactly one field;
    /// a clone expands to the fields its selectors denote, possibly none.
    pub fn resolve_field(
        &self,
        def: &FieldDef,
        session: &mut ResolveSession,
    ) -> Vec<ResolvedField> {
        match &def.kind {
            FieldKind::Scalar(kind) => vec![self.leaf(def, ResolvedKind::Scalar(*kind))],

            FieldKind::Repeater { sub_fields, bounds } => {
                let sub_fields = self.resolve_all(sub_fields, session);
                vec![self.leaf(
                    def,
                    ResolvedKind::Repeater {
                        sub_fields,
                        bounds: *bounds,
                    },
                )]
            }

            FieldKind::Group { sub_fields } => {
                let sub_fields = self.resolve_all(sub_fields, session);
                vec![self.leaf(def, ResolvedKind::Group { sub_fields })]
            }

            FieldKind::Flexible { layouts } => {
                let layouts = layouts
                    .iter()
                    .map(|layout| ResolvedLayout {
                        tag: layout.tag.clone(),
                        label: layout.label.clone(),
                        sub_fields: self.resolve_all(&layout.sub_fields, session),
                        bounds: layout.bounds,
                    })
                    .collect();
                vec![self.leaf(def, ResolvedKind::Flexible { layouts })]
            }

            FieldKind::Clone {
                selectors,
                display,
                prefix_name,
                prefix_label,
            } => self.resolve_clone(def, selectors, *display, *prefix_name, *prefix_label, session),
        }
    }

    fn resolve_all(
        &self,
        defs: &[FieldDef],
        session: &mut ResolveSession,
    ) -> Vec<ResolvedField> {
        defs.iter()
            .flat_map(|def| self.resolve_field(def, session))
            .collect()
    }

    fn leaf(&self, def: &FieldDef, kind: ResolvedKind) -> ResolvedField {
        ResolvedField {
            identity: FieldIdentity::declared(def),
            label: def.label.clone(),
            original_label: None,
            required: def.required,
            effective_parent: def.parent.clone(),
            source_key: def.key.clone(),
            kind,
        }
    }

    fn resolve_clone(
        &self,
        def: &FieldDef,
        selectors: &[Selector],
        display: CloneDisplay,
        prefix_name: bool,
        prefix_label: bool,
        session: &mut ResolveSession,
    ) -> Vec<ResolvedField> {
        // Cycle guard: a clone already being resolved contributes nothing.
        // Mutually-referencing groups must degrade, not recurse.
        if !session.enter(def.key.clone()) {
            return Vec::new();
        }

        let mut out = Vec::new();

        for selector in selectors {
            match selector {
                Selector::Field(key) => match self.store.field(key) {
                    Some(child) => out.extend(self.resolve_field(child, session)),
                    None => sink::record(MetricsEvent::DanglingSelector),
                },
                Selector::Group(key) => match self.store.group(key) {
                    Some(group) => {
                        for child in &group.fields {
                            out.extend(self.resolve_field(child, session));
                        }
                    }
                    None => sink::record(MetricsEvent::DanglingSelector),
                },
            }
        }

        session.exit(&def.key);

        for child in &mut out {
            rewrite_child(def, display, prefix_name, prefix_label, child);
        }

        match display {
            CloneDisplay::Seamless => out,
            CloneDisplay::Grouped => vec![self.leaf(def, ResolvedKind::Group { sub_fields: out })],
        }
    }
}

/// Apply clone-context rewriting to one resolved child. A child that was
/// itself a clone has already been expanded, so the rewrite lands on every
/// field the nested clone produced.
fn rewrite_child(
    clone: &FieldDef,
    display: CloneDisplay,
    prefix_name: bool,
    prefix_label: bool,
    child: &mut ResolvedField,
) {
    if display == CloneDisplay::Seamless {
        // Rekey so sibling clones of the same underlying field cannot
        // collide in a shared value space.
        child.identity.effective_key = format!("{}_{}", clone.key, child.identity.effective_key);
        child.effective_parent = clone.parent.clone();

        if prefix_label {
            child.original_label = Some(child.label.clone());
            child.label = format!("{} {}", clone.label, child.label);
        }
    }

    if prefix_name {
        child.identity.effective_name =
            format!("{}_{}", clone.name, child.identity.declared_name);
    }

    if clone.required {
        child.required = true;
    }
}

///
/// TESTS
///
