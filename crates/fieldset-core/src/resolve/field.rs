use fieldset_schema::{
    node::FieldDef,
    types::{FieldKey, LayoutTag, RowBounds, ScalarKind},
};

///
/// FieldIdentity
///
/// "As-declared" vs "as-stored" identity for one resolved field. Effective
/// identity is always derivable from the declaration plus clone context;
/// declared identity is always recoverable from a resolved field.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldIdentity {
    /// The definition's stable key.
    pub declared_key: FieldKey,
    /// The definition's origin name, untouched by renames and prefixes.
    pub declared_name: String,
    /// Key within the resolved value space; seamless clones rekey this.
    pub effective_key: String,
    /// Name used to derive storage keys; clone name-prefixing rewrites it.
    pub effective_name: String,
}

impl FieldIdentity {
    pub(crate) fn declared(def: &FieldDef) -> Self {
        Self {
            declared_key: def.key.clone(),
            declared_name: def.origin_name.clone(),
            effective_key: def.key.to_string(),
            effective_name: def.name.clone(),
        }
    }
}

///
/// ResolvedField
///
/// Runtime shape produced by the resolver: the declaration plus resolution
/// metadata. Clone definitions never appear here; they expand into the
/// fields their selectors denote.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedField {
    pub identity: FieldIdentity,
    pub label: String,

    /// Pre-prefix label, kept so UI code can restore it.
    pub original_label: Option<String>,

    pub required: bool,
    pub effective_parent: Option<FieldKey>,

    /// Back-reference to the originating definition, so look-ups by the
    /// original key still succeed after rewriting.
    pub source_key: FieldKey,

    pub kind: ResolvedKind,
}

impl ResolvedField {
    #[must_use]
    pub fn effective_name(&self) -> &str {
        &self.identity.effective_name
    }

    #[must_use]
    pub fn effective_key(&self) -> &str {
        &self.identity.effective_key
    }

    #[must_use]
    pub const fn is_composite(&self) -> bool {
        !matches!(self.kind, ResolvedKind::Scalar(_))
    }
}

///
/// ResolvedKind
///

#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedKind {
    Scalar(ScalarKind),

    Repeater {
        sub_fields: Vec<ResolvedField>,
        bounds: RowBounds,
    },

    Flexible {
        layouts: Vec<ResolvedLayout>,
    },

    Group {
        sub_fields: Vec<ResolvedField>,
    },
}

///
/// ResolvedLayout
///

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLayout {
    pub tag: LayoutTag,
    pub label: String,
    pub sub_fields: Vec<ResolvedField>,
    pub bounds: RowBounds,
}

impl ResolvedLayout {
    #[must_use]
    pub fn matches(&self, tag: &LayoutTag) -> bool {
        self.tag == *tag
    }
}
