use crate::{err, node::field::check_sibling_names, prelude::*};

///
/// FieldGroup
///
/// Ordered collection of top-level field definitions. Groups are the unit a
/// clone selector can expand wholesale.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FieldGroup {
    pub key: GroupKey,
    pub title: String,
    pub fields: Vec<FieldDef>,
}

impl FieldGroup {
    pub fn new(key: impl Into<GroupKey>, title: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            fields,
        }
    }

    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl ValidateNode for FieldGroup {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.title.is_empty() {
            err!(errs, "group title is empty");
        }

        check_sibling_names(&self.fields, &mut errs);

        errs.result()
    }
}
