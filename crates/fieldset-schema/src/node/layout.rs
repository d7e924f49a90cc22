use crate::{err, node::field::check_sibling_names, prelude::*};

///
/// Layout
///
/// A named, independently shaped row template for flexible fields. A row's
/// actual sub-field set is chosen at edit time from the available layouts.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Layout {
    pub tag: LayoutTag,
    pub label: String,
    pub sub_fields: Vec<FieldDef>,
    pub bounds: RowBounds,
}

impl Layout {
    pub fn new(tag: impl Into<LayoutTag>, label: impl Into<String>, sub_fields: Vec<FieldDef>) -> Self {
        Self {
            tag: tag.into(),
            label: label.into(),
            sub_fields,
            bounds: RowBounds::default(),
        }
    }

    #[must_use]
    pub const fn with_bounds(mut self, bounds: RowBounds) -> Self {
        self.bounds = bounds;
        self
    }
}

impl ValidateNode for Layout {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.tag.as_str().is_empty() {
            err!(errs, "layout tag is empty");
        } else if self.tag.as_str().len() > crate::MAX_LAYOUT_TAG_LEN {
            err!(
                errs,
                "layout tag '{}' exceeds {} characters",
                self.tag,
                crate::MAX_LAYOUT_TAG_LEN
            );
        }

        if self.bounds.is_inverted() {
            err!(
                errs,
                "row bounds are inverted: min {:?} > max {:?}",
                self.bounds.min,
                self.bounds.max
            );
        }

        check_sibling_names(&self.sub_fields, &mut errs);

        errs.result()
    }
}

///
/// TESTS
///
