mod field;
mod group;
mod layout;

pub use field::{FieldDef, FieldKind};
pub use group::FieldGroup;
pub use layout::Layout;

use crate::error::ErrorTree;

///
/// ValidateNode
///
/// Local, structural checks only. Registry-wide invariants (key uniqueness,
/// selector targets) run in a separate global pass.
///

pub trait ValidateNode {
    fn validate(&self) -> Result<(), ErrorTree> {
        Ok(())
    }
}
