//! Schema layer for fieldset: field definitions, the definition store, and
//! structural validation. Runtime resolution and value codecs live in
//! `fieldset-core`.

pub mod choices;
pub mod error;
pub mod node;
pub mod registry;
pub mod types;
pub mod validate;

/// Maximum length for field storage names.
pub const MAX_FIELD_NAME_LEN: usize = 64;

/// Maximum length for layout tags.
pub const MAX_LAYOUT_TAG_LEN: usize = 64;

use crate::error::ErrorTree;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::ErrorTree,
        node::*,
        types::{CloneDisplay, FieldKey, GroupKey, LayoutTag, RowBounds, ScalarKind, Selector},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(ErrorTree),

    #[error(transparent)]
    Registry(#[from] registry::RegistryError),
}
