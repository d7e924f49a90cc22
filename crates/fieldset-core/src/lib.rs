//! Core runtime for fieldset: clone resolution, the composite value codec,
//! the layout registry, the row reconciler, and the ergonomics exported via
//! the `prelude`.

// public exports are one module level down
pub mod codec;
pub mod error;
pub mod meta;
pub mod obs;
pub mod reconcile;
pub mod resolve;
pub mod row;
pub mod store;
pub mod validate;
pub mod value;

///
/// CONSTANTS
///

/// Default page size for paginated composite-field editing.
pub const DEFAULT_ROWS_PER_PAGE: usize = 20;

///
/// Prelude
///
/// Prelude contains only domain vocabulary. No errors, executors, or
/// helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        reconcile::{RowId, RowReconciler, RowStatus},
        resolve::{ResolveSession, ResolvedField, Resolver},
        row::{LoadMode, RowValue, RowsValue, SubValue, Subject},
        value::Value,
    };
}
