//! ## Crate layout
//! - `schema`: field definitions, the definition store, and structural
//!   validation.
//! - `core`: clone resolution, the composite value codec, layout meta, and
//!   the row reconciler.
//!
//! This is the public meta-crate; downstream users depend on **fieldset**
//! only. The `prelude` module mirrors the surface used by editing and
//! rendering code.

pub use fieldset_core as core;
pub use fieldset_schema as schema;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use fieldset_core::prelude::*;
    pub use fieldset_schema::prelude::*;
}
