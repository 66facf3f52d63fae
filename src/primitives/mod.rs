// ============================================================================
// ember-atoms - Primitives Module
// Core state primitives: cell, derived, writable derived
// ============================================================================

pub mod cell;
pub mod derived;
pub mod writable;

// Re-export for convenience
pub use cell::{cell, cell_with_default, cell_with_equals, Cell};
pub use derived::{derived, derived_with_equals, Derived, Getter, Watcher};
pub use writable::{writable_derived, Setter, WritableDerived};
