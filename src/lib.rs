// ============================================================================
// ember-atoms - An Atomic State Management Library for Rust
// ============================================================================
//
// Store-based state cells with derived views and keyed cell families.
// Cells are value-less handles; values live per store, so independent
// stores give independent state and swapping stores resets everything.
// ============================================================================

pub mod core;
pub mod equality;
pub mod family;
pub mod primitives;

// Re-export core items at crate root for ergonomic access
pub use crate::core::store::{default_store, Store, Subscription};
pub use crate::core::types::{default_equals, CellId, EqualsFn};

// Re-export primitives at crate root
pub use primitives::cell::{cell, cell_with_default, cell_with_equals, Cell};
pub use primitives::derived::{derived, derived_with_equals, Derived, Getter, Watcher};
pub use primitives::writable::{writable_derived, Setter, WritableDerived};

// Re-export the family (the registry)
pub use family::{
    family, family_with_equals, family_with_options, Family, FamilyOptions, StoreResolver,
};

// Re-export equality strategies
pub use equality::{
    always_equals, by_field, equals, never_equals, safe_equals_f32, safe_equals_f64,
    safe_not_equal_f32, safe_not_equal_f64,
};

// =============================================================================
// TESTS
// =============================================================================
