// ============================================================================
// ember-atoms - Type Definitions
// Cell identity and the equality strategy type
// ============================================================================

use std::cell::Cell as StdCell;

// =============================================================================
// CELL IDENTITY
// =============================================================================
//
// Cells are value-less handles: a cell's value lives in whichever store
// reads it. The id is the only thing a store needs to key its slots, so
// slot bookkeeping never needs to know the value type T.
// =============================================================================

/// Opaque identity of a single cell.
///
/// Two `Cell<T>` handles refer to the same reactive storage location if and
/// only if their ids are equal. Ids are never reused within a thread, so a
/// cell recreated for the same purpose (e.g. by a family after `remove`) is
/// a distinct location with a fresh value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellId(u64);

thread_local! {
    static NEXT_CELL_ID: StdCell<u64> = const { StdCell::new(1) };
}

impl CellId {
    /// Allocate the next unique cell id for this thread.
    pub(crate) fn next() -> Self {
        NEXT_CELL_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            CellId(id)
        })
    }
}

// =============================================================================
// EQUALITY STRATEGY
// =============================================================================

/// Equality function type for comparing cell values and family keys.
pub type EqualsFn<T> = fn(&T, &T) -> bool;

/// Default equality using PartialEq.
pub fn default_equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

// =============================================================================
// TESTS
// =============================================================================
