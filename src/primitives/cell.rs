// ============================================================================
// ember-atoms - Cell Primitive
// The core unit of state: a value-less handle with identity
// ============================================================================

use std::rc::Rc;

use crate::core::types::{default_equals, CellId, EqualsFn};

// =============================================================================
// CELL<T> - The public cell handle
// =============================================================================

struct CellInner<T> {
    id: CellId,
    init: Box<dyn Fn() -> T>,
    equals: EqualsFn<T>,
}

/// A reactive cell holding one value of type T per store.
///
/// A cell is only a handle: identity, an initializer, and an equality
/// strategy. The value itself lives in whichever [`Store`](crate::Store)
/// reads or writes the cell, so the same cell can hold different values in
/// different stores.
///
/// # Example
///
/// ```
/// use ember_atoms::{cell, Store};
///
/// let count = cell(0);
/// let store = Store::new();
///
/// assert_eq!(store.get(&count), 0);
/// store.set(&count, 5);
/// assert_eq!(store.get(&count), 5);
/// ```
pub struct Cell<T> {
    inner: Rc<CellInner<T>>,
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Cell<T> {
    /// Create a new cell with the given initial value.
    pub fn new(initial: T) -> Self
    where
        T: Clone + PartialEq + 'static,
    {
        Self::new_with_equals(initial, default_equals)
    }

    /// Create a new cell with a custom equality function.
    pub fn new_with_equals(initial: T, equals: EqualsFn<T>) -> Self
    where
        T: Clone + 'static,
    {
        Self::from_default_with_equals(move || initial.clone(), equals)
    }

    /// Create a cell whose initial value comes from a closure, run lazily
    /// per store on first access.
    pub fn from_default(init: impl Fn() -> T + 'static) -> Self
    where
        T: PartialEq,
    {
        Self::from_default_with_equals(init, default_equals)
    }

    /// Create a cell with both a lazy initializer and a custom equality
    /// function.
    pub fn from_default_with_equals(init: impl Fn() -> T + 'static, equals: EqualsFn<T>) -> Self {
        Self {
            inner: Rc::new(CellInner {
                id: CellId::next(),
                init: Box::new(init),
                equals,
            }),
        }
    }

    /// The cell's unique identity.
    pub fn id(&self) -> CellId {
        self.inner.id
    }

    /// Whether two handles refer to the same cell.
    pub fn is(&self, other: &Cell<T>) -> bool {
        self.inner.id == other.inner.id
    }

    /// The cell's equality function.
    pub fn equals_fn(&self) -> EqualsFn<T> {
        self.inner.equals
    }

    /// Run the initializer to produce a fresh initial value.
    pub(crate) fn initial_value(&self) -> T {
        (self.inner.init)()
    }
}

impl<T> std::fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell").field("id", &self.inner.id).finish()
    }
}

// =============================================================================
// CELL CREATION FUNCTIONS
// =============================================================================

/// Create a new reactive cell.
///
/// This is the primary way to create cells.
///
/// # Example
///
/// ```
/// use ember_atoms::{cell, default_store};
///
/// let count = cell(0);
/// let name = cell(String::from("hello"));
///
/// default_store().set(&count, 42);
/// assert_eq!(default_store().get(&count), 42);
/// ```
pub fn cell<T>(initial: T) -> Cell<T>
where
    T: Clone + PartialEq + 'static,
{
    Cell::new(initial)
}

/// Create a cell with a custom equality function.
///
/// # Example
///
/// ```
/// use ember_atoms::{cell_with_equals, Store};
///
/// // A cell that always notifies, even for equal values.
/// let forced = cell_with_equals(0, |_, _| false);
///
/// let store = Store::new();
/// assert!(store.set(&forced, 0));
/// ```
pub fn cell_with_equals<T>(initial: T, equals: EqualsFn<T>) -> Cell<T>
where
    T: Clone + 'static,
{
    Cell::new_with_equals(initial, equals)
}

/// Create a cell whose default value is computed lazily, once per store.
///
/// Combined with [`Store::reset`](crate::Store::reset) this behaves like a
/// resettable default-value cell: reset re-runs the closure.
///
/// # Example
///
/// ```
/// use ember_atoms::{cell_with_default, Store};
///
/// let power_level = cell_with_default(|| 9001);
///
/// let store = Store::new();
/// assert_eq!(store.get(&power_level), 9001);
///
/// store.set(&power_level, 1);
/// store.reset(&power_level);
/// assert_eq!(store.get(&power_level), 9001);
/// ```
pub fn cell_with_default<T>(init: impl Fn() -> T + 'static) -> Cell<T>
where
    T: PartialEq,
{
    Cell::from_default(init)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_creation() {
        let c = cell(42);
        let store = crate::Store::new();
        assert_eq!(store.get(&c), 42);
    }

    #[test]
    fn clones_share_identity() {
        let a = cell(1);
        let b = a.clone();

        assert!(a.is(&b));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn distinct_cells_have_distinct_identity() {
        let a = cell(1);
        let b = cell(1);

        assert!(!a.is(&b));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn clones_share_the_stored_value() {
        let a = cell(0);
        let b = a.clone();
        let store = crate::Store::new();

        store.set(&a, 100);
        assert_eq!(store.get(&b), 100);
    }

    #[test]
    fn lazy_default_runs_per_store() {
        use std::cell::Cell as StdCell;
        use std::rc::Rc;

        let runs = Rc::new(StdCell::new(0));
        let runs_clone = runs.clone();
        let c = cell_with_default(move || {
            runs_clone.set(runs_clone.get() + 1);
            7
        });

        let a = crate::Store::new();
        let b = crate::Store::new();
        assert_eq!(a.get(&c), 7);
        assert_eq!(b.get(&c), 7);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn debug_format() {
        let c = cell(42);
        let debug = format!("{:?}", c);
        assert!(debug.contains("Cell"));
    }
}
