// ============================================================================
// ember-atoms - Writable Derived Views
// A derived read half plus a write function over underlying cells
// ============================================================================
//
// A writable derived never stores data itself - its read half is always
// computed from cells, and its write half writes through to them. The
// write function returns nothing; observation stays on the read side.
// ============================================================================

use std::rc::Rc;

use crate::core::store::Store;
use crate::core::types::EqualsFn;
use crate::primitives::cell::Cell;
use crate::primitives::derived::{Derived, Getter};

// =============================================================================
// SETTER
// =============================================================================

/// Write access handed to a writable derived's write function.
pub struct Setter<'a> {
    store: &'a Store,
}

impl Setter<'_> {
    /// Read a cell's current value.
    pub fn get<T: Clone + 'static>(&self, cell: &Cell<T>) -> T {
        self.store.get(cell)
    }

    /// Read a derived view's current value.
    pub fn read<T>(&self, derived: &Derived<T>) -> T {
        self.store.read(derived)
    }

    /// Set a cell's value through its equality gate.
    pub fn set<T: 'static>(&self, cell: &Cell<T>, value: T) -> bool {
        self.store.set(cell, value)
    }

    /// Update a cell's value in place.
    pub fn update<T: 'static>(&self, cell: &Cell<T>, f: impl FnOnce(&mut T)) {
        self.store.update(cell, f);
    }

    /// Reset a cell back to its initial value.
    pub fn reset<T: 'static>(&self, cell: &Cell<T>) -> bool {
        self.store.reset(cell)
    }
}

// =============================================================================
// WRITABLE DERIVED
// =============================================================================

/// A derived view that can also be written to.
///
/// The read half behaves exactly like a [`Derived`]; the write half takes
/// an argument of type `A` and writes through to underlying cells.
///
/// # Example
///
/// ```
/// use ember_atoms::{cell, writable_derived, Store};
///
/// let base = cell(5);
///
/// let read_dep = base.clone();
/// let write_dep = base.clone();
/// let plus_two = writable_derived(
///     move |get| get.get(&read_dep) + 2,
///     move |set, delta: i32| {
///         let current = set.get(&write_dep);
///         set.set(&write_dep, current + delta);
///     },
/// );
///
/// let store = Store::new();
/// assert_eq!(store.read(plus_two.view()), 7);
///
/// store.write(&plus_two, 3);
/// assert_eq!(store.get(&base), 8);
/// assert_eq!(store.read(plus_two.view()), 10);
/// ```
pub struct WritableDerived<T, A> {
    view: Derived<T>,
    write: Rc<dyn Fn(&Setter, A)>,
}

impl<T, A> Clone for WritableDerived<T, A> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            write: self.write.clone(),
        }
    }
}

impl<T, A> WritableDerived<T, A> {
    /// Create a writable derived from a read function and a write function.
    pub fn new<R, W>(read: R, write: W) -> Self
    where
        R: Fn(&Getter) -> T + 'static,
        W: Fn(&Setter, A) + 'static,
        T: PartialEq,
    {
        Self {
            view: Derived::new(read),
            write: Rc::new(write),
        }
    }

    /// Create a writable derived with a custom equality function on the
    /// read half.
    pub fn new_with_equals<R, W>(read: R, write: W, equals: EqualsFn<T>) -> Self
    where
        R: Fn(&Getter) -> T + 'static,
        W: Fn(&Setter, A) + 'static,
    {
        Self {
            view: Derived::new_with_equals(read, equals),
            write: Rc::new(write),
        }
    }

    /// The read half, usable with [`Store::read`] and [`Store::watch`].
    pub fn view(&self) -> &Derived<T> {
        &self.view
    }
}

impl<T, A> std::fmt::Debug for WritableDerived<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WritableDerived").finish_non_exhaustive()
    }
}

// =============================================================================
// CREATION FUNCTION
// =============================================================================

/// Create a writable derived view.
pub fn writable_derived<T, A, R, W>(read: R, write: W) -> WritableDerived<T, A>
where
    R: Fn(&Getter) -> T + 'static,
    W: Fn(&Setter, A) + 'static,
    T: PartialEq,
{
    WritableDerived::new(read, write)
}

// =============================================================================
// STORE INTEGRATION
// =============================================================================

impl Store {
    /// Run a writable derived's write function against this store.
    pub fn write<T, A>(&self, writable: &WritableDerived<T, A>, arg: A) {
        let setter = Setter { store: self };
        (writable.write)(&setter, arg);
    }
}

// =============================================================================
// TESTS
// =============================================================================
