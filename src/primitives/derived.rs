// ============================================================================
// ember-atoms - Derived Views
// Read-only computed views over cells, recomputed per read
// ============================================================================
//
// A Derived carries no value of its own. Reading one through a store runs
// its read function against a Getter that records every cell touched; a
// Watcher uses that recording to subscribe to exactly the dependency set,
// re-collecting it after each change since dependencies may be conditional.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::store::Store;
use crate::core::types::{default_equals, CellId, EqualsFn};
use crate::primitives::cell::Cell;

// =============================================================================
// GETTER
// =============================================================================

/// Read access handed to a derived's read function.
///
/// Every cell read through the getter is recorded as a dependency of the
/// computation, including cells reached through nested deriveds.
pub struct Getter<'a> {
    store: &'a Store,
    deps: RefCell<Vec<CellId>>,
}

impl<'a> Getter<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Self {
            store,
            deps: RefCell::new(Vec::new()),
        }
    }

    /// Read a cell's current value, recording it as a dependency.
    pub fn get<T: Clone + 'static>(&self, cell: &Cell<T>) -> T {
        self.record(cell.id());
        self.store.get(cell)
    }

    /// Read another derived view, recording its cell dependencies as part
    /// of this computation.
    pub fn read<T>(&self, derived: &Derived<T>) -> T {
        derived.compute(self)
    }

    fn record(&self, id: CellId) {
        let mut deps = self.deps.borrow_mut();
        if !deps.contains(&id) {
            deps.push(id);
        }
    }

    pub(crate) fn into_deps(self) -> Vec<CellId> {
        self.deps.into_inner()
    }
}

// =============================================================================
// DERIVED<T> - The public derived handle
// =============================================================================

struct DerivedInner<T> {
    read: Box<dyn Fn(&Getter) -> T>,
    equals: EqualsFn<T>,
}

/// A read-only computed view over cells.
///
/// Deriveds are recomputed on every read; they hold no cached value. The
/// equality function is used by [`Store::watch`] to decide whether a
/// recomputation produced a visible change.
///
/// # Example
///
/// ```
/// use ember_atoms::{cell, derived, Store};
///
/// let count = cell(2);
/// let count_dep = count.clone();
/// let doubled = derived(move |get| get.get(&count_dep) * 2);
///
/// let store = Store::new();
/// assert_eq!(store.read(&doubled), 4);
///
/// store.set(&count, 5);
/// assert_eq!(store.read(&doubled), 10);
/// ```
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Derived<T> {
    /// Create a new derived view from a read function.
    pub fn new<F>(read: F) -> Self
    where
        F: Fn(&Getter) -> T + 'static,
        T: PartialEq,
    {
        Self::new_with_equals(read, default_equals)
    }

    /// Create a derived view with a custom equality function.
    pub fn new_with_equals<F>(read: F, equals: EqualsFn<T>) -> Self
    where
        F: Fn(&Getter) -> T + 'static,
    {
        Self {
            inner: Rc::new(DerivedInner {
                read: Box::new(read),
                equals,
            }),
        }
    }

    /// The derived's equality function.
    pub fn equals_fn(&self) -> EqualsFn<T> {
        self.inner.equals
    }

    pub(crate) fn compute(&self, getter: &Getter) -> T {
        (self.inner.read)(getter)
    }
}

impl<T> std::fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived").finish_non_exhaustive()
    }
}

// =============================================================================
// DERIVED CREATION FUNCTIONS
// =============================================================================

/// Create a read-only derived view.
///
/// # Example
///
/// ```
/// use ember_atoms::{cell, derived, default_store};
///
/// let first = cell(String::from("ada"));
/// let last = cell(String::from("lovelace"));
///
/// let (f, l) = (first.clone(), last.clone());
/// let full = derived(move |get| format!("{} {}", get.get(&f), get.get(&l)));
///
/// assert_eq!(default_store().read(&full), "ada lovelace");
/// ```
pub fn derived<T, F>(read: F) -> Derived<T>
where
    F: Fn(&Getter) -> T + 'static,
    T: PartialEq,
{
    Derived::new(read)
}

/// Create a derived view with a custom equality function.
pub fn derived_with_equals<T, F>(read: F, equals: EqualsFn<T>) -> Derived<T>
where
    F: Fn(&Getter) -> T + 'static,
{
    Derived::new_with_equals(read, equals)
}

// =============================================================================
// WATCHER - Subscription to a derived view
// =============================================================================

struct WatcherInner<T> {
    store: Store,
    derived: Derived<T>,
    on_change: Box<dyn Fn()>,
    last: RefCell<T>,
    // The one strong reference to the live dependency callback; replacing
    // it detaches every previous attachment at once.
    callback: RefCell<Option<Rc<dyn Fn()>>>,
}

/// Handle returned by [`Store::watch`]. Dropping it detaches the watcher.
pub struct Watcher<T> {
    inner: Rc<WatcherInner<T>>,
}

impl<T: 'static> Watcher<T> {
    /// The most recently computed value of the watched derived.
    pub fn value(&self) -> T
    where
        T: Clone,
    {
        self.inner.last.borrow().clone()
    }

    /// Explicitly detach. Equivalent to dropping the handle.
    pub fn detach(self) {}

    /// Attach one shared callback to every dependency cell, replacing the
    /// previous wiring.
    fn attach_deps(inner: &Rc<WatcherInner<T>>, deps: &[CellId]) {
        let weak = Rc::downgrade(inner);
        let callback: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                Self::refresh(&inner);
            }
        });
        for id in deps {
            inner.store.attach(*id, &callback);
        }
        *inner.callback.borrow_mut() = Some(callback);
    }

    /// Recompute after a dependency changed: rewire to the (possibly
    /// different) dependency set, then report only equality-visible
    /// changes.
    fn refresh(inner: &Rc<WatcherInner<T>>) {
        let getter = Getter::new(&inner.store);
        let value = inner.derived.compute(&getter);
        let deps = getter.into_deps();
        Self::attach_deps(inner, &deps);

        let changed = {
            let last = inner.last.borrow();
            !(inner.derived.equals_fn())(&*last, &value)
        };
        if changed {
            *inner.last.borrow_mut() = value;
            (inner.on_change)();
        }
    }
}

// =============================================================================
// STORE INTEGRATION
// =============================================================================

impl Store {
    /// Compute a derived view's current value against this store.
    pub fn read<T>(&self, derived: &Derived<T>) -> T {
        let getter = Getter::new(self);
        derived.compute(&getter)
    }

    /// Watch a derived view for changes in this store.
    ///
    /// The callback fires whenever a dependency change makes the computed
    /// value differ from the previous one under the derived's equality
    /// function. The dependency set is re-collected after every change,
    /// so conditional reads are tracked correctly.
    ///
    /// # Example
    ///
    /// ```
    /// use ember_atoms::{cell, derived, Store};
    /// use std::cell::Cell as StdCell;
    /// use std::rc::Rc;
    ///
    /// let count = cell(1);
    /// let count_dep = count.clone();
    /// let doubled = derived(move |get| get.get(&count_dep) * 2);
    ///
    /// let store = Store::new();
    /// let fired = Rc::new(StdCell::new(0));
    /// let fired_in_watch = fired.clone();
    ///
    /// let watcher = store.watch(&doubled, move || {
    ///     fired_in_watch.set(fired_in_watch.get() + 1);
    /// });
    ///
    /// store.set(&count, 3);
    /// assert_eq!(fired.get(), 1);
    /// assert_eq!(watcher.value(), 6);
    /// ```
    pub fn watch<T: 'static>(&self, derived: &Derived<T>, f: impl Fn() + 'static) -> Watcher<T> {
        let getter = Getter::new(self);
        let value = derived.compute(&getter);
        let deps = getter.into_deps();

        let inner = Rc::new(WatcherInner {
            store: self.clone(),
            derived: derived.clone(),
            on_change: Box::new(f),
            last: RefCell::new(value),
            callback: RefCell::new(None),
        });
        Watcher::attach_deps(&inner, &deps);

        Watcher { inner }
    }
}

// =============================================================================
// TESTS
// =============================================================================
