// ============================================================================
// ember-atoms - Store
// The reactive-state instance that owns cell values and subscriber lists
// ============================================================================
//
// Cells are value-less handles; a cell's value lives in whichever store
// reads it. Slots are keyed by CellId and hold the value type-erased -
// slot bookkeeping never needs T, only reads and writes do.
// ============================================================================

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::types::CellId;
use crate::primitives::cell::Cell;

// =============================================================================
// SLOT
// =============================================================================

/// Per-cell state inside a store: the (lazily initialized) value plus the
/// subscribers interested in it.
///
/// Subscribers are held weakly; the strong reference lives in the
/// `Subscription` handle, so dropping the handle is unsubscription.
#[derive(Default)]
struct Slot {
    value: Option<Box<dyn Any>>,
    subscribers: Vec<Weak<dyn Fn()>>,
}

// =============================================================================
// STORE
// =============================================================================

struct StoreInner {
    slots: RefCell<HashMap<CellId, Slot>>,
}

/// A store instance holding one value per cell that has been read or
/// written through it.
///
/// `Store` is a cheap clone-able handle; clones share state. Independent
/// stores created with `Store::new()` hold independent values for the same
/// cell, which is what makes wholesale state resets possible: point
/// consumers at a fresh store and every cell starts over from its
/// initializer.
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
///
/// // A second store sees the initial value, not 5.
/// let other = Store::new();
/// assert_eq!(other.get(&count), 0);
/// ```
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Store {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StoreInner {
                slots: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Initialize the cell's slot if it has no value yet.
    ///
    /// The initializer is user code, so it runs with no slot borrow held;
    /// the slot is re-checked afterwards and the first value wins.
    fn ensure_value<T: 'static>(&self, cell: &Cell<T>) {
        let initialized = {
            let slots = self.inner.slots.borrow();
            slots
                .get(&cell.id())
                .is_some_and(|slot| slot.value.is_some())
        };
        if initialized {
            return;
        }

        let value = cell.initial_value();

        let mut slots = self.inner.slots.borrow_mut();
        let slot = slots.entry(cell.id()).or_default();
        if slot.value.is_none() {
            slot.value = Some(Box::new(value));
        }
    }

    /// Get the cell's current value in this store (cloning), initializing
    /// it on first access.
    pub fn get<T: Clone + 'static>(&self, cell: &Cell<T>) -> T {
        self.with(cell, T::clone)
    }

    /// Access the cell's current value with a closure (avoids cloning).
    ///
    /// The closure runs while the value is borrowed: it may read other
    /// cells from this store but must not write to it.
    pub fn with<T: 'static, R>(&self, cell: &Cell<T>, f: impl FnOnce(&T) -> R) -> R {
        self.ensure_value(cell);
        let slots = self.inner.slots.borrow();
        let value = slots
            .get(&cell.id())
            .and_then(|slot| slot.value.as_ref())
            .expect("slot initialized by ensure_value");
        let value = value
            .downcast_ref::<T>()
            .expect("cell value type mismatch");
        f(value)
    }

    /// Set the cell's value in this store.
    ///
    /// Returns true if the value changed under the cell's equality
    /// strategy. Subscribers are notified only on change, after the write
    /// is fully applied.
    ///
    /// Setting a cell that has never been read does not run its
    /// initializer; the value is stored directly.
    pub fn set<T: 'static>(&self, cell: &Cell<T>, value: T) -> bool {
        let changed = {
            let mut slots = self.inner.slots.borrow_mut();
            let slot = slots.entry(cell.id()).or_default();
            let changed = match &slot.value {
                Some(boxed) => {
                    let current = boxed
                        .downcast_ref::<T>()
                        .expect("cell value type mismatch");
                    !(cell.equals_fn())(current, &value)
                }
                None => true,
            };
            if changed {
                slot.value = Some(Box::new(value));
            }
            changed
        };

        if changed {
            self.notify(cell.id());
        }
        changed
    }

    /// Update the cell's value in place using a closure, then notify
    /// subscribers.
    ///
    /// Because the value is mutated in place there is no equality check;
    /// subscribers are always notified. The closure runs while the value
    /// is borrowed mutably and must not touch this store.
    pub fn update<T: 'static>(&self, cell: &Cell<T>, f: impl FnOnce(&mut T)) {
        self.ensure_value(cell);
        {
            let mut slots = self.inner.slots.borrow_mut();
            let value = slots
                .get_mut(&cell.id())
                .and_then(|slot| slot.value.as_mut())
                .expect("slot initialized by ensure_value");
            let value = value
                .downcast_mut::<T>()
                .expect("cell value type mismatch");
            f(value);
        }
        self.notify(cell.id());
    }

    /// Reset the cell back to its initial value in this store.
    ///
    /// Re-runs the cell's initializer and writes the result through the
    /// equality gate. Returns true if the value changed.
    pub fn reset<T: 'static>(&self, cell: &Cell<T>) -> bool {
        self.set(cell, cell.initial_value())
    }

    /// Subscribe to changes of the cell's value in this store.
    ///
    /// The callback fires after every visible change (`set` that passed
    /// the equality gate, or any `update`). It receives no payload;
    /// re-read whatever is needed. Subscribing initializes the cell.
    ///
    /// Dropping the returned `Subscription` unsubscribes.
    pub fn subscribe<T: 'static>(&self, cell: &Cell<T>, f: impl Fn() + 'static) -> Subscription {
        self.ensure_value(cell);
        let callback: Rc<dyn Fn()> = Rc::new(f);
        self.attach(cell.id(), &callback);
        Subscription {
            _callback: callback,
        }
    }

    /// Attach an existing callback to a cell id. Used by derived watchers,
    /// which share one callback across all dependency cells.
    pub(crate) fn attach(&self, id: CellId, callback: &Rc<dyn Fn()>) {
        let mut slots = self.inner.slots.borrow_mut();
        let slot = slots.entry(id).or_default();
        slot.subscribers.push(Rc::downgrade(callback));
    }

    /// Drop the cell's slot from this store: its value and subscriber
    /// list.
    ///
    /// Explicit memory reclamation for cells that will not be used again
    /// (e.g. after removing them from a family). A later read re-runs the
    /// cell's initializer.
    pub fn purge<T>(&self, cell: &Cell<T>) {
        self.inner.slots.borrow_mut().remove(&cell.id());
    }

    /// Notify the cell's subscribers.
    ///
    /// Callbacks are collected first and run with no slot borrow held, so
    /// a subscriber may freely read or write this store. Dead weak
    /// references are pruned on the way.
    fn notify(&self, id: CellId) {
        let callbacks: Vec<Rc<dyn Fn()>> = {
            let mut slots = self.inner.slots.borrow_mut();
            let Some(slot) = slots.get_mut(&id) else {
                return;
            };
            slot.subscribers.retain(|weak| weak.strong_count() > 0);
            slot.subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect()
        };

        for callback in callbacks {
            callback();
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("slots", &self.inner.slots.borrow().len())
            .finish()
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle returned by [`Store::subscribe`]. The store only holds a weak
/// reference to the callback, so dropping this handle unsubscribes.
pub struct Subscription {
    _callback: Rc<dyn Fn()>,
}

impl Subscription {
    /// Explicitly unsubscribe. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

// =============================================================================
// DEFAULT STORE
// =============================================================================

thread_local! {
    static DEFAULT_STORE: Store = Store::new();
}

/// The process-wide (per-thread) default store.
///
/// Created once and handed out as a clone-able handle. Everything that
/// takes a store accepts any instance; the default is just the one used
/// when nothing else was configured.
///
/// # Example
///
/// ```
/// use ember_atoms::{cell, default_store};
///
/// let count = cell(0);
/// default_store().set(&count, 3);
/// assert_eq!(default_store().get(&count), 3);
/// ```
pub fn default_store() -> Store {
    DEFAULT_STORE.with(Store::clone)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::cell::{cell, cell_with_default, cell_with_equals};
    use std::cell::Cell as StdCell;

    #[test]
    fn get_initializes_lazily() {
        let runs = Rc::new(StdCell::new(0));
        let runs_clone = runs.clone();
        let c = cell_with_default(move || {
            runs_clone.set(runs_clone.get() + 1);
            42
        });

        let store = Store::new();
        assert_eq!(runs.get(), 0);

        assert_eq!(store.get(&c), 42);
        assert_eq!(store.get(&c), 42);
        // Initializer ran exactly once.
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn set_and_get() {
        let c = cell(1);
        let store = Store::new();

        assert!(store.set(&c, 2));
        assert_eq!(store.get(&c), 2);
    }

    #[test]
    fn set_is_equality_gated() {
        let c = cell(5);
        let store = Store::new();

        assert!(!store.set(&c, 5));
        assert!(store.set(&c, 6));
        assert!(!store.set(&c, 6));
    }

    #[test]
    fn set_without_prior_read_skips_initializer() {
        let runs = Rc::new(StdCell::new(0));
        let runs_clone = runs.clone();
        let c = cell_with_default(move || {
            runs_clone.set(runs_clone.get() + 1);
            0
        });

        let store = Store::new();
        store.set(&c, 99);

        assert_eq!(runs.get(), 0);
        assert_eq!(store.get(&c), 99);
    }

    #[test]
    fn update_mutates_in_place() {
        let c = cell(vec![1, 2, 3]);
        let store = Store::new();

        store.update(&c, |v| v.push(4));
        assert_eq!(store.get(&c), vec![1, 2, 3, 4]);
    }

    #[test]
    fn with_avoids_clone() {
        let c = cell(vec![1, 2, 3]);
        let store = Store::new();

        let sum = store.with(&c, |v| v.iter().sum::<i32>());
        assert_eq!(sum, 6);
    }

    #[test]
    fn reset_restores_initial_value() {
        let c = cell(10);
        let store = Store::new();

        store.set(&c, 99);
        assert!(store.reset(&c));
        assert_eq!(store.get(&c), 10);

        // Resetting an already-initial value is not a change.
        assert!(!store.reset(&c));
    }

    #[test]
    fn subscribe_fires_on_change() {
        let c = cell(0);
        let store = Store::new();

        let fired = Rc::new(StdCell::new(0));
        let fired_clone = fired.clone();
        let _sub = store.subscribe(&c, move || {
            fired_clone.set(fired_clone.get() + 1);
        });

        store.set(&c, 1);
        assert_eq!(fired.get(), 1);

        // Equality-gated: no notification for an equal value.
        store.set(&c, 1);
        assert_eq!(fired.get(), 1);

        store.update(&c, |v| *v += 1);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let c = cell(0);
        let store = Store::new();

        let fired = Rc::new(StdCell::new(0));
        let fired_clone = fired.clone();
        {
            let _sub = store.subscribe(&c, move || {
                fired_clone.set(fired_clone.get() + 1);
            });
            store.set(&c, 1);
            assert_eq!(fired.get(), 1);
        }

        store.set(&c, 2);
        assert_eq!(fired.get(), 1, "callback must not run after drop");
    }

    #[test]
    fn subscriber_may_write_back_into_the_store() {
        let source = cell(0);
        let mirror = cell(0);
        let store = Store::new();

        let store_clone = store.clone();
        let source_clone = source.clone();
        let mirror_clone = mirror.clone();
        let _sub = store.subscribe(&source, move || {
            let v = store_clone.get(&source_clone);
            store_clone.set(&mirror_clone, v);
        });

        store.set(&source, 7);
        assert_eq!(store.get(&mirror), 7);
    }

    #[test]
    fn purge_forgets_the_value() {
        let c = cell(1);
        let store = Store::new();

        store.set(&c, 50);
        store.purge(&c);
        assert_eq!(store.get(&c), 1);
    }

    #[test]
    fn stores_are_independent() {
        let c = cell(0);
        let a = Store::new();
        let b = Store::new();

        a.set(&c, 1);
        b.set(&c, 2);

        assert_eq!(a.get(&c), 1);
        assert_eq!(b.get(&c), 2);
    }

    #[test]
    fn cloned_store_shares_state() {
        let c = cell(0);
        let a = Store::new();
        let b = a.clone();

        a.set(&c, 9);
        assert_eq!(b.get(&c), 9);
    }

    #[test]
    fn default_store_is_shared() {
        let c = cell(0);
        default_store().set(&c, 4);
        assert_eq!(default_store().get(&c), 4);
    }

    #[test]
    fn custom_equality_controls_notification() {
        // Never-equal values: every set is a change.
        let c = cell_with_equals(0, |_, _| false);
        let store = Store::new();

        assert!(store.set(&c, 0));
        assert!(store.set(&c, 0));
    }

    #[test]
    fn debug_format() {
        let store = Store::new();
        let c = cell(1);
        store.get(&c);

        let debug = format!("{:?}", store);
        assert!(debug.contains("Store"));
    }
}
