// ============================================================================
// ember-atoms - Cell Family
// A keyed registry of lazily created cells with an observable key set
// ============================================================================
//
// The family owns the key -> cell mapping and mirrors its domain into a
// Key Set cell living in the bound store. Entries are mutated before the
// single Key Set write that notifies, so observers always see the mapping
// and the Key Set in agreement.
//
// Key lookup is a linear scan under the configured equality function.
// Families are UI-scale collections; a hash-backed index would only pay
// off far beyond the sizes this is built for.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::store::{default_store, Store};
use crate::core::types::{default_equals, EqualsFn};
use crate::equality::never_equals;
use crate::primitives::cell::Cell;
use crate::primitives::derived::Derived;

// =============================================================================
// OPTIONS
// =============================================================================

/// Resolves which store backs a family's Key Set.
///
/// Invoked on every mutating operation, so swapping what the resolver
/// returns resets the family's observable Key Set wholesale.
pub type StoreResolver = Rc<dyn Fn() -> Store>;

/// Configuration for [`Family`] construction.
pub struct FamilyOptions<K> {
    /// Equality strategy over keys. Defaults to PartialEq value equality.
    pub key_equals: Option<EqualsFn<K>>,

    /// Store resolution for the Key Set. Defaults to [`default_store`].
    pub store: Option<StoreResolver>,
}

impl<K> Default for FamilyOptions<K> {
    fn default() -> Self {
        Self {
            key_equals: None,
            store: None,
        }
    }
}

// =============================================================================
// FAMILY<K, T> - The keyed cell registry
// =============================================================================

struct FamilyInner<K, T> {
    factory: Box<dyn Fn(&K) -> Cell<T>>,
    /// Insertion-ordered key -> cell entries. The first key stored for an
    /// equality class is the canonical key; later equal keys resolve to it.
    entries: RefCell<Vec<(K, Cell<T>)>>,
    /// The Key Set. Its value lives in the bound store; never-equal so
    /// every membership write notifies.
    keys_cell: Cell<Vec<K>>,
    key_equals: EqualsFn<K>,
    store: Option<StoreResolver>,
}

/// A keyed registry of lazily created cells.
///
/// Given a factory building a cell from a key, the family creates and
/// caches one cell per distinct key (distinct under the configured key
/// equality) and tracks the live keys as an observable sequence in the
/// bound store.
///
/// The factory must not mutate the family or touch a store; aside from
/// randomness used to seed the initial payload it should be pure. This is
/// a precondition, not something the family detects.
///
/// # Example
///
/// ```
/// use ember_atoms::{cell, family, default_store};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Square { top: f64, left: f64 }
///
/// let squares = family(|_id: &u32| cell(Square { top: 0.0, left: 0.0 }));
///
/// let store = default_store();
/// squares.add(&1);
/// squares.add(&2);
/// assert_eq!(store.read(&squares.keys()), vec![1, 2]);
///
/// // Equal keys resolve to the same cell.
/// let a = squares.get(&1);
/// let b = squares.get(&1);
/// assert!(a.is(&b));
///
/// squares.remove(&1);
/// assert_eq!(store.read(&squares.keys()), vec![2]);
/// ```
pub struct Family<K, T> {
    inner: Rc<FamilyInner<K, T>>,
}

impl<K, T> Clone for Family<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Clone + 'static, T: 'static> Family<K, T> {
    /// Create a family with PartialEq key equality and the default store.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&K) -> Cell<T> + 'static,
        K: PartialEq,
    {
        Self::from_parts(Box::new(factory), default_equals, None)
    }

    /// Create a family with an explicit key equality function.
    pub fn new_with_equals<F>(factory: F, key_equals: EqualsFn<K>) -> Self
    where
        F: Fn(&K) -> Cell<T> + 'static,
    {
        Self::from_parts(Box::new(factory), key_equals, None)
    }

    /// Create a family from full options.
    pub fn new_with_options<F>(factory: F, options: FamilyOptions<K>) -> Self
    where
        F: Fn(&K) -> Cell<T> + 'static,
        K: PartialEq,
    {
        let key_equals = options.key_equals.unwrap_or(default_equals);
        Self::from_parts(Box::new(factory), key_equals, options.store)
    }

    fn from_parts(
        factory: Box<dyn Fn(&K) -> Cell<T>>,
        key_equals: EqualsFn<K>,
        store: Option<StoreResolver>,
    ) -> Self {
        Self {
            inner: Rc::new(FamilyInner {
                factory,
                entries: RefCell::new(Vec::new()),
                keys_cell: Cell::from_default_with_equals(Vec::new, never_equals),
                key_equals,
                store,
            }),
        }
    }

    fn resolve_store(&self) -> Store {
        match &self.inner.store {
            Some(resolve) => resolve(),
            None => default_store(),
        }
    }

    /// Find the cell registered for a key equal to `key`, if any.
    fn lookup(&self, key: &K) -> Option<Cell<T>> {
        let entries = self.inner.entries.borrow();
        entries
            .iter()
            .find(|(existing, _)| (self.inner.key_equals)(existing, key))
            .map(|(_, cell)| cell.clone())
    }

    /// Register a new entry for a key with no existing equal entry.
    fn insert(&self, canonical: K) -> Cell<T> {
        let cell = (self.inner.factory)(&canonical);
        self.inner
            .entries
            .borrow_mut()
            .push((canonical.clone(), cell.clone()));

        let store = self.resolve_store();
        store.update(&self.inner.keys_cell, move |keys| keys.push(canonical));

        cell
    }

    /// Get the cell for a key, creating and registering it on first use.
    ///
    /// Looks up an existing entry whose key is equal to `key`; on a hit
    /// the existing cell is returned and the registry is untouched. On a
    /// miss the factory runs with the canonical key, the entry is
    /// recorded, and the key is appended to the Key Set in the bound
    /// store. Idempotent with respect to cell identity for equal keys.
    pub fn get(&self, key: &K) -> Cell<T> {
        if let Some(cell) = self.lookup(key) {
            return cell;
        }
        self.insert(key.clone())
    }

    /// Register a cell for the key without returning it.
    ///
    /// A no-op when an equal key is already registered: the existing entry
    /// is neither recreated nor reordered. Used to pre-populate a family
    /// before anything reads it.
    pub fn add(&self, key: &K) {
        if self.lookup(key).is_some() {
            return;
        }
        self.insert(key.clone());
    }

    /// Remove the entry whose key is equal to `key`, if present.
    ///
    /// Deletes the cell mapping and the canonical key's Key Set
    /// membership as one observable unit. Absent keys are a no-op;
    /// absence is steady state, not a failure.
    ///
    /// A removed cell is never resurrected: a later `get` for an equal
    /// key builds a brand-new cell with a fresh payload.
    pub fn remove(&self, key: &K) {
        let canonical = {
            let mut entries = self.inner.entries.borrow_mut();
            let Some(index) = entries
                .iter()
                .position(|(existing, _)| (self.inner.key_equals)(existing, key))
            else {
                return;
            };
            entries.remove(index).0
        };

        let key_equals = self.inner.key_equals;
        let store = self.resolve_store();
        store.update(&self.inner.keys_cell, move |keys| {
            keys.retain(|k| !key_equals(k, &canonical));
        });
    }

    /// Remove every entry and reset the Key Set to empty, together.
    pub fn clear(&self) {
        self.inner.entries.borrow_mut().clear();
        let store = self.resolve_store();
        store.set(&self.inner.keys_cell, Vec::new());
    }

    /// Read-only reactive projection of the live keys, in insertion
    /// order.
    ///
    /// Consume it with [`Store::read`] or [`Store::watch`]; it updates
    /// whenever `get` (on a miss), `add`, `remove`, or `clear` change
    /// membership.
    pub fn keys(&self) -> Derived<Vec<K>> {
        let keys_cell = self.inner.keys_cell.clone();
        Derived::new_with_equals(move |get| get.get(&keys_cell), never_equals)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Whether the family has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entry exists for a key equal to `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.lookup(key).is_some()
    }
}

impl<K, T> std::fmt::Debug for Family<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Family")
            .field("len", &self.inner.entries.borrow().len())
            .finish()
    }
}

// =============================================================================
// FAMILY CREATION FUNCTIONS
// =============================================================================

/// Create a cell family from a factory function.
///
/// # Example
///
/// ```
/// use ember_atoms::{cell, family, default_store};
///
/// let counters = family(|start: &i32| cell(*start));
///
/// let store = default_store();
/// let c = counters.get(&10);
/// assert_eq!(store.get(&c), 10);
/// ```
pub fn family<K, T, F>(factory: F) -> Family<K, T>
where
    F: Fn(&K) -> Cell<T> + 'static,
    K: Clone + PartialEq + 'static,
    T: 'static,
{
    Family::new(factory)
}

/// Create a cell family with an explicit key equality function.
pub fn family_with_equals<K, T, F>(factory: F, key_equals: EqualsFn<K>) -> Family<K, T>
where
    F: Fn(&K) -> Cell<T> + 'static,
    K: Clone + 'static,
    T: 'static,
{
    Family::new_with_equals(factory, key_equals)
}

/// Create a cell family from full options.
pub fn family_with_options<K, T, F>(factory: F, options: FamilyOptions<K>) -> Family<K, T>
where
    F: Fn(&K) -> Cell<T> + 'static,
    K: Clone + PartialEq + 'static,
    T: 'static,
{
    Family::new_with_options(factory, options)
}

// =============================================================================
// TESTS
// =============================================================================
