use ember_atoms::{
    cell, default_store, family, family_with_options, FamilyOptions, Store, StoreResolver,
};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn unbound_families_use_the_default_store() {
    let items = family(|id: &u32| cell(*id));
    items.add(&1);

    assert_eq!(default_store().read(&items.keys()), vec![1]);

    // A detached store knows nothing about this family's keys.
    let detached = Store::new();
    assert_eq!(detached.read(&items.keys()), Vec::<u32>::new());
}

#[test]
fn bound_families_write_keys_only_into_their_store() {
    let bound = Store::new();
    let resolver_target = bound.clone();
    let items = family_with_options(
        |id: &u32| cell(*id),
        FamilyOptions {
            key_equals: None,
            store: Some(Rc::new(move || resolver_target.clone())),
        },
    );

    items.add(&1);
    items.add(&2);

    assert_eq!(bound.read(&items.keys()), vec![1, 2]);
    assert_eq!(default_store().read(&items.keys()), Vec::<u32>::new());
}

#[test]
fn swapping_the_resolved_store_resets_the_observable_key_set() {
    // The resolver is consulted on every mutation, so redirecting it to a
    // fresh store is a wholesale "reset all state" switch.
    let current: Rc<RefCell<Store>> = Rc::new(RefCell::new(Store::new()));
    let resolver: StoreResolver = {
        let current = current.clone();
        Rc::new(move || current.borrow().clone())
    };

    let items = family_with_options(
        |id: &u32| cell(*id),
        FamilyOptions {
            key_equals: None,
            store: Some(resolver),
        },
    );

    items.add(&1);
    items.add(&2);
    let first_store = current.borrow().clone();
    assert_eq!(first_store.read(&items.keys()), vec![1, 2]);

    // Swap in a fresh store: the Key Set observable starts over.
    *current.borrow_mut() = Store::new();
    let second_store = current.borrow().clone();
    assert_eq!(second_store.read(&items.keys()), Vec::<u32>::new());

    // New registrations land in the new store only.
    items.add(&3);
    assert_eq!(second_store.read(&items.keys()), vec![3]);
    assert_eq!(first_store.read(&items.keys()), vec![1, 2]);
}

#[test]
fn cell_values_are_per_store() {
    let count = cell(0);
    let a = Store::new();
    let b = Store::new();

    a.set(&count, 1);
    b.set(&count, 2);

    assert_eq!(a.get(&count), 1);
    assert_eq!(b.get(&count), 2);
}

#[test]
fn purge_reclaims_a_removed_cell_slot() {
    let bound = Store::new();
    let resolver_target = bound.clone();
    let items = family_with_options(
        |id: &u32| cell(*id as i64),
        FamilyOptions {
            key_equals: None,
            store: Some(Rc::new(move || resolver_target.clone())),
        },
    );

    let one = items.get(&1);
    bound.set(&one, 500);
    items.remove(&1);

    // Removal detaches the cell from the family but its last value stays
    // in the store until explicitly purged.
    assert_eq!(bound.get(&one), 500);
    bound.purge(&one);
    assert_eq!(bound.get(&one), 1, "purged slot re-initializes on read");
}

#[test]
fn default_store_survives_across_handles() {
    let count = cell(100);

    let a = default_store();
    let b = default_store();
    a.set(&count, 7);

    assert_eq!(b.get(&count), 7);
}
