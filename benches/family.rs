//! Benchmarks for ember-atoms
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ember_atoms::{cell, family_with_equals, family_with_options, FamilyOptions, Store};
use std::rc::Rc;

// =============================================================================
// CELL + STORE BENCHMARKS
// =============================================================================

fn bench_cell_create(c: &mut Criterion) {
    c.bench_function("cell_create", |b| {
        b.iter(|| black_box(cell(0i32)))
    });
}

fn bench_store_get(c: &mut Criterion) {
    let count = cell(42i32);
    let store = Store::new();
    store.get(&count);

    c.bench_function("store_get", |b| {
        b.iter(|| black_box(store.get(&count)))
    });
}

fn bench_store_set(c: &mut Criterion) {
    let count = cell(0i32);
    let store = Store::new();

    c.bench_function("store_set", |b| {
        let mut v = 0;
        b.iter(|| {
            v += 1;
            store.set(&count, black_box(v))
        })
    });
}

fn bench_store_set_same_value(c: &mut Criterion) {
    let count = cell(42i32);
    let store = Store::new();
    store.get(&count);

    c.bench_function("store_set_same_value", |b| {
        b.iter(|| store.set(&count, black_box(42)))
    });
}

// =============================================================================
// FAMILY BENCHMARKS
// =============================================================================

fn bound_family(store: &Store) -> ember_atoms::Family<u32, u32> {
    let bound = store.clone();
    family_with_options(
        |id: &u32| cell(*id),
        FamilyOptions {
            key_equals: None,
            store: Some(Rc::new(move || bound.clone())),
        },
    )
}

fn bench_family_get_hit(c: &mut Criterion) {
    let store = Store::new();
    let fam = bound_family(&store);
    for id in 0..100u32 {
        fam.add(&id);
    }

    c.bench_function("family_get_hit_100", |b| {
        b.iter(|| black_box(fam.get(black_box(&50))))
    });
}

fn bench_family_add_remove(c: &mut Criterion) {
    let store = Store::new();
    let fam = bound_family(&store);
    for id in 0..100u32 {
        fam.add(&id);
    }

    c.bench_function("family_add_remove", |b| {
        b.iter(|| {
            fam.add(&1000);
            fam.remove(&1000);
        })
    });
}

fn bench_family_structured_key_scan(c: &mut Criterion) {
    #[derive(Clone)]
    struct Key {
        id: u32,
    }

    fn same_id(a: &Key, b: &Key) -> bool {
        a.id == b.id
    }

    let fam = family_with_equals(|key: &Key| cell(key.id), same_id);
    for id in 0..100u32 {
        fam.add(&Key { id });
    }

    c.bench_function("family_structured_key_scan_100", |b| {
        b.iter(|| black_box(fam.get(black_box(&Key { id: 99 }))))
    });
}

fn bench_family_keys_read(c: &mut Criterion) {
    let store = Store::new();
    let fam = bound_family(&store);
    for id in 0..100u32 {
        fam.add(&id);
    }
    let keys = fam.keys();

    c.bench_function("family_keys_read_100", |b| {
        b.iter(|| black_box(store.read(&keys)))
    });
}

criterion_group!(
    benches,
    bench_cell_create,
    bench_store_get,
    bench_store_set,
    bench_store_set_same_value,
    bench_family_get_hit,
    bench_family_add_remove,
    bench_family_structured_key_scan,
    bench_family_keys_read,
);
criterion_main!(benches);
