use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hoard_store::BoundedStore;
use hoard_types::ByteView;

fn bench_put_with_eviction(c: &mut Criterion) {
    let store = BoundedStore::new(64 * 1024);
    let value = ByteView::from(vec![7u8; 128]);
    let mut i = 0u64;
    c.bench_function("bounded_store_put_evicting", |b| {
        b.iter(|| {
            i += 1;
            store.put(&format!("key-{i}"), value.clone());
        })
    });
}

fn bench_get_hit(c: &mut Criterion) {
    let store = BoundedStore::new(0);
    for i in 0..1024 {
        store.put(&format!("key-{i}"), ByteView::from("value"));
    }
    c.bench_function("bounded_store_get_hit", |b| {
        b.iter(|| black_box(store.get(black_box("key-512"))))
    });
}

criterion_group!(benches, bench_put_with_eviction, bench_get_hit);
criterion_main!(benches);
