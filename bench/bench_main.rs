use criterion::{criterion_group, criterion_main};

mod benchmarks;
use benchmarks::contact_book::contact_book_benchmarks;
use benchmarks::contact_replay::contact_replay_benchmarks;

criterion_group!(
    replay_benches,
    contact_replay_benchmarks,
    contact_book_benchmarks,
);

criterion_main!(replay_benches);
