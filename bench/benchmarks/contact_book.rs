//! Per-pair contact-book append (§9 Performance notes): repeated
//! `Agent::record_contact` and the trimming cost in `recent_contact_count`
//! as the rolling window fills and slides.

use criterion::Criterion;
use epi_trace_sim::agent::{Agent, AgentId};
use epi_trace_sim::time::STEP;
use std::hint::black_box;

pub fn contact_book_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("contact_book::record_and_trim");
    let peer = AgentId(1);
    let tracelength = 2 * 86_400;

    group.bench_function("append_only", |b| {
        b.iter(|| {
            let mut agent = Agent::new(AgentId(0), false, false, 0);
            for i in 0..500 {
                agent.record_contact(peer, i * STEP);
            }
            black_box(&agent);
        });
    });

    group.bench_function("append_then_trim_sliding_window", |b| {
        b.iter(|| {
            let mut agent = Agent::new(AgentId(0), false, false, 0);
            let mut t = 0i64;
            for _ in 0..500 {
                agent.record_contact(peer, t);
                black_box(agent.recent_contact_count(peer, t, tracelength));
                t += STEP;
            }
            black_box(&agent);
        });
    });

    group.finish();
}
