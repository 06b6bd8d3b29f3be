//! Per-STEP contact iteration (§9 Performance notes): the driver's
//! inner loop over `ContactLog::contacts_at(t)`, recording a contact on
//! both sides of every pair.

use criterion::Criterion;
use epi_trace_sim::agent::{Agent, AgentTable};
use epi_trace_sim::contact_log::ContactLog;
use std::hint::black_box;
use std::io::Write;

fn build_log(pairs: usize) -> ContactLog {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(f, "timestamp_s,id_i,id_j,rssi").unwrap();
    for i in 0..pairs {
        writeln!(f, "0,{},{},-50", i, i + pairs).unwrap();
    }
    ContactLog::load(f.path()).expect("valid synthetic log")
}

pub fn contact_replay_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("contact_replay::per_step_iteration");

    for &pairs in &[100usize, 1_000, 5_000] {
        let log = build_log(pairs);
        group.bench_function(format!("pairs_{pairs}"), |b| {
            b.iter(|| {
                let mut table = AgentTable::new();
                for &id in log.ids() {
                    table.insert(Agent::new(id, false, false, 0));
                }
                for &(i, j) in log.contacts_at(0) {
                    table.get_mut(i).record_contact(j, 0);
                    table.get_mut(j).record_contact(i, 0);
                }
                black_box(&table);
            });
        });
    }

    group.finish();
}
