//! Sweep driver (C9, §4.9). Iterates the 11×11 `(p_traced, p_app)` grid and
//! emits tab-delimited replicate records, following the "grid of independent
//! embarrassingly-parallel cells, one RNG stream per worker" division of
//! labor described for the sweep in §5, grounded on the preamble/grid/
//! trailer shape of `computed_statistics.rs`'s summary output.

use crate::contact_log::ContactLog;
use crate::driver::{self, RunOutput};
use crate::params::SimParams;
use ixa::{Context, ContextRandomExt};

/// One sweep cell: `(p_traced, p_app)`.
#[derive(Debug, Clone, Copy)]
pub struct GridPoint {
    pub p_traced: f64,
    pub p_app: f64,
}

/// The 11×11 grid spanning `[0.0, 1.0]` in steps of 0.1, inclusive (§4.9).
pub fn grid() -> Vec<GridPoint> {
    let mut points = Vec::with_capacity(121);
    for i in 0..=10 {
        for j in 0..=10 {
            points.push(GridPoint {
                p_traced: i as f64 / 10.0,
                p_app: j as f64 / 10.0,
            });
        }
    }
    points
}

/// One completed replicate at a grid point, ready to be formatted as a data
/// line (§6).
#[derive(Debug, Clone, Copy)]
pub struct SweepRecord {
    pub p_traced: f64,
    pub p_app: f64,
    pub output: RunOutput,
}

/// Run `iterations` independent replicates at every grid point, seeding each
/// replicate's `Context` distinctly from `base_seed` so replicates never
/// share an RNG stream (§5).
pub fn run_sweep(
    log: &ContactLog,
    base_params: &SimParams,
    base_seed: u64,
    iterations: u32,
) -> Vec<SweepRecord> {
    let points = grid();
    let mut records = Vec::with_capacity(points.len() * iterations as usize);
    let mut seed_counter: u64 = 0;

    for point in points {
        let mut params = *base_params;
        params.intervention.p_traced = point.p_traced;
        params.intervention.p_app = point.p_app;

        for _ in 0..iterations {
            let mut context = Context::new();
            context.init_random(base_seed.wrapping_add(seed_counter));
            seed_counter += 1;

            let output = driver::run(&mut context, log, &params);
            records.push(SweepRecord {
                p_traced: point.p_traced,
                p_app: point.p_app,
                output,
            });
        }
    }

    records
}

/// Format one preamble line per base parameter (§6: `Parameter\t<name>\t<value>`).
pub fn format_preamble(params: &SimParams) -> Vec<String> {
    vec![
        format!("Parameter\tp_app\t{}", params.intervention.p_app),
        format!("Parameter\tp_tested\t{}", params.intervention.p_tested),
        format!("Parameter\tp_traced\t{}", params.intervention.p_traced),
        format!("Parameter\tp_mask\t{}", params.intervention.p_mask),
        format!(
            "Parameter\ttest_delay_days\t{}",
            params.intervention.test_delay_days
        ),
        format!(
            "Parameter\ttrace_delay_manual_days\t{}",
            params.intervention.trace_delay_manual_days
        ),
        format!(
            "Parameter\ttrace_delay_app_days\t{}",
            params.intervention.trace_delay_app_days
        ),
        format!(
            "Parameter\tmanual_tracing_threshold\t{}",
            params.intervention.manual_tracing_threshold
        ),
        format!(
            "Parameter\tapp_tracing_threshold\t{}",
            params.intervention.app_tracing_threshold
        ),
        format!("Parameter\toddweeks\t{}", params.intervention.oddweeks),
        format!(
            "Parameter\tmask_reduction_out\t{}",
            params.intervention.mask_reduction_out
        ),
        format!(
            "Parameter\tmask_reduction_in\t{}",
            params.intervention.mask_reduction_in
        ),
        format!(
            "Parameter\ttracelength_days\t{}",
            params.intervention.tracelength_days
        ),
        format!(
            "Parameter\tquarantine_length_days\t{}",
            params.intervention.quarantine_length_days
        ),
    ]
}

/// Format one data line (§6: `<p_traced>\t<p_app>\t<I>\t<q>\t<fq>`).
pub fn format_record(record: &SweepRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        record.p_traced,
        record.p_app,
        record.output.total_infected,
        record.output.quarantines,
        record.output.fq_ratio()
    )
}
