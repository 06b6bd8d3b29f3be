//! `epi-sweep`: runs the full 11×11 `(p_traced, p_app)` grid across many
//! replicates and emits tab-delimited records (§4.9, §6, §A5 of
//! SPEC_FULL.md).

use clap::Parser;
use epi_trace_sim::config::{init_logging, load_params};
use epi_trace_sim::contact_log::ContactLog;
use epi_trace_sim::driver;
use epi_trace_sim::params::SimParams;
use epi_trace_sim::sweep::{format_preamble, format_record, grid, SweepRecord};
use ixa::{info, Context, ContextRandomExt};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

#[derive(Parser, Debug)]
#[command(name = "epi-sweep", about = "Run the p_traced x p_app sweep grid")]
struct Args {
    /// Path to the proximity contact-log CSV (§6).
    #[arg(long)]
    contacts: PathBuf,

    /// Optional JSON file overriding default parameters (§A1).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base RNG seed; each replicate derives a distinct stream from it (§5).
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Independent replicates per grid cell.
    #[arg(long, default_value_t = 10)]
    iterations: u32,

    /// Also write the TSV stream to this file (§A8).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of worker threads to distribute sweep cells across (§A8).
    /// Defaults to 1 (single-threaded, matching the core simulator's
    /// cooperative single-thread model, §5).
    #[arg(long, default_value_t = 1)]
    threads: usize,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Distribute the grid's 121 cells (each run `iterations` times) across
/// `threads` workers, each owning its own `Context`/RNG stream seeded by
/// `base_seed ^ cell_index` (§5, §A8).
fn run_sweep_parallel(
    log: &ContactLog,
    params: &SimParams,
    base_seed: u64,
    iterations: u32,
    threads: usize,
) -> Vec<SweepRecord> {
    let cells = grid();
    thread::scope(|scope| {
        let chunk_size = cells.len().div_ceil(threads.max(1));
        let handles: Vec<_> = cells
            .chunks(chunk_size.max(1))
            .enumerate()
            .map(|(chunk_idx, chunk)| {
                scope.spawn(move || {
                    let mut out = Vec::with_capacity(chunk.len() * iterations as usize);
                    for (cell_idx, point) in chunk.iter().enumerate() {
                        let mut cell_params = *params;
                        cell_params.intervention.p_traced = point.p_traced;
                        cell_params.intervention.p_app = point.p_app;
                        for rep in 0..iterations {
                            let seed = base_seed
                                ^ ((chunk_idx as u64) << 32)
                                ^ (cell_idx as u64).wrapping_mul(1_000_003)
                                ^ rep as u64;
                            let mut context = Context::new();
                            context.init_random(seed);
                            let output = driver::run(&mut context, log, &cell_params);
                            out.push(SweepRecord {
                                p_traced: point.p_traced,
                                p_app: point.p_app,
                                output,
                            });
                        }
                    }
                    out
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    })
}

fn run(args: Args) -> Result<(), epi_trace_sim::SimError> {
    init_logging(args.verbose);

    let params = load_params(args.config.as_deref())?;
    let log = ContactLog::load(&args.contacts)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::sink()),
    };

    for line in format_preamble(&params) {
        println!("{line}");
        writeln!(out, "{line}")?;
    }

    info!(
        "starting sweep: iterations={} threads={}",
        args.iterations, args.threads
    );
    let records = run_sweep_parallel(&log, &params, args.seed, args.iterations, args.threads);

    for record in &records {
        let line = format_record(record);
        println!("{line}");
        writeln!(out, "{line}")?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let start = std::time::Instant::now();
    match run(args) {
        Ok(()) => {
            let minutes = start.elapsed().as_secs_f64() / 60.0;
            println!("Time: {minutes:.3} min");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("epi-sweep: {e}");
            ExitCode::FAILURE
        }
    }
}
