//! `epi-sim`: runs one replicate of the epidemic simulation over a
//! proximity contact log (§A5 of SPEC_FULL.md).

use clap::Parser;
use epi_trace_sim::config::{init_logging, load_params};
use epi_trace_sim::contact_log::ContactLog;
use epi_trace_sim::driver;
use ixa::{Context, ContextRandomExt};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "epi-sim", about = "Run one epidemic simulation replicate")]
struct Args {
    /// Path to the proximity contact-log CSV (§6).
    #[arg(long)]
    contacts: PathBuf,

    /// Optional JSON file overriding default parameters (§A1).
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for this replicate.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Override the manual trace-recall probability.
    #[arg(long = "p-traced")]
    p_traced: Option<f64>,

    /// Override the app-adoption probability.
    #[arg(long = "p-app")]
    p_app: Option<f64>,

    /// Increase log verbosity (`-v` = Debug, `-vv` = Trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args) -> Result<(), epi_trace_sim::SimError> {
    init_logging(args.verbose);

    let mut params = load_params(args.config.as_deref())?;
    if let Some(p) = args.p_traced {
        params.intervention.p_traced = p;
    }
    if let Some(p) = args.p_app {
        params.intervention.p_app = p;
    }

    let log = ContactLog::load(&args.contacts)?;

    let mut context = Context::new();
    context.init_random(args.seed);

    let output = driver::run(&mut context, &log, &params);
    println!(
        "{}\t{}\t{}\t{}\t{}",
        params.intervention.p_traced,
        params.intervention.p_app,
        output.total_infected,
        output.quarantines,
        output.fq_ratio()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("epi-sim: {e}");
            ExitCode::FAILURE
        }
    }
}
