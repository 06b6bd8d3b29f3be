//! Shared CLI/config plumbing used by both binaries (§A1, §A3, §A4 of
//! SPEC_FULL.md): parameter loading/validation and log-level setup, split
//! out so `main.rs` and `bin/sweep.rs` don't duplicate it.

use crate::error::SimError;
use crate::params::{validate_params, SimParams};
use ixa::{set_log_level, LevelFilter};
use std::fs;
use std::path::Path;

/// Load `SimParams` from an optional JSON override file, falling back to
/// defaults, and validate the result (§7: fatal at config validation).
pub fn load_params(config_path: Option<&Path>) -> Result<SimParams, SimError> {
    let params = match config_path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        }
        None => SimParams::default(),
    };
    validate_params(&params)?;
    Ok(params)
}

/// Map `-v` repeat count to a log level: 0 = Off, 1 = Debug, 2+ = Trace
/// (§A3). Logging is off by default.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Off,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    set_log_level(level);
}
