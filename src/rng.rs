//! RNG service (C2, §4.2). All stochastic draws go through the methods on
//! `ContextSimRngExt`, each backed by its own named `define_rng!` stream so
//! that adding or removing a draw elsewhere in the model does not perturb
//! the sequence other subsystems see — the same separation-of-concerns the
//! teacher uses (`ContactRng` in `contact.rs`, `TransmissionRng` in
//! `transmission_manager.rs`, `NaturalHistorySamplerRng` in
//! `natural_history_manager.rs`).
//!
//! A run is fully reproducible given (seed, inputs, parameters): `ixa`'s
//! `SmallRng` streams are seeded deterministically from the base seed passed
//! to `Context::init_random`.

use crate::time::quantize;
use ixa::{define_rng, ContextRandomExt};
use rand_distr::Normal;
#[cfg(test)]
use crate::time::STEP;

define_rng!(ExposureRng);
define_rng!(InterventionRng);
define_rng!(PopulationRng);

pub trait ContextSimRngExt {
    /// Draw `Normal(mu, mu/10)`, add it to `base`, and quantize to the
    /// nearest `STEP` (§4.2, §4.5). This is the one helper used for every
    /// timing draw in the model (Ip, I-class, test, trace, R times).
    fn draw_event_time(&self, base: i64, mu: f64) -> i64;

    /// `U < p` (§4.2/§4.5/§4.7): testing, tracing, app/mask ownership draws.
    fn draw_bernoulli(&self, p: f64) -> bool;

    /// Uniform draw on `[0, 1)` (§4.2), used for the initial-exposure-time
    /// offset (§4.8 step 4).
    fn draw_uniform01(&self) -> f64;

    /// Categorical draw over the four I-classes with the given weights
    /// (§4.5 step 3), returning an index into `[Ias, Ips, Ims, Iss]`.
    fn draw_class_index(&self, weights: &[f64; 4]) -> usize;

    /// Uniform choice of an index into a list of length `n` (§4.2: "uniform
    /// choice over a finite id list"), used to pick patient zero.
    fn draw_index(&self, n: usize) -> usize;
}

impl ContextSimRngExt for ixa::Context {
    fn draw_event_time(&self, base: i64, mu: f64) -> i64 {
        let sigma = (mu / 10.0).abs();
        let draw = if sigma == 0.0 {
            mu
        } else {
            self.sample_distr(ExposureRng, Normal::new(mu, sigma).unwrap())
        };
        let t = quantize(base as f64 + draw);
        // §7: the forward-only clock rule is enforced by the driver/transition
        // engine at insertion time, not here; this function may legitimately
        // return a time at or before `base` when `draw` is negative.
        t
    }

    fn draw_bernoulli(&self, p: f64) -> bool {
        self.sample_bool(InterventionRng, p)
    }

    fn draw_uniform01(&self) -> f64 {
        self.sample_range(PopulationRng, 0.0..1.0)
    }

    fn draw_class_index(&self, weights: &[f64; 4]) -> usize {
        self.sample_weighted(ExposureRng, weights)
    }

    fn draw_index(&self, n: usize) -> usize {
        self.sample_range(PopulationRng, 0..n)
    }
}

/// Clamp a freshly scheduled time so the queue never receives an event
/// strictly before the current clock (§7's forward-only-clock rule).
pub fn clamp_to_now(t: i64, now: i64) -> i64 {
    if t < now {
        now
    } else {
        t
    }
}
