//! Time/Parameter model (C1, §4.1). Disease constants and intervention
//! config, grounded on `parameters.rs`/`parameters_loader.rs`'s
//! struct-plus-`define_global_property!`-plus-`validate` idiom.

use crate::error::SimError;
use crate::time::DAY;
use ixa::define_global_property;
use serde::{Deserialize, Serialize};

/// Fixed disease-course constants (§4.1). Expressed as fractional days in
/// the config surface (matching how a modeler would specify them) and
/// converted to integer seconds once at load time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiseaseParams {
    pub incubation_days: f64,
    pub prodromal_days: f64,
    /// Total infectious-to-removal window, in days, measured from symptom
    /// onset minus incubation (§4.1: `infectious_period = 7.5d - incubation`).
    pub total_course_days: f64,
    pub p_asymptomatic: f64,
    pub p_paucisymptomatic: f64,
    pub p_mild: f64,
    pub p_severe: f64,
    pub p_transmission: f64,
}

impl Default for DiseaseParams {
    fn default() -> Self {
        DiseaseParams {
            incubation_days: 5.2,
            prodromal_days: 1.5,
            total_course_days: 7.5,
            p_asymptomatic: 0.2,
            p_paucisymptomatic: 0.2 * 0.8,
            p_mild: 0.7 * 0.8,
            p_severe: 0.1 * 0.8,
            p_transmission: 0.006_25,
        }
    }
}

impl DiseaseParams {
    pub fn incubation_s(&self) -> f64 {
        self.incubation_days * DAY
    }

    pub fn prodromal_s(&self) -> f64 {
        self.prodromal_days * DAY
    }

    /// `latency = incubation - prodromal` (§4.1).
    pub fn latency_s(&self) -> f64 {
        self.incubation_s() - self.prodromal_s()
    }

    /// `infectious_period = 7.5d - incubation` (§4.1).
    pub fn infectious_period_s(&self) -> f64 {
        self.total_course_days * DAY - self.incubation_s()
    }

    /// Class probabilities in the fixed order `[Ias, Ips, Ims, Iss]`, used
    /// for the categorical draw in `expose` (§4.5 step 3).
    pub fn class_probs(&self) -> [f64; 4] {
        [
            self.p_asymptomatic,
            self.p_paucisymptomatic,
            self.p_mild,
            self.p_severe,
        ]
    }
}

/// Tunable intervention config (§4.1).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InterventionParams {
    pub p_app: f64,
    pub p_tested: f64,
    pub p_traced: f64,
    pub p_mask: f64,
    pub test_delay_days: f64,
    pub trace_delay_manual_days: f64,
    pub trace_delay_app_days: f64,
    pub manual_tracing_threshold: usize,
    pub app_tracing_threshold: usize,
    pub mask_reduction_in: f64,
    pub mask_reduction_out: f64,
    pub tracelength_days: f64,
    pub quarantine_length_days: f64,
    pub oddweeks: bool,
}

impl Default for InterventionParams {
    fn default() -> Self {
        InterventionParams {
            p_app: 0.0,
            p_tested: 0.5,
            p_traced: 0.75,
            p_mask: 0.0,
            test_delay_days: 0.5,
            trace_delay_manual_days: 1.0,
            trace_delay_app_days: 0.0,
            manual_tracing_threshold: 2,
            app_tracing_threshold: 2,
            // spec.md §6 leaves these two undefaulted; the upstream model
            // this was distilled from ships mask_reduction_in=0.9,
            // mask_reduction_out=0.6, inert by default since p_mask=0.0.
            mask_reduction_in: 0.9,
            mask_reduction_out: 0.6,
            tracelength_days: 2.0,
            quarantine_length_days: 14.0,
            oddweeks: false,
        }
    }
}

impl InterventionParams {
    pub fn test_delay_s(&self) -> f64 {
        self.test_delay_days * DAY
    }
    pub fn trace_delay_manual_s(&self) -> f64 {
        self.trace_delay_manual_days * DAY
    }
    pub fn trace_delay_app_s(&self) -> f64 {
        self.trace_delay_app_days * DAY
    }
    pub fn tracelength_s(&self) -> i64 {
        crate::time::quantize(self.tracelength_days * DAY)
    }
    pub fn quarantine_length_s(&self) -> i64 {
        crate::time::quantize(self.quarantine_length_days * DAY)
    }
}

/// The full parameter set for one run, registered as an `ixa` global
/// property so it can optionally be overridden from a JSON config file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimParams {
    pub disease: DiseaseParams,
    pub intervention: InterventionParams,
    /// Number of days after patient zero's first appearance in the log at
    /// which their exposure time is drawn uniformly (§4.8 step 4).
    pub initial_period_days: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            disease: DiseaseParams::default(),
            intervention: InterventionParams::default(),
            initial_period_days: 7.0,
        }
    }
}

define_global_property!(Parameters, SimParams);

/// Validate parameter ranges (§7: "Parameter out of range... fatal at
/// config validation"). Mirrors `parameters_loader::validate`'s one-check-
/// per-field style.
pub fn validate_params(params: &SimParams) -> Result<(), SimError> {
    let probs = [
        ("p_app", params.intervention.p_app),
        ("p_tested", params.intervention.p_tested),
        ("p_traced", params.intervention.p_traced),
        ("p_mask", params.intervention.p_mask),
        ("mask_reduction_in", params.intervention.mask_reduction_in),
        ("mask_reduction_out", params.intervention.mask_reduction_out),
        ("p_transmission", params.disease.p_transmission),
        ("p_asymptomatic", params.disease.p_asymptomatic),
        ("p_paucisymptomatic", params.disease.p_paucisymptomatic),
        ("p_mild", params.disease.p_mild),
        ("p_severe", params.disease.p_severe),
    ];
    for (name, value) in probs {
        if !(0.0..=1.0).contains(&value) {
            return Err(SimError::Config(format!(
                "{name} must be between 0 and 1, inclusive (got {value})"
            )));
        }
    }

    let delays = [
        ("test_delay_days", params.intervention.test_delay_days),
        (
            "trace_delay_manual_days",
            params.intervention.trace_delay_manual_days,
        ),
        (
            "trace_delay_app_days",
            params.intervention.trace_delay_app_days,
        ),
        ("tracelength_days", params.intervention.tracelength_days),
        (
            "quarantine_length_days",
            params.intervention.quarantine_length_days,
        ),
        ("incubation_days", params.disease.incubation_days),
        ("prodromal_days", params.disease.prodromal_days),
        ("total_course_days", params.disease.total_course_days),
        ("initial_period_days", params.initial_period_days),
    ];
    for (name, value) in delays {
        if value < 0.0 {
            return Err(SimError::Config(format!(
                "{name} must be non-negative (got {value})"
            )));
        }
    }

    if params.disease.latency_s() < 0.0 {
        return Err(SimError::Config(
            "incubation_days must be at least prodromal_days".to_string(),
        ));
    }
    if params.disease.infectious_period_s() < 0.0 {
        return Err(SimError::Config(
            "total_course_days must be at least incubation_days".to_string(),
        ));
    }

    Ok(())
}
