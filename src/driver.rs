//! Simulation driver (C8, §4.8). Owns the clock, the agent population, and
//! the event queue; pulls events, applies state-change semantics, replays
//! the contact log with a periodic boundary, and evaluates transmission.
//! Grounded on `infection_propagation_loop.rs`'s per-tick "drain plans for
//! now, then evaluate contacts, then advance" shape, generalized from
//! `ixa`'s closure-based plan queue to the explicit queue/log pair C3/C4
//! provide.

use crate::agent::{Agent, AgentId, AgentTable, DiseaseState};
use crate::contact_log::ContactLog;
use crate::event_queue::{EventKind, EventQueue};
use crate::params::SimParams;
use crate::rng::ContextSimRngExt;
use crate::time::STEP;
use crate::tracing::trace;
use crate::transition::expose;
use ixa::{debug, info, trace as log_trace, Context};

/// Result of one completed replicate (§4.8's return tuple, plus the raw
/// quarantine count needed to compute `fq`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutput {
    pub total_infected: u64,
    pub quarantines: u64,
    pub false_quarantines: u64,
}

impl RunOutput {
    /// `false_quarantines / quarantines`, or 0 when `quarantines == 0`.
    pub fn fq_ratio(&self) -> f64 {
        if self.quarantines == 0 {
            0.0
        } else {
            self.false_quarantines as f64 / self.quarantines as f64
        }
    }
}

struct Counters {
    exposed: u64,
    infectious: u64,
    total_infected: u64,
    quarantines: u64,
    false_quarantines: u64,
}

/// Run one replicate to epidemic extinction (§4.8).
pub fn run(context: &mut Context, log: &ContactLog, params: &SimParams) -> RunOutput {
    let mut agents = AgentTable::new();
    for &id in log.ids() {
        let has_app = context.draw_bernoulli(params.intervention.p_app);
        let has_mask = context.draw_bernoulli(params.intervention.p_mask);
        let oddweek = u8::from(context.draw_bernoulli(0.5));
        let mut agent = Agent::new(id, has_app, has_mask, oddweek);
        if has_mask && params.intervention.p_mask > 0.0 {
            agent.mask_factor_in = 1.0 - params.intervention.mask_reduction_in;
            agent.mask_factor_out = 1.0 - params.intervention.mask_reduction_out;
        }
        agents.insert(agent);
    }

    let mut queue = EventQueue::new();

    // Step 3: pick patient zero uniformly from the id list.
    let ids = log.ids();
    let patient_zero = ids[context.draw_index(ids.len())];
    let first_seen = log
        .first_appearance(patient_zero)
        .expect("every id in the log has a first appearance");

    // Step 4: current_time = first_appearance + quantize(U * initial_period * day).
    let offset = crate::time::quantize(
        context.draw_uniform01() * params.initial_period_days * crate::time::DAY,
    );
    let mut current_time = first_seen + offset;

    let mut counters = Counters {
        exposed: 1,
        infectious: 0,
        total_infected: 1,
        quarantines: 0,
        false_quarantines: 0,
    };
    expose(
        context,
        &mut queue,
        agents.get_mut(patient_zero),
        current_time,
        params,
    );
    info!(
        "patient zero {:?} exposed at t={} (first_seen={})",
        patient_zero, current_time, first_seen
    );

    let mut periodic_boundary_modifier: i64 = 0;
    let t_max = log.t_max();
    let period = log.period();

    loop {
        // 1. Drain events at current_time. A handler may itself schedule a
        // new event at this same `current_time` (e.g. `trace_delay_app=0`
        // puts a freshly traced `BoqTraced` at `t+0`, or
        // `quarantine_length=0` puts `EOQ` at `t+0`); keep draining until
        // the bucket is empty so same-tick events are never stranded.
        loop {
            let batch = queue.drain(current_time);
            if batch.is_empty() {
                break;
            }
            for (id, kind) in batch {
                apply_event(
                    context,
                    &mut queue,
                    &mut agents,
                    &mut counters,
                    id,
                    kind,
                    current_time,
                    params,
                );
            }
        }

        // 2. Periodic boundary.
        if current_time - periodic_boundary_modifier > t_max {
            periodic_boundary_modifier += period;
            debug!(
                "periodic boundary advanced to modifier={} at t={}",
                periodic_boundary_modifier, current_time
            );
        }

        // 3. Contacts at current_time - periodic_boundary_modifier.
        let replay_time = current_time - periodic_boundary_modifier;
        for &(i, j) in log.contacts_at(replay_time) {
            evaluate_contact(context, &mut queue, &mut agents, &mut counters, i, j, current_time, params);
        }

        // 4. Termination check.
        if counters.exposed + counters.infectious == 0 {
            break;
        }
        current_time += STEP;
    }

    info!(
        "run complete: total_infected={} quarantines={} false_quarantines={}",
        counters.total_infected, counters.quarantines, counters.false_quarantines
    );

    RunOutput {
        total_infected: counters.total_infected,
        quarantines: counters.quarantines,
        false_quarantines: counters.false_quarantines,
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_event(
    context: &Context,
    queue: &mut EventQueue,
    agents: &mut AgentTable,
    counters: &mut Counters,
    id: AgentId,
    kind: EventKind,
    t: i64,
    params: &SimParams,
) {
    log_trace!("event {:?} for {:?} at t={}", kind, id, t);
    match kind {
        EventKind::Boq | EventKind::BoqTraced => {
            let agent = agents.get_mut(id);
            let already_quarantined = agent.in_quarantine;
            // §4.8: both self-test and traced quarantine onsets count
            // towards `quarantines` (invariant 8 requires BOQ alone to
            // populate the counter when tracing is disabled); the
            // false-quarantine check is the same regardless of which
            // channel triggered it (§4.6).
            if !already_quarantined {
                counters.quarantines += 1;
                if matches!(agent.state, DiseaseState::S | DiseaseState::R) {
                    counters.false_quarantines += 1;
                }
                agent.in_quarantine = true;
                queue.push(
                    t + params.intervention.quarantine_length_s(),
                    id,
                    EventKind::Eoq,
                );
            }
        }
        EventKind::Ct => {
            trace(context, queue, agents, id, t, params);
        }
        EventKind::Eoq => {
            agents.get_mut(id).in_quarantine = false;
        }
        EventKind::R => {
            counters.infectious -= 1;
            agents.get_mut(id).state = DiseaseState::R;
        }
        EventKind::Ip => {
            agents.get_mut(id).state = DiseaseState::Ip;
        }
        EventKind::Ias => {
            counters.exposed -= 1;
            counters.infectious += 1;
            agents.get_mut(id).state = DiseaseState::Ias;
        }
        EventKind::Ips => {
            counters.exposed -= 1;
            counters.infectious += 1;
            agents.get_mut(id).state = DiseaseState::Ips;
        }
        EventKind::Ims => {
            counters.exposed -= 1;
            counters.infectious += 1;
            agents.get_mut(id).state = DiseaseState::Ims;
        }
        EventKind::Iss => {
            counters.exposed -= 1;
            counters.infectious += 1;
            agents.get_mut(id).state = DiseaseState::Iss;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn evaluate_contact(
    context: &Context,
    queue: &mut EventQueue,
    agents: &mut AgentTable,
    counters: &mut Counters,
    i: AgentId,
    j: AgentId,
    t: i64,
    params: &SimParams,
) {
    let a_state = agents.get(i).state;
    let b_state = agents.get(j).state;

    if a_state == DiseaseState::S && b_state == DiseaseState::S {
        return;
    }
    if agents.get(i).in_quarantine || agents.get(j).in_quarantine {
        return;
    }

    agents.get_mut(i).record_contact(j, t);
    agents.get_mut(j).record_contact(i, t);

    let (source_id, target_id) = if a_state.is_infectious() && b_state == DiseaseState::S {
        (i, j)
    } else if b_state.is_infectious() && a_state == DiseaseState::S {
        (j, i)
    } else {
        return;
    };

    let source = agents.get(source_id);
    let (damping, mask_factor_out) = (source.damping, source.mask_factor_out);
    let mask_factor_in = agents.get(target_id).mask_factor_in;

    let p = params.disease.p_transmission * damping * mask_factor_out * mask_factor_in;

    if context.draw_bernoulli(p) {
        let target_agent = agents.get_mut(target_id);
        expose(context, queue, target_agent, t, params);
        counters.exposed += 1;
        counters.total_infected += 1;
    }
}
