//! Transition engine (C6, §4.5). On exposure, draws the full downstream
//! timeline and commits it to the event queue in one shot, following the
//! "commit the whole future timeline on a state change" idiom from
//! `transmission_manager.rs`'s `schedule_next_infection_attempt`/
//! `handle_infectious_status_change` (there: schedule the next infection
//! attempt and, on the last one, flip to `Recovered`; here: schedule the
//! entire Ip/I-class/test/trace/R chain at once because every one of those
//! times is known, stochastically, the instant exposure happens).

use crate::agent::{Agent, DiseaseState};
use crate::event_queue::{EventKind, EventQueue};
use crate::params::SimParams;
use crate::rng::{clamp_to_now, ContextSimRngExt};
use crate::time::STEP;
use ixa::Context;
#[cfg(test)]
use crate::agent::AgentId;

/// Map a class index (`[Ias, Ips, Ims, Iss]`, §4.1) to its `DiseaseState`
/// and `EventKind`.
fn class_for_index(idx: usize) -> (DiseaseState, EventKind) {
    match idx {
        0 => (DiseaseState::Ias, EventKind::Ias),
        1 => (DiseaseState::Ips, EventKind::Ips),
        2 => (DiseaseState::Ims, EventKind::Ims),
        3 => (DiseaseState::Iss, EventKind::Iss),
        _ => unreachable!("class index must be in 0..4"),
    }
}

/// `expose(agent, t)` (§4.5): set state to `E` and commit the full
/// downstream deterministic event list, with stochastic times, to the
/// queue.
pub fn expose(
    context: &Context,
    queue: &mut EventQueue,
    agent: &mut Agent,
    t: i64,
    params: &SimParams,
) {
    agent.state = DiseaseState::E;

    // Step 2: Ip.
    let t_ip = clamp_to_now(context.draw_event_time(t, params.disease.latency_s()), t);
    queue.push(t_ip, agent.id, EventKind::Ip);

    // Step 3: I-class assignment.
    let t_i = clamp_to_now(
        context.draw_event_time(t_ip, params.disease.prodromal_s()),
        t_ip,
    );
    let class_idx = context.draw_class_index(&params.disease.class_probs());
    let (class_state, class_kind) = class_for_index(class_idx);
    queue.push(t_i, agent.id, class_kind);
    agent.damping = if class_state == DiseaseState::Iss {
        1.0
    } else {
        0.5
    };

    // Step 4: testing & tracing schedule.
    let tested = class_state != DiseaseState::Ias
        && (class_state == DiseaseState::Iss || context.draw_bernoulli(params.intervention.p_tested));
    if tested {
        let t_test = clamp_to_now(
            context.draw_event_time(t_i, params.intervention.test_delay_s()),
            t_i,
        );
        if !agent.in_quarantine {
            queue.push(t_test, agent.id, EventKind::Boq);
        }
        // §9 Open Question 1: CT is scheduled unconditionally once the
        // testing branch is taken, regardless of the BOQ suppression above.
        queue.push(t_test + STEP, agent.id, EventKind::Ct);
    }

    // Step 5: R.
    let t_r = clamp_to_now(
        context.draw_event_time(t_i, params.disease.infectious_period_s()),
        t_i,
    );
    queue.push(t_r, agent.id, EventKind::R);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ixa::ContextRandomExt;

    fn setup() -> (Context, SimParams) {
        let mut context = Context::new();
        context.init_random(42);
        (context, SimParams::default())
    }

    #[test]
    fn expose_sets_state_to_e_and_schedules_ip() {
        let (context, params) = setup();
        let mut queue = EventQueue::new();
        let mut agent = Agent::new(AgentId(0), false, false, 0);
        expose(&context, &mut queue, &mut agent, 0, &params);
        assert_eq!(agent.state, DiseaseState::E);
        // Ip must have been scheduled at or after t=0 (forward-only clock).
        let mut saw_ip = false;
        for t in (0..40 * 86_400).step_by(STEP as usize) {
            if queue.drain(t).iter().any(|(_, k)| *k == EventKind::Ip) {
                saw_ip = true;
                break;
            }
        }
        assert!(saw_ip);
    }

    #[test]
    fn severe_class_always_tests_and_keeps_full_damping() {
        let mut context = Context::new();
        context.init_random(1);
        let mut params = SimParams::default();
        // Force the severe class deterministically.
        params.disease.p_asymptomatic = 0.0;
        params.disease.p_paucisymptomatic = 0.0;
        params.disease.p_mild = 0.0;
        params.disease.p_severe = 1.0;
        let mut queue = EventQueue::new();
        let mut agent = Agent::new(AgentId(0), false, false, 0);
        expose(&context, &mut queue, &mut agent, 0, &params);

        let mut found_boq = false;
        let mut found_ct = false;
        for t in (0..60 * 86_400).step_by(STEP as usize) {
            for (_, k) in queue.drain(t) {
                match k {
                    EventKind::Boq => found_boq = true,
                    EventKind::Ct => found_ct = true,
                    _ => {}
                }
            }
        }
        assert!(found_boq, "Iss always tests, so BOQ must be scheduled");
        assert!(found_ct);
        assert_eq!(agent.damping, 1.0);
    }

    #[test]
    fn asymptomatic_class_never_tests() {
        let mut context = Context::new();
        context.init_random(1);
        let mut params = SimParams::default();
        params.disease.p_asymptomatic = 1.0;
        params.disease.p_paucisymptomatic = 0.0;
        params.disease.p_mild = 0.0;
        params.disease.p_severe = 0.0;
        params.intervention.p_tested = 1.0;
        let mut queue = EventQueue::new();
        let mut agent = Agent::new(AgentId(0), false, false, 0);
        expose(&context, &mut queue, &mut agent, 0, &params);

        for t in (0..60 * 86_400).step_by(STEP as usize) {
            for (_, k) in queue.drain(t) {
                assert_ne!(k, EventKind::Boq, "Ias must never be tested");
                assert_ne!(k, EventKind::Ct, "Ias must never trigger CT");
            }
        }
        assert_eq!(agent.damping, 0.5);
    }

    #[test]
    fn boq_suppressed_while_already_quarantined_but_ct_still_scheduled() {
        let mut context = Context::new();
        context.init_random(1);
        let mut params = SimParams::default();
        params.disease.p_severe = 1.0;
        params.disease.p_asymptomatic = 0.0;
        params.disease.p_paucisymptomatic = 0.0;
        params.disease.p_mild = 0.0;
        let mut queue = EventQueue::new();
        let mut agent = Agent::new(AgentId(0), false, false, 0);
        agent.in_quarantine = true;
        expose(&context, &mut queue, &mut agent, 0, &params);

        let mut found_boq = false;
        let mut found_ct = false;
        for t in (0..60 * 86_400).step_by(STEP as usize) {
            for (_, k) in queue.drain(t) {
                match k {
                    EventKind::Boq => found_boq = true,
                    EventKind::Ct => found_ct = true,
                    _ => {}
                }
            }
        }
        assert!(!found_boq);
        assert!(found_ct);
    }
}
