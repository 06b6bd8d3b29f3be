//! Tracing engine (C7, §4.7). Scans the triggering agent's rolling contact
//! book and evaluates the manual and app channels independently, in that
//! order, following the same per-peer scan pattern `settings.rs` uses to
//! walk a person's recorded contacts.

use crate::agent::{AgentId, AgentTable};
use crate::event_queue::{EventKind, EventQueue};
use crate::params::SimParams;
use crate::rng::{clamp_to_now, ContextSimRngExt};
use ixa::Context;

/// `CT` for agent `who` at time `t` (§4.7): for each peer in `who`'s contact
/// book, evict stale entries, evaluate manual then app tracing, and on
/// success push a duplicate-suppressed `BoqTraced` for the peer.
pub fn trace(
    context: &Context,
    queue: &mut EventQueue,
    agents: &mut AgentTable,
    who: AgentId,
    t: i64,
    params: &SimParams,
) {
    let a_has_app = agents.get(who).has_app;
    let tracelength = params.intervention.tracelength_s();
    let peers: Vec<AgentId> = agents.get(who).contacts.keys().copied().collect();

    for peer in peers {
        let count = agents
            .get_mut(who)
            .recent_contact_count(peer, t, tracelength);

        let mut put = false;
        let mut t_q = t;

        // Manual channel: strict `>` on queue length (§4.7 note).
        if count > params.intervention.manual_tracing_threshold
            && context.draw_bernoulli(params.intervention.p_traced)
        {
            put = true;
            t_q = clamp_to_now(
                context.draw_event_time(t, params.intervention.trace_delay_manual_s()),
                t,
            );
        }

        // App channel: evaluated independently, only takes effect if manual
        // did not already mark the peer.
        if !put {
            let b_has_app = agents.get(peer).has_app;
            if a_has_app && b_has_app && count > params.intervention.app_tracing_threshold {
                put = true;
                t_q = clamp_to_now(
                    context.draw_event_time(t, params.intervention.trace_delay_app_s()),
                    t,
                );
            }
        }

        if put {
            queue.push(t_q, peer, EventKind::BoqTraced);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use ixa::ContextRandomExt;

    fn setup_context(seed: u64) -> Context {
        let mut context = Context::new();
        context.init_random(seed);
        context
    }

    #[test]
    fn manual_channel_traces_peer_above_threshold() {
        let context = setup_context(1);
        let mut params = SimParams::default();
        params.intervention.p_traced = 1.0;
        params.intervention.manual_tracing_threshold = 2;

        let mut agents = AgentTable::new();
        let a = AgentId(0);
        let b = AgentId(1);
        let mut agent_a = Agent::new(a, false, false, 0);
        agent_a.record_contact(b, 0);
        agent_a.record_contact(b, 300);
        agent_a.record_contact(b, 600);
        agents.insert(agent_a);
        agents.insert(Agent::new(b, false, false, 0));

        let mut queue = EventQueue::new();
        trace(&context, &mut queue, &mut agents, a, 600, &params);

        let mut found = false;
        for t in (600..60 * 86_400).step_by(crate::time::STEP as usize) {
            if queue
                .drain(t)
                .iter()
                .any(|&(id, k)| id == b && k == EventKind::BoqTraced)
            {
                found = true;
                break;
            }
        }
        assert!(found);
    }

    #[test]
    fn below_threshold_is_never_traced() {
        let context = setup_context(1);
        let mut params = SimParams::default();
        params.intervention.p_traced = 1.0;
        params.intervention.p_app = 1.0;
        params.intervention.manual_tracing_threshold = 10;
        params.intervention.app_tracing_threshold = 10;

        let mut agents = AgentTable::new();
        let a = AgentId(0);
        let b = AgentId(1);
        let mut agent_a = Agent::new(a, true, false, 0);
        agent_a.record_contact(b, 0);
        agents.insert(agent_a);
        let mut agent_b = Agent::new(b, true, false, 0);
        agent_b.record_contact(a, 0);
        agents.insert(agent_b);

        let mut queue = EventQueue::new();
        trace(&context, &mut queue, &mut agents, a, 600, &params);
        assert!(queue.is_empty());
    }

    #[test]
    fn app_channel_requires_both_peers_to_hold_the_app() {
        let context = setup_context(2);
        let mut params = SimParams::default();
        params.intervention.p_traced = 0.0;
        params.intervention.app_tracing_threshold = 1;

        let mut agents = AgentTable::new();
        let a = AgentId(0);
        let b = AgentId(1);
        let mut agent_a = Agent::new(a, true, false, 0);
        agent_a.record_contact(b, 0);
        agent_a.record_contact(b, 300);
        agents.insert(agent_a);
        // b does not have the app.
        agents.insert(Agent::new(b, false, false, 0));

        let mut queue = EventQueue::new();
        trace(&context, &mut queue, &mut agents, a, 600, &params);
        assert!(queue.is_empty());
    }

    #[test]
    fn tracing_is_first_order_only_from_the_triggering_agent() {
        // A <-> B <-> C: tracing from A must never reach C.
        let context = setup_context(3);
        let mut params = SimParams::default();
        params.intervention.p_traced = 1.0;
        params.intervention.manual_tracing_threshold = 0;

        let mut agents = AgentTable::new();
        let a = AgentId(0);
        let b = AgentId(1);
        let c = AgentId(2);
        let mut agent_a = Agent::new(a, false, false, 0);
        agent_a.record_contact(b, 0);
        agent_a.record_contact(b, 300);
        agents.insert(agent_a);
        let mut agent_b = Agent::new(b, false, false, 0);
        agent_b.record_contact(c, 0);
        agent_b.record_contact(c, 300);
        agents.insert(agent_b);
        agents.insert(Agent::new(c, false, false, 0));

        let mut queue = EventQueue::new();
        trace(&context, &mut queue, &mut agents, a, 600, &params);

        for t in (600..60 * 86_400).step_by(crate::time::STEP as usize) {
            for (id, k) in queue.drain(t) {
                assert_ne!((id, k), (c, EventKind::BoqTraced));
            }
        }
    }
}
