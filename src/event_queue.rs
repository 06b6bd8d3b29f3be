//! Event queue (C4, §4.4). A mapping from integer time to an appendable bag
//! of `(agent_id, event_kind)` records, generalized from the scheduling
//! idiom in `transmission_manager.rs` (`context.add_plan(time, closure)`) to
//! the explicit bag-per-tick structure spec.md requires: `ixa`'s own plan
//! queue is `f64`-keyed and closure-based, and exposes neither a way to
//! drain "everything at this exact tick" as data nor the duplicate-
//! suppression `BOQ_t` needs (§4.4's idempotence rule).

use crate::agent::AgentId;
use std::collections::{BTreeMap, HashSet};

/// Kinds of scheduled events (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ip,
    Ias,
    Ips,
    Ims,
    Iss,
    R,
    /// Beginning of quarantine triggered by the agent's own test.
    Boq,
    /// Beginning of quarantine triggered by tracing a peer.
    BoqTraced,
    /// Perform contact tracing from this agent now.
    Ct,
    /// End of quarantine.
    Eoq,
}

#[derive(Debug, Default)]
pub struct EventQueue {
    queue: BTreeMap<i64, Vec<(AgentId, EventKind)>>,
    /// Tracks `(time, agent)` pairs with a `BoqTraced` already pending, for
    /// the §4.4 duplicate-suppression rule. No other event kind is
    /// deduplicated.
    pending_boq_traced: HashSet<(i64, AgentId)>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue::default()
    }

    /// Append `(id, kind)` at time `t`. O(1) amortized (§4.4).
    pub fn push(&mut self, t: i64, id: AgentId, kind: EventKind) {
        if kind == EventKind::BoqTraced {
            if !self.pending_boq_traced.insert((t, id)) {
                // Already pending an identical (agent, BoqTraced) at this
                // exact time: suppress the duplicate (§4.4, tested by S6).
                return;
            }
        }
        self.queue.entry(t).or_default().push((id, kind));
    }

    /// Remove and return all entries scheduled at exactly `t`.
    pub fn drain(&mut self, t: i64) -> Vec<(AgentId, EventKind)> {
        match self.queue.remove(&t) {
            Some(events) => {
                for (id, kind) in &events {
                    if *kind == EventKind::BoqTraced {
                        self.pending_boq_traced.remove(&(t, *id));
                    }
                }
                events
            }
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_removes_and_returns_bucket() {
        let mut q = EventQueue::new();
        q.push(300, AgentId(1), EventKind::Ip);
        q.push(300, AgentId(2), EventKind::R);
        q.push(600, AgentId(1), EventKind::Eoq);

        let at_300 = q.drain(300);
        assert_eq!(at_300.len(), 2);
        assert!(q.drain(300).is_empty());
        assert_eq!(q.drain(600).len(), 1);
    }

    #[test]
    fn duplicate_boq_traced_at_same_time_is_suppressed() {
        let mut q = EventQueue::new();
        q.push(900, AgentId(5), EventKind::BoqTraced);
        q.push(900, AgentId(5), EventKind::BoqTraced);
        let events = q.drain(900);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn boq_traced_at_different_times_is_not_suppressed() {
        let mut q = EventQueue::new();
        q.push(900, AgentId(5), EventKind::BoqTraced);
        q.push(1200, AgentId(5), EventKind::BoqTraced);
        assert_eq!(q.drain(900).len(), 1);
        assert_eq!(q.drain(1200).len(), 1);
    }

    #[test]
    fn after_draining_a_time_the_dedup_guard_is_released() {
        let mut q = EventQueue::new();
        q.push(900, AgentId(5), EventKind::BoqTraced);
        assert_eq!(q.drain(900).len(), 1);
        // Time 900 has been fully drained; scheduling again at 900 is a
        // fresh request, not a duplicate of the one already delivered.
        q.push(900, AgentId(5), EventKind::BoqTraced);
        assert_eq!(q.drain(900).len(), 1);
    }

    #[test]
    fn other_kinds_are_never_deduplicated() {
        let mut q = EventQueue::new();
        q.push(900, AgentId(5), EventKind::Boq);
        q.push(900, AgentId(5), EventKind::Boq);
        assert_eq!(q.drain(900).len(), 2);
    }
}
