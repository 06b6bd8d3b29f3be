//! Agent state (C5, §3). Ids here are sparse, externally supplied integers
//! from a proximity log rather than sequentially assigned `ixa::PersonId`s,
//! so agents are kept in a plain table (`AgentTable`) instead of `ixa`'s
//! person-property ECS — the role `ixa::people` plays in a synthetic-
//! population app is played here by this module, grounded on the per-person
//! field struct in `population_loader.rs` and the peer-keyed contact
//! bookkeeping idea in `settings.rs`.

use std::collections::{HashMap, VecDeque};

/// An opaque agent identifier drawn from the contact log (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub i64);

/// Disease state (§3). `S == never exposed` and `infectious` is always a
/// pure function of this variant (§3 invariants), so it is not stored
/// separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiseaseState {
    S,
    E,
    Ip,
    Ias,
    Ips,
    Ims,
    Iss,
    R,
}

impl DiseaseState {
    /// `infectious <=> state in {Ip, Ias, Ips, Ims, Iss}` (§3).
    pub fn is_infectious(self) -> bool {
        matches!(
            self,
            DiseaseState::Ip
                | DiseaseState::Ias
                | DiseaseState::Ips
                | DiseaseState::Ims
                | DiseaseState::Iss
        )
    }
}

/// One agent's mutable state (§3).
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub state: DiseaseState,
    pub in_quarantine: bool,
    /// Multiplier on outgoing transmission probability. `1.0` until the
    /// sampled I-class is assigned; `0.5` thereafter unless the class is
    /// `Iss`, which stays at `1.0` (§3).
    pub damping: f64,
    pub has_app: bool,
    pub has_mask: bool,
    pub mask_factor_in: f64,
    pub mask_factor_out: f64,
    /// Reserved for an alternating-week presence intervention; drawn once
    /// but never consulted by the default driver (§3, §9 Open Questions).
    pub oddweek: u8,
    /// Rolling per-peer contact window, oldest timestamp first, trimmed to
    /// `tracelength` lazily on inspection (§3 invariants, §9 Performance
    /// notes: lazy per-peer insertion rather than preallocating one deque
    /// per known peer).
    pub contacts: HashMap<AgentId, VecDeque<i64>>,
}

impl Agent {
    pub fn new(id: AgentId, has_app: bool, has_mask: bool, oddweek: u8) -> Self {
        Agent {
            id,
            state: DiseaseState::S,
            in_quarantine: false,
            damping: 1.0,
            has_app,
            has_mask,
            mask_factor_in: 1.0,
            mask_factor_out: 1.0,
            oddweek,
            contacts: HashMap::new(),
        }
    }

    pub fn infectious(&self) -> bool {
        self.state.is_infectious()
    }

    /// Append a contact timestamp for `peer`, creating the peer's deque
    /// lazily on first contact (§9 Performance notes).
    pub fn record_contact(&mut self, peer: AgentId, t: i64) {
        self.contacts.entry(peer).or_default().push_back(t);
    }

    /// Evict head entries older than `t - tracelength` for `peer` and
    /// return the number of contacts remaining in the window (§4.7 step 1).
    pub fn recent_contact_count(&mut self, peer: AgentId, t: i64, tracelength: i64) -> usize {
        let cutoff = t - tracelength;
        match self.contacts.get_mut(&peer) {
            Some(queue) => {
                while matches!(queue.front(), Some(&ts) if ts < cutoff) {
                    queue.pop_front();
                }
                queue.len()
            }
            None => 0,
        }
    }
}

/// Owns the full agent population, keyed by the opaque ids from the contact
/// log.
#[derive(Debug, Default)]
pub struct AgentTable {
    agents: HashMap<AgentId, Agent>,
}

impl AgentTable {
    pub fn new() -> Self {
        AgentTable {
            agents: HashMap::new(),
        }
    }

    pub fn insert(&mut self, agent: Agent) {
        self.agents.insert(agent.id, agent);
    }

    pub fn get(&self, id: AgentId) -> &Agent {
        self.agents
            .get(&id)
            .unwrap_or_else(|| panic!("unknown agent id {id:?}"))
    }

    pub fn get_mut(&mut self, id: AgentId) -> &mut Agent {
        self.agents
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown agent id {id:?}"))
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infectious_matches_state_invariant() {
        for (state, expected) in [
            (DiseaseState::S, false),
            (DiseaseState::E, false),
            (DiseaseState::Ip, true),
            (DiseaseState::Ias, true),
            (DiseaseState::Ips, true),
            (DiseaseState::Ims, true),
            (DiseaseState::Iss, true),
            (DiseaseState::R, false),
        ] {
            assert_eq!(state.is_infectious(), expected);
        }
    }

    #[test]
    fn recent_contact_count_trims_old_entries() {
        let mut a = Agent::new(AgentId(0), false, false, 0);
        let peer = AgentId(1);
        a.record_contact(peer, 0);
        a.record_contact(peer, 300);
        a.record_contact(peer, 600);
        // tracelength = 300: at t=600, only entries >= 300 survive.
        assert_eq!(a.recent_contact_count(peer, 600, 300), 2);
        assert_eq!(a.contacts[&peer].len(), 2);
    }

    #[test]
    fn sequential_lookups_allow_symmetric_updates() {
        let mut table = AgentTable::new();
        table.insert(Agent::new(AgentId(0), false, false, 0));
        table.insert(Agent::new(AgentId(1), false, false, 0));
        table.get_mut(AgentId(0)).record_contact(AgentId(1), 0);
        table.get_mut(AgentId(1)).record_contact(AgentId(0), 0);
        assert_eq!(table.get(AgentId(0)).contacts[&AgentId(1)].len(), 1);
        assert_eq!(table.get(AgentId(1)).contacts[&AgentId(0)].len(), 1);
    }
}
