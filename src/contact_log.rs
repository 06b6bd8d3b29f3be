//! Contact log (C3, §4.3, §6). CSV parsing follows `population_loader.rs`'s
//! `csv::Reader::from_path` + `deserialize()` idiom; malformed rows are
//! logged and skipped rather than aborting the run (§7).

use crate::agent::AgentId;
use crate::error::SimError;
use crate::time::STEP;
use ixa::warn;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// One raw row of the contact-log CSV (§6): `timestamp_s, id_i, id_j, rssi`.
#[derive(Debug, Deserialize)]
struct ContactRecord {
    timestamp_s: i64,
    id_i: i64,
    id_j: i64,
    #[allow(dead_code)]
    rssi: i64,
}

/// Immutable, precomputed contact log (§4.3).
#[derive(Debug, Clone)]
pub struct ContactLog {
    contacts_at: BTreeMap<i64, Vec<(AgentId, AgentId)>>,
    ids: Vec<AgentId>,
    first_appearance: HashMap<AgentId, i64>,
    t_max: i64,
}

impl ContactLog {
    /// Load and quantize a contact-log CSV. Rows with `id_j < 0` are
    /// dropped (§4.3, §6); other malformed rows are skipped with a warning
    /// (§7) rather than aborting the read.
    ///
    /// # Errors
    /// Returns `SimError::Data` if the resulting log is empty (§7: "Empty
    /// id set or empty contact log" is a fatal configuration error).
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut contacts_at: BTreeMap<i64, Vec<(AgentId, AgentId)>> = BTreeMap::new();
        let mut first_appearance: HashMap<AgentId, i64> = HashMap::new();
        let mut ids: HashSet<AgentId> = HashSet::new();

        for result in reader.deserialize() {
            let record: ContactRecord = match result {
                Ok(r) => r,
                Err(e) => {
                    warn!("skipping malformed contact-log row: {e}");
                    continue;
                }
            };
            if record.id_j < 0 {
                continue;
            }
            let t = crate::time::quantize(record.timestamp_s as f64);
            let i = AgentId(record.id_i);
            let j = AgentId(record.id_j);

            ids.insert(i);
            ids.insert(j);
            first_appearance
                .entry(i)
                .and_modify(|f| *f = (*f).min(t))
                .or_insert(t);
            first_appearance
                .entry(j)
                .and_modify(|f| *f = (*f).min(t))
                .or_insert(t);
            contacts_at.entry(t).or_default().push((i, j));
        }

        if contacts_at.is_empty() || ids.is_empty() {
            return Err(SimError::Data(
                "contact log is empty after filtering; cannot start a run".to_string(),
            ));
        }

        let t_max = *contacts_at.keys().next_back().unwrap();
        let mut ids: Vec<AgentId> = ids.into_iter().collect();
        ids.sort();

        Ok(ContactLog {
            contacts_at,
            ids,
            first_appearance,
            t_max,
        })
    }

    /// All ids seen anywhere in the log, sorted for reproducible iteration.
    pub fn ids(&self) -> &[AgentId] {
        &self.ids
    }

    /// Earliest timestamp at which `id` appears in any contact (§4.8 step
    /// 2: derived by scanning contacts in ascending time order).
    pub fn first_appearance(&self, id: AgentId) -> Option<i64> {
        self.first_appearance.get(&id).copied()
    }

    /// `T_max = max(keys)` (§4.3): the finite horizon of the log.
    pub fn t_max(&self) -> i64 {
        self.t_max
    }

    /// One period of the periodic boundary (§4.3, §4.8 step 2).
    pub fn period(&self) -> i64 {
        self.t_max + STEP
    }

    /// Contacts recorded at exactly `t`, or an empty slice.
    pub fn contacts_at(&self, t: i64) -> &[(AgentId, AgentId)] {
        self.contacts_at
            .get(&t)
            .map_or(&[], |v| v.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_and_quantizes_and_drops_negative_id_j() {
        let f = write_csv(
            "timestamp_s,id_i,id_j,rssi\n\
             0,1,2,-50\n\
             149,1,3,-60\n\
             300,2,-1,-70\n",
        );
        let log = ContactLog::load(f.path()).unwrap();
        assert_eq!(log.t_max(), 0);
        assert_eq!(log.contacts_at(0).len(), 2);
        assert!(log.ids().contains(&AgentId(3)));
        assert!(!log.ids().contains(&AgentId(-1)));
    }

    #[test]
    fn first_appearance_is_earliest_timestamp() {
        let f = write_csv(
            "timestamp_s,id_i,id_j,rssi\n\
             600,1,2,-50\n\
             0,2,3,-50\n",
        );
        let log = ContactLog::load(f.path()).unwrap();
        assert_eq!(log.first_appearance(AgentId(2)), Some(0));
        assert_eq!(log.first_appearance(AgentId(1)), Some(600));
    }

    #[test]
    fn empty_log_is_fatal() {
        let f = write_csv("timestamp_s,id_i,id_j,rssi\n0,1,-1,-50\n");
        assert!(matches!(ContactLog::load(f.path()), Err(SimError::Data(_))));
    }

    #[test]
    fn malformed_row_is_skipped_not_fatal() {
        let f = write_csv(
            "timestamp_s,id_i,id_j,rssi\n\
             0,1,2,-50\n\
             not_a_number,9,9,-50\n\
             300,3,4,-50\n",
        );
        let log = ContactLog::load(f.path()).unwrap();
        assert_eq!(log.t_max(), 300);
        assert!(log.ids().contains(&AgentId(4)));
    }

    #[test]
    fn period_is_t_max_plus_step() {
        let f = write_csv("timestamp_s,id_i,id_j,rssi\n600,1,2,-50\n");
        let log = ContactLog::load(f.path()).unwrap();
        assert_eq!(log.period(), 600 + STEP);
    }
}
