//! Solved Q and policy tables.
//!
//! Tables are keyed by concrete belief states. On disk they are stored as
//! flat record lists so that the same encoding works for MessagePack and
//! JSON.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, exact::PolicyRecord, mouselab::BeliefState};

/// Which table to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    Q,
    Policy,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Q => f.write_str("q"),
            TableKind::Policy => f.write_str("pi"),
        }
    }
}

impl FromStr for TableKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "q" => Ok(TableKind::Q),
            "pi" | "policy" => Ok(TableKind::Policy),
            _ => Err(Error::ParseOption {
                option: "table kind".to_string(),
                input: s.to_string(),
                expected: "q, pi".to_string(),
            }),
        }
    }
}

/// One `(state, action) -> Q` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QRecord {
    pub state: BeliefState,
    pub action: usize,
    pub q: f64,
}

/// Q-values of (state, action) pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<QRecord>", into = "Vec<QRecord>")]
pub struct QTable {
    values: BTreeMap<(BeliefState, usize), f64>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: BeliefState, action: usize, q: f64) {
        self.values.insert((state, action), q);
    }

    pub fn get(&self, state: &BeliefState, action: usize) -> Option<f64> {
        // BTreeMap lookups on tuple keys need an owned key
        self.values.get(&(state.clone(), action)).copied()
    }

    pub fn contains(&self, state: &BeliefState, action: usize) -> bool {
        self.get(state, action).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BeliefState, usize, f64)> {
        self.values
            .iter()
            .map(|((state, action), q)| (state, *action, *q))
    }
}

impl From<Vec<QRecord>> for QTable {
    fn from(records: Vec<QRecord>) -> Self {
        let mut table = QTable::new();
        for record in records {
            table.insert(record.state, record.action, record.q);
        }
        table
    }
}

impl From<QTable> for Vec<QRecord> {
    fn from(table: QTable) -> Self {
        table
            .values
            .into_iter()
            .map(|((state, action), q)| QRecord { state, action, q })
            .collect()
    }
}

/// One state's entry in a policy table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub state: BeliefState,
    pub max_actions: Vec<usize>,
    pub q_values: BTreeMap<usize, f64>,
}

/// Optimal decisions per state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PolicyEntry>", into = "Vec<PolicyEntry>")]
pub struct PolicyTable {
    decisions: BTreeMap<BeliefState, PolicyRecord>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: BeliefState, record: PolicyRecord) {
        self.decisions.insert(state, record);
    }

    pub fn get(&self, state: &BeliefState) -> Option<&PolicyRecord> {
        self.decisions.get(state)
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BeliefState, &PolicyRecord)> {
        self.decisions.iter()
    }
}

impl From<Vec<PolicyEntry>> for PolicyTable {
    fn from(entries: Vec<PolicyEntry>) -> Self {
        let mut table = PolicyTable::new();
        for entry in entries {
            table.insert(
                entry.state,
                PolicyRecord {
                    max_actions: entry.max_actions,
                    q_values: entry.q_values,
                },
            );
        }
        table
    }
}

impl From<PolicyTable> for Vec<PolicyEntry> {
    fn from(table: PolicyTable) -> Self {
        table
            .decisions
            .into_iter()
            .map(|(state, record)| PolicyEntry {
                state,
                max_actions: record.max_actions,
                q_values: record.q_values,
            })
            .collect()
    }
}

/// A solved table of either kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Table {
    Q(QTable),
    Policy(PolicyTable),
}

impl Table {
    pub fn kind(&self) -> TableKind {
        match self {
            Table::Q(_) => TableKind::Q,
            Table::Policy(_) => TableKind::Policy,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Table::Q(table) => table.len(),
            Table::Policy(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_q(&self) -> Option<&QTable> {
        match self {
            Table::Q(table) => Some(table),
            Table::Policy(_) => None,
        }
    }

    pub fn as_policy(&self) -> Option<&PolicyTable> {
        match self {
            Table::Policy(table) => Some(table),
            Table::Q(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        distributions::Categorical,
        mouselab::{Belief, BeliefState},
    };

    fn state() -> BeliefState {
        BeliefState::new(vec![
            Belief::Revealed(0.0),
            Belief::hidden(Categorical::uniform(vec![-1.0, 1.0]).unwrap()),
        ])
    }

    #[test]
    fn q_table_records_round_trip_through_json() {
        let mut table = QTable::new();
        table.insert(state(), 1, -0.5);
        table.insert(state(), 2, 0.0);
        let json = serde_json::to_string(&table).unwrap();
        let back: QTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.get(&state(), 1), Some(-0.5));
    }

    #[test]
    fn policy_table_keeps_decisions() {
        let mut table = PolicyTable::new();
        let record = PolicyRecord {
            max_actions: vec![2],
            q_values: BTreeMap::from([(1, -1.0), (2, 0.0)]),
        };
        table.insert(state(), record.clone());
        let wrapped = Table::Policy(table);
        assert_eq!(wrapped.kind(), TableKind::Policy);
        assert_eq!(wrapped.as_policy().unwrap().get(&state()), Some(&record));
        assert!(wrapped.as_q().is_none());
    }

    #[test]
    fn table_kind_parses() {
        assert_eq!("policy".parse::<TableKind>().unwrap(), TableKind::Policy);
        assert_eq!(TableKind::Q.to_string(), "q");
        assert!("v".parse::<TableKind>().is_err());
    }
}
