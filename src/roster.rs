//! Roster lookup used by the listing command.
//!
//! The attendance report itself never queries the roster; this is the
//! read-only data-access side of the application.

use crate::types::RosterRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Roster filter. Each empty inclusion set leaves its dimension unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterQuery {
    pub search: String,
    pub schools: Vec<String>,
    pub squads: Vec<String>,
    pub levels: Vec<i32>,
    pub direction: SortDirection,
}

pub trait RosterSource {
    /// Rows matching `query`, ordered by name in `query.direction`.
    fn filter(&self, query: &RosterQuery) -> Vec<RosterRow>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRoster {
    rows: Vec<RosterRow>,
}

impl InMemoryRoster {
    pub fn new(rows: Vec<RosterRow>) -> Self {
        InMemoryRoster { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RosterSource for InMemoryRoster {
    fn filter(&self, query: &RosterQuery) -> Vec<RosterRow> {
        let needle = query.search.trim().to_lowercase();
        let mut rows: Vec<RosterRow> = self
            .rows
            .iter()
            .filter(|r| needle.is_empty() || r.name.to_lowercase().contains(&needle))
            .filter(|r| query.schools.is_empty() || query.schools.contains(&r.school))
            .filter(|r| query.squads.is_empty() || query.squads.contains(&r.squad))
            .filter(|r| query.levels.is_empty() || query.levels.contains(&r.level))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        if query.direction == SortDirection::Descending {
            rows.reverse();
        }
        rows
    }
}

/// Split rows into squads, in order of each squad's first appearance.
pub fn group_by_squad(rows: &[RosterRow]) -> Vec<(String, Vec<RosterRow>)> {
    let mut groups: Vec<(String, Vec<RosterRow>)> = Vec::new();
    for r in rows {
        match groups.iter_mut().find(|(squad, _)| *squad == r.squad) {
            Some((_, members)) => members.push(r.clone()),
            None => groups.push((r.squad.clone(), vec![r.clone()])),
        }
    }
    groups
}
