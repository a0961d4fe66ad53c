use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Organizational levels, in display order. Records outside this set are
/// left out of every per-level rollup.
pub const LEVELS: [i32; 4] = [1, 2, 3, 4];

/// Position of `level` in [`LEVELS`], if it is a known level.
pub fn level_index(level: i32) -> Option<usize> {
    LEVELS.iter().position(|l| *l == level)
}

pub fn level_label(level: i32) -> String {
    format!("MS{}", level)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Present,
    Absent,
    Excused,
    Uncontracted,
    /// No selection was made. Never counted as Absent.
    Unset,
}

impl Status {
    /// Parse a status selection code. Blank input is `Unset`; an unknown
    /// non-blank code yields `None` so the caller can decide how to report it.
    pub fn from_code(code: &str) -> Option<Status> {
        let code = code.trim();
        if code.is_empty() {
            return Some(Status::Unset);
        }
        match code.to_ascii_uppercase().as_str() {
            "P" | "PRESENT" => Some(Status::Present),
            "A" | "ABSENT" => Some(Status::Absent),
            "E" | "EXCUSED" => Some(Status::Excused),
            "UN" | "UNCONTRACTED" => Some(Status::Uncontracted),
            "N" | "UNSET" => Some(Status::Unset),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Present => "Present",
            Status::Absent => "Absent",
            Status::Excused => "Excused",
            Status::Uncontracted => "Uncontracted",
            Status::Unset => "Unset",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the attendance CSV, before any validation.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub name: Option<String>,
    pub ms_level: Option<String>,
    pub day: Option<String>,
    pub status: Option<String>,
    pub is_late: Option<String>,
}

/// An attendance entry as collected by the front end: the status is still
/// the raw selection and may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: String,
    pub level: i32,
    pub day: String,
    pub selection: Option<String>,
    pub is_late: bool,
}

impl RegistryEntry {
    pub fn new(name: &str, level: i32, day: &str, selection: Option<&str>, is_late: bool) -> Self {
        RegistryEntry {
            name: name.to_string(),
            level,
            day: day.to_string(),
            selection: selection.map(str::to_string),
            is_late,
        }
    }
}

/// The atomic unit of aggregation input.
///
/// Callers are responsible for uniqueness of `(name, level, day)`; duplicate
/// records are counted once each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub name: String,
    pub level: i32,
    pub day: String,
    pub status: Status,
    pub is_late: bool,
}

/// Which form of a cadet's name goes into the name lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePolicy {
    Full,
    /// Last whitespace-delimited token only.
    Surname,
}

/// Aggregated counts and name lists for one level on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub level: i32,
    pub present: usize,
    pub excused: Vec<String>,
    pub absent: Vec<String>,
    pub uncontracted: Vec<String>,
    pub late: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub day: String,
    /// Every record of the day, including unknown levels and unset statuses.
    pub total_strength: usize,
    pub present: usize,
    pub levels: Vec<LevelSummary>,
}

/// One rendered table row. Column order is fixed for every layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct LevelRow {
    #[serde(rename = "MSLVL")]
    #[tabled(rename = "MSLVL")]
    pub level: String,
    #[serde(rename = "Present")]
    #[tabled(rename = "Present")]
    pub present: String,
    #[serde(rename = "Excused")]
    #[tabled(rename = "Excused")]
    pub excused: String,
    #[serde(rename = "Unaccounted For")]
    #[tabled(rename = "Unaccounted For")]
    pub unaccounted_for: String,
    #[serde(rename = "Uncontracted")]
    #[tabled(rename = "Uncontracted")]
    pub uncontracted: String,
    #[serde(rename = "Late")]
    #[tabled(rename = "Late")]
    pub late: String,
}

/// Stacked chart input: one count per level for each tracked status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub levels: Vec<i32>,
    pub series: Vec<(Status, Vec<usize>)>,
}

/// A roster member as stored by the data-access layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Tabled)]
pub struct RosterRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "ms_level")]
    #[tabled(rename = "MS")]
    pub level: i32,
    #[tabled(rename = "School")]
    pub school: String,
    #[tabled(rename = "Squad")]
    pub squad: String,
    #[tabled(rename = "Tier")]
    pub tier: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("P", Some(Status::Present))]
    #[case("present", Some(Status::Present))]
    #[case(" a ", Some(Status::Absent))]
    #[case("E", Some(Status::Excused))]
    #[case("UN", Some(Status::Uncontracted))]
    #[case("", Some(Status::Unset))]
    #[case("   ", Some(Status::Unset))]
    #[case("N", Some(Status::Unset))]
    #[case("X", None)]
    fn status_codes(#[case] code: &str, #[case] expected: Option<Status>) {
        assert_eq!(Status::from_code(code), expected);
    }

    #[test]
    fn table_headers_are_fixed() {
        let headers: Vec<String> = LevelRow::headers().iter().map(|h| h.to_string()).collect();
        assert_eq!(headers, vec!["MSLVL", "Present", "Excused", "Unaccounted For", "Uncontracted", "Late"]);
    }

    #[test]
    fn level_index_covers_known_levels_only() {
        assert_eq!(level_index(1), Some(0));
        assert_eq!(level_index(4), Some(3));
        assert_eq!(level_index(0), None);
        assert_eq!(level_index(9), None);
    }
}
