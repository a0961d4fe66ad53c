use crate::types::{level_label, AttendanceRecord, DaySummary, LevelRow, LevelSummary, NamePolicy, Status};
use crate::util::{accountability_pct, format_name_cell, surname};

/// Group one day's records by level and status.
///
/// Every level in `levels` gets a row, even when it has no records. Records
/// whose level is not in `levels` still count toward the day's total strength
/// but appear in no row.
pub fn aggregate_day(day: &str, records: &[AttendanceRecord], levels: &[i32], policy: NamePolicy) -> DaySummary {
    let display = |r: &AttendanceRecord| -> String {
        match policy {
            NamePolicy::Full => r.name.clone(),
            NamePolicy::Surname => surname(&r.name).to_string(),
        }
    };

    let rows = levels
        .iter()
        .map(|&level| {
            let mut acc = LevelSummary { level, ..Default::default() };
            for r in records.iter().filter(|r| r.level == level) {
                match r.status {
                    Status::Present => acc.present += 1,
                    Status::Excused => acc.excused.push(display(r)),
                    Status::Absent => acc.absent.push(display(r)),
                    Status::Uncontracted => acc.uncontracted.push(display(r)),
                    Status::Unset => {}
                }
                if r.is_late {
                    acc.late.push(display(r));
                }
            }
            acc
        })
        .collect();

    DaySummary {
        day: day.to_string(),
        total_strength: records.len(),
        present: records.iter().filter(|r| r.status == Status::Present).count(),
        levels: rows,
    }
}

impl DaySummary {
    pub fn accountability(&self) -> f64 {
        accountability_pct(self.present, self.total_strength)
    }

    /// `Total Strength: T | Present: P | Accountability: x.y%`
    pub fn stats_line(&self) -> String {
        format!(
            "Total Strength: {} | Present: {} | Accountability: {:.1}%",
            self.total_strength,
            self.present,
            self.accountability()
        )
    }

    /// Table rows with name-list cells cut to `width` characters, or full
    /// length when `width` is `None`.
    pub fn rows(&self, width: Option<usize>) -> Vec<LevelRow> {
        self.levels.iter().map(|l| l.render(width)).collect()
    }
}

impl LevelSummary {
    pub fn render(&self, width: Option<usize>) -> LevelRow {
        LevelRow {
            level: level_label(self.level),
            present: self.present.to_string(),
            excused: format_name_cell(&self.excused, width),
            unaccounted_for: format_name_cell(&self.absent, width),
            uncontracted: format_name_cell(&self.uncontracted, width),
            late: format_name_cell(&self.late, width),
        }
    }
}
