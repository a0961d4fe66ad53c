// Stacked bar chart data and its character-grid rendering.
//
// Series are stacked in `TRACKED` order: each status segment starts on top
// of the running total of the statuses before it.
use crate::error::ReportError;
use crate::types::{level_label, AttendanceRecord, ChartSeries, Status};
use crate::util::center;

/// Statuses drawn on the chart, bottom to top. Uncontracted is not charted.
pub const TRACKED: [Status; 3] = [Status::Present, Status::Absent, Status::Excused];

/// Axis height used when every count is zero.
pub const EMPTY_AXIS_HEADROOM: usize = 5;

const AXIS_SCALE: f64 = 1.2;
const COLUMN_WIDTH: usize = 7;
const BAR_WIDTH: usize = 3;
const Y_LABEL_WIDTH: usize = 5;

pub fn glyph(status: Status) -> char {
    match status {
        Status::Present => '#',
        Status::Absent => 'x',
        Status::Excused => '+',
        Status::Uncontracted | Status::Unset => ' ',
    }
}

/// Count tracked statuses per level. `levels` fixes the bar order; records
/// with an untracked status or a level outside `levels` are skipped.
pub fn build_series(records: &[AttendanceRecord], levels: &[i32]) -> ChartSeries {
    let mut series: Vec<(Status, Vec<usize>)> = TRACKED.iter().map(|s| (*s, vec![0; levels.len()])).collect();
    for r in records {
        let Some(slot) = series.iter_mut().find(|(s, _)| *s == r.status) else { continue };
        if let Some(i) = levels.iter().position(|l| *l == r.level) {
            slot.1[i] += 1;
        }
    }
    ChartSeries { levels: levels.to_vec(), series }
}

impl ChartSeries {
    pub fn counts(&self, status: Status) -> Option<&[usize]> {
        self.series.iter().find(|(s, _)| *s == status).map(|(_, c)| c.as_slice())
    }

    /// Height of each stacked bar.
    pub fn stack_totals(&self) -> Vec<usize> {
        let mut bottom = vec![0usize; self.levels.len()];
        for (_, counts) in &self.series {
            for (b, c) in bottom.iter_mut().zip(counts) {
                *b += c;
            }
        }
        bottom
    }

    /// Top of the vertical axis: 1.2 times the tallest bar, with a floor of
    /// `EMPTY_AXIS_HEADROOM` when there is nothing to draw.
    pub fn axis_max(&self) -> f64 {
        let tallest = self.stack_totals().into_iter().max().unwrap_or(0);
        let tallest = if tallest == 0 { EMPTY_AXIS_HEADROOM } else { tallest };
        tallest as f64 * AXIS_SCALE
    }

    /// Status occupying value `v` in the bar at `idx`, if any.
    fn segment_at(&self, idx: usize, v: f64) -> Option<Status> {
        let mut top = 0usize;
        for (status, counts) in &self.series {
            top += counts[idx];
            if v < top as f64 {
                return Some(*status);
            }
        }
        None
    }
}

/// Draw `series` as a character grid `height` rows tall.
pub fn render_chart(series: &ChartSeries, title: &str, height: usize) -> Result<Vec<String>, ReportError> {
    if height == 0 {
        return Err(ReportError::ChartRender("chart height must be at least one row".to_string()));
    }
    if series.levels.is_empty() {
        return Err(ReportError::ChartRender("no levels to plot".to_string()));
    }
    if series.series.iter().any(|(_, c)| c.len() != series.levels.len()) {
        return Err(ReportError::ChartRender("series length does not match level count".to_string()));
    }

    let axis = series.axis_max();
    let plot_width = COLUMN_WIDTH * series.levels.len();
    let total_width = Y_LABEL_WIDTH + 2 + plot_width;
    let mut lines = Vec::with_capacity(height + 7);

    lines.push(center(title, total_width));
    lines.push("Number of Cadets".to_string());
    for row in 0..height {
        let hi = axis * (height - row) as f64 / height as f64;
        let lo = axis * (height - row - 1) as f64 / height as f64;
        let mid = (hi + lo) / 2.0;
        let label = if row % 2 == 0 { format!("{:>w$.0}", hi, w = Y_LABEL_WIDTH) } else { " ".repeat(Y_LABEL_WIDTH) };
        let mut line = format!("{} |", label);
        for idx in 0..series.levels.len() {
            let fill = series.segment_at(idx, mid).map(glyph).unwrap_or(' ');
            let pad = COLUMN_WIDTH - BAR_WIDTH;
            line.push_str(&" ".repeat(pad / 2 + 1));
            line.extend(std::iter::repeat(fill).take(BAR_WIDTH));
            line.push_str(&" ".repeat(pad - pad / 2 - 1));
        }
        lines.push(line.trim_end().to_string());
    }
    lines.push(format!("{:>w$} +{}", 0, "-".repeat(plot_width), w = Y_LABEL_WIDTH));

    let mut ticks = " ".repeat(Y_LABEL_WIDTH + 2);
    for level in &series.levels {
        ticks.push_str(&center(&level_label(*level), COLUMN_WIDTH));
    }
    lines.push(ticks.trim_end().to_string());
    lines.push(center("MS Level", total_width));

    let legend: Vec<String> = series.series.iter().map(|(s, _)| format!("{} {}", glyph(*s), s.label())).collect();
    lines.push(format!("{}Legend: {}", " ".repeat(Y_LABEL_WIDTH + 2), legend.join("  ")));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LEVELS;
    use proptest::prelude::*;

    fn rec(level: i32, status: Status) -> AttendanceRecord {
        AttendanceRecord { name: "Ann Doe".to_string(), level, day: "LAB".to_string(), status, is_late: false }
    }

    #[test]
    fn counts_tracked_statuses_per_level() {
        let records = vec![
            rec(1, Status::Present),
            rec(1, Status::Excused),
            rec(2, Status::Present),
            rec(3, Status::Absent),
            rec(3, Status::Uncontracted),
            rec(4, Status::Unset),
            rec(9, Status::Present),
        ];
        let s = build_series(&records, &LEVELS);
        assert_eq!(s.counts(Status::Present), Some(&[1, 1, 0, 0][..]));
        assert_eq!(s.counts(Status::Absent), Some(&[0, 0, 1, 0][..]));
        assert_eq!(s.counts(Status::Excused), Some(&[1, 0, 0, 0][..]));
        assert_eq!(s.counts(Status::Uncontracted), None);
        assert_eq!(s.stack_totals(), vec![2, 1, 1, 0]);
    }

    #[test]
    fn series_order_is_fixed() {
        let s = build_series(&[rec(2, Status::Excused), rec(2, Status::Absent)], &LEVELS);
        let order: Vec<Status> = s.series.iter().map(|(st, _)| *st).collect();
        assert_eq!(order, TRACKED.to_vec());
    }

    #[test]
    fn axis_has_headroom() {
        let s = build_series(&[rec(1, Status::Present), rec(1, Status::Absent), rec(2, Status::Present)], &LEVELS);
        assert!((s.axis_max() - 2.4).abs() < 1e-9);

        let empty = build_series(&[], &LEVELS);
        assert!((empty.axis_max() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn rendered_bars_stack_present_under_absent() {
        let records: Vec<AttendanceRecord> =
            (0..5).map(|_| rec(1, Status::Present)).chain((0..5).map(|_| rec(1, Status::Absent))).collect();
        let s = build_series(&records, &LEVELS);
        let lines = render_chart(&s, "LAB Attendance by MS class", 12).unwrap();
        assert!(lines[0].contains("LAB Attendance by MS class"));

        let grid = &lines[2..14];
        let first_x = grid.iter().position(|l| l.contains("xxx")).unwrap();
        let first_hash = grid.iter().position(|l| l.contains("###")).unwrap();
        assert!(first_x < first_hash);
        assert!(grid.last().unwrap().contains("###"));
        assert!(lines.iter().any(|l| l.contains("MS1") && l.contains("MS4")));
        assert!(lines.last().unwrap().contains("# Present  x Absent  + Excused"));
    }

    #[test]
    fn zero_height_is_a_render_error() {
        let s = build_series(&[], &LEVELS);
        assert!(matches!(render_chart(&s, "LAB", 0), Err(ReportError::ChartRender(_))));
    }

    proptest! {
        #[test]
        fn chart_totals_match_tracked_counts(
            raw in prop::collection::vec((0i32..7, 0usize..5), 0..80)
        ) {
            let statuses = [Status::Present, Status::Absent, Status::Excused, Status::Uncontracted, Status::Unset];
            let records: Vec<AttendanceRecord> = raw.iter().map(|(l, s)| rec(*l, statuses[*s])).collect();
            let s = build_series(&records, &LEVELS);
            let totals = s.stack_totals();
            for (i, level) in LEVELS.iter().enumerate() {
                let expected = records
                    .iter()
                    .filter(|r| r.level == *level && TRACKED.contains(&r.status))
                    .count();
                prop_assert_eq!(totals[i], expected);
            }
        }
    }
}
