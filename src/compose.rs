//! Page composition for one day of the report.
//!
//! The composer does not draw anything. It produces a [`Page`] made of
//! elements placed into abstract regions; an [`crate::output::DocumentRenderer`]
//! turns those into bytes.

use crate::types::{ChartSeries, DaySummary, LevelRow, NamePolicy};
use crate::util::{COMBINED_CELL_WIDTH, SEPARATE_CELL_WIDTH};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How each day is laid out. Chosen once for the whole report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// A full-width table page followed by a full-page chart.
    #[default]
    Separate,
    /// One page: condensed table on the left, chart on the right.
    Combined,
}

impl LayoutMode {
    pub fn name_policy(self) -> NamePolicy {
        match self {
            LayoutMode::Separate => NamePolicy::Full,
            LayoutMode::Combined => NamePolicy::Surname,
        }
    }

    pub fn cell_width(self) -> usize {
        match self {
            LayoutMode::Separate => SEPARATE_CELL_WIDTH,
            LayoutMode::Combined => COMBINED_CELL_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Header,
    TopLeft,
    TopRight,
    Full,
    LeftHalf,
    RightHalf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Heading { text: String },
    Text { text: String },
    /// Headers come from `LevelRow`'s column names.
    Table { rows: Vec<LevelRow> },
    Chart { title: String, series: ChartSeries },
    Image { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placed {
    pub region: Region,
    pub element: Element,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Table,
    Chart,
    Combined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub day: String,
    pub kind: PageKind,
    pub elements: Vec<Placed>,
}

impl Page {
    fn new(day: &str, kind: PageKind) -> Self {
        Page { day: day.to_string(), kind, elements: Vec::new() }
    }

    fn place(&mut self, region: Region, element: Element) {
        self.elements.push(Placed { region, element });
    }

    pub fn in_region(&self, region: Region) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |p| p.region == region).map(|p| &p.element)
    }
}

/// The assembled report: every page in day order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub layout: LayoutMode,
    pub generated_at: NaiveDateTime,
    pub pages: Vec<Page>,
}

/// An organizational logo that exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    path: PathBuf,
}

impl Logo {
    /// Returns `None` when no path is configured or the file is missing.
    pub fn discover(path: Option<&Path>) -> Option<Logo> {
        let path = path?;
        if path.is_file() {
            Some(Logo { path: path.to_path_buf() })
        } else {
            debug!(path = %path.display(), "logo not found, rendering without it");
            None
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn chart_title(day: &str) -> String {
    format!("{} Attendance by MS class", day)
}

pub struct PageComposer<'a> {
    mode: LayoutMode,
    logo: Option<&'a Logo>,
}

impl<'a> PageComposer<'a> {
    pub fn new(mode: LayoutMode, logo: Option<&'a Logo>) -> Self {
        PageComposer { mode, logo }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Lay out one day. `summary` should have been aggregated with
    /// [`LayoutMode::name_policy`] for this composer's mode.
    pub fn compose(&self, summary: &DaySummary, series: &ChartSeries) -> Vec<Page> {
        let day = summary.day.as_str();
        let table = Element::Table { rows: summary.rows(Some(self.mode.cell_width())) };
        let chart = Element::Chart { title: chart_title(day), series: series.clone() };

        match self.mode {
            LayoutMode::Separate => {
                let mut table_page = Page::new(day, PageKind::Table);
                self.header(&mut table_page, summary);
                table_page.place(Region::Full, table);

                let mut chart_page = Page::new(day, PageKind::Chart);
                chart_page.place(Region::Full, chart);
                vec![table_page, chart_page]
            }
            LayoutMode::Combined => {
                let mut page = Page::new(day, PageKind::Combined);
                if let Some(logo) = self.logo {
                    page.place(Region::TopLeft, Element::Image { path: logo.path().to_path_buf() });
                    page.place(Region::TopRight, Element::Image { path: logo.path().to_path_buf() });
                }
                self.header(&mut page, summary);
                page.place(Region::LeftHalf, table);
                page.place(Region::RightHalf, chart);
                vec![page]
            }
        }
    }

    fn header(&self, page: &mut Page, summary: &DaySummary) {
        page.place(Region::Header, Element::Heading { text: format!("ATTENDANCE: {}", summary.day) });
        page.place(Region::Header, Element::Text { text: summary.stats_line() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::build_series;
    use crate::summary::aggregate_day;
    use crate::types::{AttendanceRecord, Status, LEVELS};

    fn day_records() -> Vec<AttendanceRecord> {
        [("Alexandra Montgomery", Status::Excused), ("Benjamin Whitfield", Status::Excused), ("Cy Ro", Status::Present)]
            .iter()
            .map(|(n, s)| AttendanceRecord { name: n.to_string(), level: 1, day: "WED PT".to_string(), status: *s, is_late: false })
            .collect()
    }

    fn compose(mode: LayoutMode, logo: Option<&Logo>) -> Vec<Page> {
        let records = day_records();
        let summary = aggregate_day("WED PT", &records, &LEVELS, mode.name_policy());
        let series = build_series(&records, &LEVELS);
        PageComposer::new(mode, logo).compose(&summary, &series)
    }

    fn table_rows(page: &Page, region: Region) -> Vec<LevelRow> {
        page.in_region(region)
            .find_map(|e| match e {
                Element::Table { rows, .. } => Some(rows.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn separate_mode_emits_table_then_chart() {
        let pages = compose(LayoutMode::Separate, None);
        assert_eq!(pages.iter().map(|p| p.kind).collect::<Vec<_>>(), vec![PageKind::Table, PageKind::Chart]);

        let header: Vec<&Element> = pages[0].in_region(Region::Header).collect();
        assert_eq!(header[0], &Element::Heading { text: "ATTENDANCE: WED PT".to_string() });
        assert_eq!(
            header[1],
            &Element::Text { text: "Total Strength: 3 | Present: 1 | Accountability: 33.3%".to_string() }
        );

        let rows = table_rows(&pages[0], Region::Full);
        assert_eq!(rows[0].excused, "2 (Alexandra Montgomery, Benjamin Whitfield)");
        assert!(matches!(pages[1].in_region(Region::Full).next(), Some(Element::Chart { .. })));
    }

    #[test]
    fn combined_mode_puts_table_left_and_chart_right() {
        let pages = compose(LayoutMode::Combined, None);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].kind, PageKind::Combined);
        let rows = table_rows(&pages[0], Region::LeftHalf);
        assert_eq!(rows[0].excused, "2 (Montgomery, Whitfield)");
        assert!(matches!(pages[0].in_region(Region::RightHalf).next(), Some(Element::Chart { .. })));
        assert_eq!(pages[0].in_region(Region::TopLeft).count(), 0);
    }

    #[test]
    fn logo_goes_in_both_corners_when_present() {
        let logo = Logo { path: PathBuf::from("logo.png") };
        let pages = compose(LayoutMode::Combined, Some(&logo));
        assert_eq!(pages[0].in_region(Region::TopLeft).count(), 1);
        assert_eq!(pages[0].in_region(Region::TopRight).count(), 1);
    }

    #[test]
    fn missing_logo_file_is_not_an_error() {
        assert_eq!(Logo::discover(Some(Path::new("/nonexistent/logo.png"))), None);
        assert_eq!(Logo::discover(None), None);
    }

    #[test]
    fn both_modes_emit_one_table_per_day() {
        for mode in [LayoutMode::Separate, LayoutMode::Combined] {
            let pages = compose(mode, None);
            let tables = pages
                .iter()
                .flat_map(|p| p.elements.iter())
                .filter(|p| matches!(p.element, Element::Table { .. }))
                .count();
            assert_eq!(tables, 1);
        }
    }
}
