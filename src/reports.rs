use crate::chart::build_series;
use crate::compose::{Document, LayoutMode, Logo, PageComposer};
use crate::error::ReportError;
use crate::output::{emit, DocumentRenderer, GenerationLock};
use crate::summary::aggregate_day;
use crate::types::{level_index, AttendanceRecord, RegistryEntry, Status, LEVELS};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Built-in day ordering used when no configuration overrides it.
pub static DEFAULT_DAY_ORDER: Lazy<DayOrder> = Lazy::new(|| DayOrder::new(["TUE PT", "WED PT", "THU PT", "LAB"]));

/// Explicit priority table for day labels.
///
/// Labels in the table sort by their position in it. Any other label sorts
/// after every known one, keeping the order in which it was first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOrder {
    labels: Vec<String>,
}

impl DayOrder {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DayOrder { labels: labels.into_iter().map(Into::into).collect() }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn priority(&self, day: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == day)
    }

    /// Distinct day labels of `entries`, in report order.
    pub fn resolve(&self, entries: &[RegistryEntry]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut days: Vec<String> = entries
            .iter()
            .filter(|e| seen.insert(e.day.as_str()))
            .map(|e| e.day.clone())
            .collect();
        // Stable sort: unknown labels keep their encounter order.
        days.sort_by_key(|d| self.priority(d).unwrap_or(usize::MAX));
        days
    }
}

impl Default for DayOrder {
    fn default() -> Self {
        DEFAULT_DAY_ORDER.clone()
    }
}

/// Turn a collected entry into an aggregation record. A missing or blank
/// selection becomes `Unset`; so does an unrecognized code, with a warning.
pub fn normalize(entry: &RegistryEntry) -> AttendanceRecord {
    let status = match entry.selection.as_deref() {
        None => Status::Unset,
        Some(code) => Status::from_code(code).unwrap_or_else(|| {
            warn!(name = %entry.name, day = %entry.day, code, "unrecognized status selection, treating as unset");
            Status::Unset
        }),
    };
    if level_index(entry.level).is_none() {
        debug!(name = %entry.name, level = entry.level, "level outside the fixed set, excluded from rollups");
    }
    AttendanceRecord {
        name: entry.name.clone(),
        level: entry.level,
        day: entry.day.clone(),
        status,
        is_late: entry.is_late,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The registry was empty; no document was built.
    NothingToGenerate,
    Generated(Document),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    NothingToGenerate,
    Written { path: PathBuf, pages: usize, bytes: usize },
}

/// Drives aggregation and page composition across every day of a registry.
#[derive(Debug, Clone)]
pub struct ReportOrchestrator {
    order: DayOrder,
    mode: LayoutMode,
    logo: Option<Logo>,
}

impl ReportOrchestrator {
    pub fn new(mode: LayoutMode) -> Self {
        ReportOrchestrator { order: DayOrder::default(), mode, logo: None }
    }

    pub fn with_day_order(mut self, order: DayOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_logo(mut self, logo: Option<Logo>) -> Self {
        self.logo = logo;
        self
    }

    pub fn day_order(&self) -> &DayOrder {
        &self.order
    }

    pub fn generate(&self, entries: &[RegistryEntry], generated_at: NaiveDateTime) -> GenerationOutcome {
        if entries.is_empty() {
            info!("registry is empty, nothing to generate");
            return GenerationOutcome::NothingToGenerate;
        }

        let days = self.order.resolve(entries);
        info!(days = ?days, layout = ?self.mode, "resolved report days");

        let composer = PageComposer::new(self.mode, self.logo.as_ref());
        let mut pages = Vec::new();
        for day in &days {
            let records: Vec<AttendanceRecord> =
                entries.iter().filter(|e| &e.day == day).map(normalize).collect();
            let summary = aggregate_day(day, &records, &LEVELS, self.mode.name_policy());
            let series = build_series(&records, &LEVELS);
            let day_pages = composer.compose(&summary, &series);
            debug!(day = %day, records = records.len(), pages = day_pages.len(), "composed day");
            pages.extend(day_pages);
        }

        GenerationOutcome::Generated(Document { layout: self.mode, generated_at, pages })
    }

    /// Generate and write the document to `path`. An empty registry writes
    /// nothing; any failure leaves `path` as it was. Writing holds a
    /// [`GenerationLock`] on `path`, so a concurrent generation for the same
    /// target fails with [`ReportError::GenerationInProgress`].
    pub fn generate_to(
        &self,
        entries: &[RegistryEntry],
        renderer: &dyn DocumentRenderer,
        path: &Path,
        generated_at: NaiveDateTime,
    ) -> Result<EmitOutcome, ReportError> {
        match self.generate(entries, generated_at) {
            GenerationOutcome::NothingToGenerate => Ok(EmitOutcome::NothingToGenerate),
            GenerationOutcome::Generated(doc) => {
                let _lock = GenerationLock::acquire(path)?;
                let bytes = emit(&doc, renderer, path)?;
                Ok(EmitOutcome::Written { path: path.to_path_buf(), pages: doc.pages.len(), bytes })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entry(day: &str) -> RegistryEntry {
        RegistryEntry::new("Ann Doe", 1, day, Some("P"), false)
    }

    #[rstest]
    #[case(&["LAB", "TUE PT"], &["TUE PT", "LAB"])]
    #[case(&["THU PT", "LAB", "WED PT", "TUE PT"], &["TUE PT", "WED PT", "THU PT", "LAB"])]
    #[case(&["FTX", "LAB", "Drill", "TUE PT", "FTX"], &["TUE PT", "LAB", "FTX", "Drill"])]
    #[case(&["Zulu", "Alpha"], &["Zulu", "Alpha"])]
    fn days_follow_priority_table(#[case] input: &[&str], #[case] expected: &[&str]) {
        let entries: Vec<RegistryEntry> = input.iter().map(|d| entry(d)).collect();
        assert_eq!(DayOrder::default().resolve(&entries), expected.to_vec());
    }

    #[test]
    fn custom_priority_table() {
        let order = DayOrder::new(["LAB", "TUE PT"]);
        assert_eq!(order.priority("LAB"), Some(0));
        assert_eq!(order.priority("WED PT"), None);
        let entries = vec![entry("WED PT"), entry("TUE PT"), entry("LAB")];
        assert_eq!(order.resolve(&entries), vec!["LAB", "TUE PT", "WED PT"]);
    }

    #[rstest]
    #[case(None, Status::Unset)]
    #[case(Some(""), Status::Unset)]
    #[case(Some("E"), Status::Excused)]
    #[case(Some("un"), Status::Uncontracted)]
    #[case(Some("??"), Status::Unset)]
    fn normalization_keeps_unset_records(#[case] selection: Option<&str>, #[case] expected: Status) {
        let e = RegistryEntry::new("Ann Doe", 2, "LAB", selection, true);
        let r = normalize(&e);
        assert_eq!(r.status, expected);
        assert!(r.is_late);
    }

    #[test]
    fn empty_registry_is_a_no_op() {
        let at = chrono::NaiveDate::from_ymd_opt(2026, 10, 13).unwrap().and_hms_opt(7, 0, 0).unwrap();
        let outcome = ReportOrchestrator::new(LayoutMode::Separate).generate(&[], at);
        assert_eq!(outcome, GenerationOutcome::NothingToGenerate);
    }
}
