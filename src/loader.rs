use crate::error::ReportError;
use crate::types::{RawRow, RegistryEntry, RosterRow};
use crate::util::{parse_bool_safe, parse_i32_safe};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub unset_status: usize,
}

pub fn load_entries(path: &Path) -> Result<(Vec<RegistryEntry>, LoadReport), ReportError> {
    let file = std::fs::File::open(path)?;
    read_entries(file)
}

/// Read attendance entries from CSV with the columns
/// `name,ms_level,day,status,is_late`.
///
/// Rows without a name or day, or with an unparseable level or late flag, are
/// skipped and counted in `parse_errors`. A blank status is kept as-is; the
/// orchestrator turns it into the `Unset` placeholder.
pub fn read_entries<R: Read>(reader: R) -> Result<(Vec<RegistryEntry>, LoadReport), ReportError> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
    let mut report = LoadReport::default();
    let mut entries: Vec<RegistryEntry> = Vec::new();

    for (line, result) in rdr.deserialize::<RawRow>().enumerate() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(line = line + 2, error = %e, "skipping malformed row");
                report.parse_errors += 1;
                continue;
            }
        };

        let name = match row.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => { report.parse_errors += 1; continue; }
        };
        let day = match row.day.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => { report.parse_errors += 1; continue; }
        };
        let Some(level) = parse_i32_safe(row.ms_level.as_deref()) else {
            report.parse_errors += 1;
            continue;
        };
        let Some(is_late) = parse_bool_safe(row.is_late.as_deref()) else {
            warn!(line = line + 2, name = %name, "unrecognized late flag, skipping row");
            report.parse_errors += 1;
            continue;
        };

        let selection = row.status.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if selection.is_none() {
            report.unset_status += 1;
        }

        entries.push(RegistryEntry { name, level, day, selection, is_late });
    }

    report.loaded_rows = entries.len();
    Ok((entries, report))
}

pub fn load_roster(path: &Path) -> Result<Vec<RosterRow>, ReportError> {
    let file = std::fs::File::open(path)?;
    read_roster(file)
}

/// Read roster rows with the columns `id,name,ms_level,school,squad,tier`.
/// Unlike attendance entries, a malformed roster row is a hard error.
pub fn read_roster<R: Read>(reader: R) -> Result<Vec<RosterRow>, ReportError> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize::<RosterRow>() {
        rows.push(result?);
    }
    Ok(rows)
}
