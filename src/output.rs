use crate::chart::render_chart;
use crate::compose::{Document, Element, Page, Region};
use crate::error::ReportError;
use crate::util::center;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tabled::{settings::Style, Table, Tabled};
use tracing::{debug, info, warn};

const MIN_PAGE_WIDTH: usize = 80;
const COLUMN_GAP: usize = 4;
const PAGE_BREAK: char = '\u{000C}';

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Turns a composed document into the bytes of the output artifact.
pub trait DocumentRenderer {
    fn render(&self, doc: &Document) -> Result<Vec<u8>, ReportError>;
}

/// Plain-text pages separated by form feeds, suitable for printing.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    pub chart_height: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        TextRenderer { chart_height: 12 }
    }
}

impl DocumentRenderer for TextRenderer {
    fn render(&self, doc: &Document) -> Result<Vec<u8>, ReportError> {
        let footer = format!("Generated {}", doc.generated_at.format("%Y-%m-%d %H:%M"));
        let mut out = String::new();
        for (i, page) in doc.pages.iter().enumerate() {
            if i > 0 {
                out.push(PAGE_BREAK);
                out.push('\n');
            }
            for line in self.render_page(page, &footer)? {
                out.push_str(&line);
                out.push('\n');
            }
        }
        Ok(out.into_bytes())
    }
}

impl TextRenderer {
    fn render_element(&self, element: &Element) -> Result<Vec<String>, ReportError> {
        Ok(match element {
            Element::Heading { text } | Element::Text { text } => vec![text.clone()],
            Element::Table { rows, .. } => {
                Table::new(rows.iter().cloned()).with(Style::ascii()).to_string().lines().map(str::to_string).collect()
            }
            Element::Chart { title, series } => render_chart(series, title, self.chart_height)?,
            Element::Image { path } => {
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                vec![format!("[logo: {}]", name)]
            }
        })
    }

    fn render_region(&self, page: &Page, region: Region) -> Result<Vec<String>, ReportError> {
        let mut lines = Vec::new();
        for element in page.in_region(region) {
            lines.extend(self.render_element(element)?);
        }
        Ok(lines)
    }

    fn render_page(&self, page: &Page, footer: &str) -> Result<Vec<String>, ReportError> {
        let header = self.render_region(page, Region::Header)?;
        let top_left = self.render_region(page, Region::TopLeft)?;
        let top_right = self.render_region(page, Region::TopRight)?;

        let mut body = self.render_region(page, Region::Full)?;
        let left = self.render_region(page, Region::LeftHalf)?;
        let right = self.render_region(page, Region::RightHalf)?;
        if !left.is_empty() || !right.is_empty() {
            body.extend(side_by_side(&left, &right));
        }

        let width = header
            .iter()
            .chain(body.iter())
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(MIN_PAGE_WIDTH);

        let mut lines = Vec::new();
        if !top_left.is_empty() || !top_right.is_empty() {
            let l = top_left.first().cloned().unwrap_or_default();
            let r = top_right.first().cloned().unwrap_or_default();
            let gap = width.saturating_sub(l.chars().count() + r.chars().count()).max(1);
            lines.push(format!("{}{}{}", l, " ".repeat(gap), r));
        }
        lines.extend(header.iter().map(|h| center(h, width).trim_end().to_string()));
        if !header.is_empty() {
            lines.push(String::new());
        }
        lines.extend(body);
        lines.push(String::new());
        lines.push(format!("{:>w$}", footer, w = width));
        Ok(lines)
    }
}

/// Pretty JSON of the document model.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn render(&self, doc: &Document) -> Result<Vec<u8>, ReportError> {
        Ok(serde_json::to_vec_pretty(doc)?)
    }
}

/// Place two blocks next to each other, both starting on the first line.
fn side_by_side(left: &[String], right: &[String]) -> Vec<String> {
    let left_width = left.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let rows = left.len().max(right.len());
    (0..rows)
        .map(|i| {
            let l = left.get(i).map(String::as_str).unwrap_or("");
            let r = right.get(i).map(String::as_str).unwrap_or("");
            let pad = left_width - l.chars().count() + COLUMN_GAP;
            format!("{}{}{}", l, " ".repeat(pad), r).trim_end().to_string()
        })
        .collect()
}

/// Write `bytes` to `path` through a sibling temporary file, so `path` either
/// holds the complete new document or is left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let emission = |source: std::io::Error| ReportError::Emission { path: path.to_path_buf(), source };
    let tmp = temp_path(path);

    let written = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(emission(e));
    }
    debug!(path = %path.display(), bytes = bytes.len(), "report written");
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "report".to_string())
}

/// A temp name no other writer, in this process or another, will pick.
fn temp_path(path: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.{}.{}.tmp", file_name(path), std::process::id(), n))
}

/// Exclusive claim on an output path, held for the length of one generation.
///
/// The claim is a `<name>.lock` file created next to the target with
/// `create_new`, so it holds across processes. Dropping the guard removes it.
#[derive(Debug)]
pub struct GenerationLock {
    path: PathBuf,
}

impl GenerationLock {
    pub fn acquire(target: &Path) -> Result<GenerationLock, ReportError> {
        let path = lock_path(target);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let _ = writeln!(file, "{}", std::process::id());
                debug!(lock = %path.display(), "generation lock acquired");
                Ok(GenerationLock { path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(ReportError::GenerationInProgress { path: target.to_path_buf() })
            }
            Err(source) => Err(ReportError::Emission { path: target.to_path_buf(), source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for GenerationLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "unable to remove generation lock");
        }
    }
}

pub fn lock_path(target: &Path) -> PathBuf {
    target.with_file_name(format!("{}.lock", file_name(target)))
}

/// Render the whole document first, then write it in one step. Returns the
/// number of bytes written.
pub fn emit(doc: &Document, renderer: &dyn DocumentRenderer, path: &Path) -> Result<usize, ReportError> {
    let bytes = renderer.render(doc)?;
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), pages = doc.pages.len(), bytes = bytes.len(), "report emitted");
    Ok(bytes.len())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_by_side_aligns_right_block() {
        let left = vec!["ab".to_string(), "abcd".to_string()];
        let right = vec!["X".to_string(), "Y".to_string(), "Z".to_string()];
        let lines = side_by_side(&left, &right);
        assert_eq!(lines, vec!["ab      X", "abcd    Y", "        Z"]);
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("attendance-output-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn leftover_temps(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn temp_files_sit_next_to_target_with_unique_names() {
        let a = temp_path(Path::new("/out/report.txt"));
        let b = temp_path(Path::new("/out/report.txt"));
        assert_ne!(a, b);
        for p in [&a, &b] {
            assert_eq!(p.parent(), Some(Path::new("/out")));
            let name = p.file_name().unwrap().to_string_lossy();
            assert!(name.starts_with(".report.txt."));
            assert!(name.ends_with(".tmp"));
        }
    }

    #[test]
    fn failed_write_leaves_nothing_behind() {
        let dir = std::env::temp_dir().join(format!("attendance-report-missing-{}", std::process::id()));
        let target = dir.join("report.txt");
        let err = write_atomic(&target, b"page").unwrap_err();
        assert!(matches!(err, ReportError::Emission { .. }));
        assert!(!target.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = scratch_dir("replace");
        let target = dir.join("report.txt");
        write_atomic(&target, b"old").unwrap();
        write_atomic(&target, b"new").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert!(leftover_temps(&dir).is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn concurrent_writers_to_one_target_both_succeed() {
        let dir = scratch_dir("concurrent");
        let target = dir.join("report.txt");
        for _ in 0..50 {
            let handles: Vec<_> = [b"first".as_slice(), b"second".as_slice()]
                .into_iter()
                .map(|bytes| {
                    let target = target.clone();
                    std::thread::spawn(move || write_atomic(&target, bytes))
                })
                .collect();
            for h in handles {
                h.join().unwrap().unwrap();
            }
            let content = fs::read(&target).unwrap();
            assert!(content == b"first" || content == b"second");
        }
        assert!(leftover_temps(&dir).is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn second_lock_on_same_target_fails_fast() {
        let dir = scratch_dir("lock");
        let target = dir.join("report.txt");
        let held = GenerationLock::acquire(&target).unwrap();
        assert_eq!(held.path(), lock_path(&target));
        assert!(lock_path(&target).exists());

        let err = GenerationLock::acquire(&target).unwrap_err();
        assert!(matches!(err, ReportError::GenerationInProgress { .. }));
        assert!(err.to_string().contains("already in progress"));

        drop(held);
        assert!(!lock_path(&target).exists());
        let again = GenerationLock::acquire(&target).unwrap();
        drop(again);
        let _ = fs::remove_dir_all(&dir);
    }
}
