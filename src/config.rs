//! Report configuration management.

use crate::compose::{LayoutMode, Logo};
use crate::error::ReportError;
use crate::output::{DocumentRenderer, JsonRenderer, TextRenderer};
use crate::reports::{DayOrder, ReportOrchestrator, DEFAULT_DAY_ORDER};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Report configuration. Every field has a default, so an empty file (or
/// none at all) is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Where the document is written.
    pub output_path: PathBuf,
    /// Layout used for every day.
    pub layout: LayoutMode,
    /// Output encoding.
    pub format: OutputFormat,
    /// Optional logo for combined pages.
    pub logo_path: Option<PathBuf>,
    /// Chart height in text rows.
    pub chart_height: usize,
    /// Day labels in report order; labels not listed sort last.
    pub day_priority: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            output_path: PathBuf::from("attendance_report.txt"),
            layout: LayoutMode::default(),
            format: OutputFormat::default(),
            logo_path: None,
            chart_height: 12,
            day_priority: DEFAULT_DAY_ORDER.labels().to_vec(),
        }
    }
}

impl ReportConfig {
    /// Load from an optional TOML file, then `ATTENDANCE_*` environment
    /// variables. `day_priority` may be given as a comma-separated list.
    pub fn load(path: Option<&Path>) -> Result<Self, ReportError> {
        let mut builder = Config::builder();
        if let Some(p) = path {
            builder = builder.add_source(File::from(p).required(true));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("ATTENDANCE")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("day_priority"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn orchestrator(&self) -> ReportOrchestrator {
        ReportOrchestrator::new(self.layout)
            .with_day_order(DayOrder::new(self.day_priority.iter().cloned()))
            .with_logo(Logo::discover(self.logo_path.as_deref()))
    }

    pub fn renderer(&self) -> Box<dyn DocumentRenderer> {
        match self.format {
            OutputFormat::Text => Box::new(TextRenderer { chart_height: self.chart_height }),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}
