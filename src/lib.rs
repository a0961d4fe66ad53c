//! Attendance aggregation and report rendering.
//!
//! Flat attendance entries go in; a multi-day document with a summary table
//! and a stacked bar chart per day comes out.
pub mod chart;
pub mod compose;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod roster;
pub mod summary;
pub mod types;
pub mod util;

pub use compose::{Document, LayoutMode, Logo, PageComposer};
pub use error::ReportError;
pub use reports::{DayOrder, EmitOutcome, GenerationOutcome, ReportOrchestrator};
pub use types::{AttendanceRecord, RegistryEntry, Status};
