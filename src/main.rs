// Entry point and CLI flow.
//
// - `generate` loads attendance entries from CSV and writes the report.
// - `roster` lists roster members through the roster filter.
use std::path::PathBuf;

use anyhow::Context;
use attendance_report::config::{OutputFormat, ReportConfig};
use attendance_report::output::preview_table_rows;
use attendance_report::roster::{group_by_squad, InMemoryRoster, RosterQuery, RosterSource, SortDirection};
use attendance_report::util::format_int;
use attendance_report::{loader, EmitOutcome, LayoutMode};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "attendance-report")]
#[command(about = "Roster attendance summaries and printable reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the attendance report from collected entries
    Generate {
        /// CSV with columns name,ms_level,day,status,is_late
        #[arg(long)]
        entries: PathBuf,
        #[arg(long, value_enum)]
        layout: Option<LayoutMode>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        logo: Option<PathBuf>,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List roster members
    Roster {
        /// CSV with columns id,name,ms_level,school,squad,tier
        #[arg(long)]
        roster: PathBuf,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        school: Vec<String>,
        #[arg(long)]
        squad: Vec<String>,
        #[arg(long)]
        level: Vec<i32>,
        /// Sort names descending
        #[arg(long)]
        desc: bool,
        /// Print one table per squad
        #[arg(long)]
        by_squad: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendance_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn handle_generate(
    entries: PathBuf,
    layout: Option<LayoutMode>,
    format: Option<OutputFormat>,
    out: Option<PathBuf>,
    logo: Option<PathBuf>,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut cfg = ReportConfig::load(config.as_deref()).context("failed to load configuration")?;
    if let Some(layout) = layout {
        cfg.layout = layout;
    }
    if let Some(format) = format {
        cfg.format = format;
    }
    if let Some(out) = out {
        cfg.output_path = out;
    }
    if logo.is_some() {
        cfg.logo_path = logo;
    }

    let (registry, load_report) = loader::load_entries(&entries)
        .with_context(|| format!("failed to read entries from {}", entries.display()))?;
    println!(
        "Processing entries... ({} rows read, {} loaded)",
        format_int(load_report.total_rows),
        format_int(load_report.loaded_rows)
    );
    if load_report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            format_int(load_report.parse_errors)
        );
    }
    if load_report.unset_status > 0 {
        println!("Info: {} entries have no status selected.", format_int(load_report.unset_status));
    }

    let renderer = cfg.renderer();
    let outcome = cfg
        .orchestrator()
        .generate_to(&registry, renderer.as_ref(), &cfg.output_path, Local::now().naive_local())
        .context("report generation failed")?;

    match outcome {
        EmitOutcome::NothingToGenerate => println!("Nothing to generate: no attendance entries."),
        EmitOutcome::Written { path, pages, bytes } => {
            info!(path = %path.display(), pages, bytes, "done");
            println!("Report written to {} ({} pages).", path.display(), pages);
        }
    }
    Ok(())
}

fn handle_roster(path: PathBuf, query: RosterQuery, by_squad: bool) -> anyhow::Result<()> {
    let rows = loader::load_roster(&path).with_context(|| format!("failed to read roster from {}", path.display()))?;
    let roster = InMemoryRoster::new(rows);
    let matches = roster.filter(&query);
    println!("{} of {} cadets match.\n", format_int(matches.len()), format_int(roster.len()));

    if by_squad {
        for (squad, members) in group_by_squad(&matches) {
            println!("{}", squad);
            preview_table_rows(&members, members.len());
        }
    } else {
        preview_table_rows(&matches, matches.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { entries, layout, format, out, logo, config } => {
            handle_generate(entries, layout, format, out, logo, config)?;
        }
        Commands::Roster { roster, search, school, squad, level, desc, by_squad } => {
            let query = RosterQuery {
                search,
                schools: school,
                squads: squad,
                levels: level,
                direction: if desc { SortDirection::Descending } else { SortDirection::Ascending },
            };
            handle_roster(roster, query, by_squad)?;
        }
    }

    Ok(())
}
