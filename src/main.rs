use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::Level;

use groupscholar_records_dashboard::chart::{self, OutputFormat};
use groupscholar_records_dashboard::config::{self, AggregationConfig, GenderLabels};
use groupscholar_records_dashboard::state::Dashboard;
use groupscholar_records_dashboard::{
    aggregate, columns, ingest, report, session, telemetry, ViewKind,
};

#[derive(Parser)]
#[command(name = "records-dashboard")]
#[command(about = "Enrollment and failure-rate views over student course records", long_about = None)]
struct Cli {
    /// Data file loaded at startup
    #[arg(long, global = true, env = "DASHBOARD_DATA", default_value = config::DEFAULT_DATA_FILE)]
    data: PathBuf,

    /// Grades strictly below this count as failures
    #[arg(long, global = true, env = "DASHBOARD_PASSING_GRADE", default_value_t = config::PASSING_GRADE)]
    passing_grade: f64,

    /// How many categories ranked views keep
    #[arg(long, global = true, env = "DASHBOARD_TOP_N", default_value_t = config::TOP_N)]
    top: usize,

    /// Fold gender spellings (H/Hombre, M/F/Mujer) into one category each
    #[arg(long, global = true, env = "DASHBOARD_CANONICAL_GENDER")]
    canonical_gender: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a single view
    View {
        #[arg(long, short)]
        kind: ViewKind,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Generate a markdown report with every view
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// List which views the data file can serve
    Check,
    /// Interactive session: load files and switch views from stdin
    Session {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write a realistic sample data file
    Sample {
        #[arg(long, default_value = config::SAMPLE_DATA_FILE)]
        out: PathBuf,
        #[arg(long, default_value_t = 200)]
        students: usize,
    },
}

impl Cli {
    fn aggregation_config(&self) -> AggregationConfig {
        AggregationConfig {
            passing_grade: self.passing_grade,
            top_n: self.top,
            gender_labels: if self.canonical_gender {
                GenderLabels::Canonical
            } else {
                GenderLabels::AsRecorded
            },
        }
    }
}

/// Loads the startup file and returns what the user should be told, parse errors included.
fn startup_message(dashboard: &Dashboard, path: &Path) -> String {
    match dashboard.startup(path) {
        Ok(Some(message)) => message,
        Ok(None) => dashboard.status(),
        Err(err) => err.to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    telemetry::init_tracing(cli.json_logs, level);

    let dashboard = Dashboard::new(cli.aggregation_config());

    match cli.command {
        Commands::View { kind, format } => {
            let status = startup_message(&dashboard, &cli.data);
            // JSON consumers read stdout, so the status line moves to stderr there.
            match format {
                OutputFormat::Json => eprintln!("{status}"),
                OutputFormat::Text => println!("{status}"),
            }
            let top_n = dashboard.config().top_n;
            print!("{}", chart::present(&dashboard.render(kind), format, top_n));
        }
        Commands::Report { out } => {
            if let Err(err) = dashboard.startup(&cli.data) {
                anyhow::bail!("{err}");
            }
            let snapshot = dashboard
                .snapshot()
                .with_context(|| format!("no data file at {}", cli.data.display()))?;
            let views: Vec<_> = ViewKind::ALL
                .into_iter()
                .map(|view| {
                    (
                        view,
                        aggregate::summarize_with(&snapshot.table, view, dashboard.config()),
                    )
                })
                .collect();
            let report = report::build_report(
                &snapshot.source_name,
                snapshot.loaded_at,
                snapshot.table.len(),
                dashboard.config().top_n,
                &views,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Check => {
            println!("{}", startup_message(&dashboard, &cli.data));
            let snapshot = match dashboard.snapshot() {
                Some(snapshot) => snapshot,
                None => return Ok(()),
            };
            for view in ViewKind::ALL {
                let missing = columns::missing_columns(&snapshot.table, view);
                if missing.is_empty() {
                    println!("- {}: ready", view.slug());
                } else {
                    println!("- {}: missing {}", view.slug(), missing.join(", "));
                }
            }
        }
        Commands::Session { format } => {
            // The session opens with the status line itself; only a failed load needs printing.
            if let Err(err) = dashboard.startup(&cli.data) {
                println!("{err}");
            }
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            session::run(&dashboard, stdin, tokio::io::stdout(), format).await?;
        }
        Commands::Sample { out, students } => {
            let written = ingest::write_sample(&out, students)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "Wrote {written} course records for {students} students to {}.",
                out.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_message_surfaces_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let dashboard = Dashboard::default();
        let missing = dir.path().join("bd_dash.xlsx");
        assert_eq!(startup_message(&dashboard, &missing), "Waiting for file...");

        let broken = dir.path().join("broken.xlsx");
        std::fs::write(&broken, b"PK\x03\x04 not a workbook").unwrap();
        let message = startup_message(&dashboard, &broken);
        assert!(message.starts_with("Error processing file 'broken.xlsx'"));
    }
}
