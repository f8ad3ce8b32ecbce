use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::chart;
use crate::error::Result;
use crate::models::{SummaryResult, ViewKind};

pub fn build_report(
    source_name: &str,
    loaded_at: DateTime<Utc>,
    row_count: usize,
    top_n: usize,
    views: &[(ViewKind, Result<SummaryResult>)],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# School Records Dashboard");
    let _ = writeln!(
        output,
        "Generated from {} ({} records, loaded {})",
        source_name,
        row_count,
        loaded_at.format("%Y-%m-%d %H:%M UTC")
    );

    for (view, result) in views {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", chart::title(*view, top_n));

        let summary = match result {
            Ok(summary) => summary,
            Err(err) => {
                let _ = writeln!(output, "{err}");
                continue;
            }
        };

        if summary.is_empty() {
            let _ = writeln!(output, "No records in this view.");
            continue;
        }

        let _ = writeln!(output, "| {} | {} |", view.group_column(), summary.metric_label);
        let _ = writeln!(output, "|---|---:|");
        for row in &summary.rows {
            let _ = writeln!(
                output,
                "| {} | {} |",
                row.category,
                summary.format_metric(row.metric)
            );
        }
    }

    output
}
