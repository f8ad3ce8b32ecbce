//! Chart descriptors handed to whatever draws the dashboard.

use std::fmt::Write;

use serde::Serialize;

use crate::error::Result;
use crate::models::{SummaryResult, ViewKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Donut,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub category: String,
    pub value: f64,
    pub label: String,
    /// Fixed colour for donut slices; bars use `color_scale` instead.
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub view: ViewKind,
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_range: Option<(f64, f64)>,
    pub color_scale: Option<String>,
    pub hole: Option<f64>,
    pub points: Vec<ChartPoint>,
}

pub fn title(view: ViewKind, top_n: usize) -> String {
    let column = view.group_column();
    match view {
        ViewKind::ByGeneration => "Enrollment by Generation".to_string(),
        ViewKind::ByGender => "Enrollment by Gender".to_string(),
        ViewKind::ByProgram | ViewKind::ByHighSchool => format!("Enrollment by {column}"),
        ViewKind::FailureBySubject | ViewKind::FailureByInstructor => {
            format!("Top {top_n} Failure Rate by {column}")
        }
    }
}

pub fn gender_color(label: &str) -> &'static str {
    match label {
        "H" | "Hombre" => "blue",
        "M" | "F" | "Mujer" => "hotpink",
        _ => "grey",
    }
}

pub fn build(summary: &SummaryResult, top_n: usize) -> ChartSpec {
    let view = summary.view;
    let (kind, color_scale, hole) = match view {
        ViewKind::ByGeneration => (ChartKind::Line, None, None),
        ViewKind::ByGender => (ChartKind::Donut, None, Some(0.5)),
        ViewKind::ByProgram | ViewKind::ByHighSchool => {
            (ChartKind::Bar, Some("Viridis".to_string()), None)
        }
        ViewKind::FailureBySubject | ViewKind::FailureByInstructor => {
            (ChartKind::Bar, Some("Reds".to_string()), None)
        }
    };

    let points = summary
        .rows
        .iter()
        .map(|row| ChartPoint {
            category: row.category.clone(),
            value: row.metric,
            label: summary.format_metric(row.metric),
            color: (kind == ChartKind::Donut).then(|| gender_color(&row.category).to_string()),
        })
        .collect();

    ChartSpec {
        view,
        kind,
        title: title(view, top_n),
        x_label: view.group_column().to_string(),
        y_label: summary.metric_label.clone(),
        y_range: summary.value_domain,
        color_scale,
        hole,
        points,
    }
}

/// Plain-text rendering for terminals: one line per category with a proportional bar.
pub fn render_text(spec: &ChartSpec) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", spec.title);

    if spec.points.is_empty() {
        let _ = writeln!(output, "(no categories)");
        return output;
    }

    let width = spec
        .points
        .iter()
        .map(|point| point.category.chars().count())
        .max()
        .unwrap_or(0);
    let scale_max = match spec.y_range {
        Some((_, max)) => max,
        None => spec
            .points
            .iter()
            .map(|point| point.value)
            .fold(0.0, f64::max),
    };

    for point in &spec.points {
        let filled = if scale_max > 0.0 {
            ((point.value / scale_max) * 30.0).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            output,
            "{:<width$}  {:>8}  {}",
            point.category,
            point.label,
            "#".repeat(filled.min(30)),
        );
    }
    output
}

/// Turns a view outcome into what the user sees. Errors become their message.
pub fn present(
    result: &Result<SummaryResult>,
    format: OutputFormat,
    top_n: usize,
) -> String {
    let summary = match result {
        Ok(summary) => summary,
        Err(err) => return format!("{err}\n"),
    };
    let spec = build(summary, top_n);
    match format {
        OutputFormat::Text => render_text(&spec),
        OutputFormat::Json => match serde_json::to_string_pretty(&spec) {
            Ok(json) => format!("{json}\n"),
            Err(err) => format!("failed to encode chart: {err}\n"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryRow;

    fn summary(view: ViewKind, rows: &[(&str, f64)]) -> SummaryResult {
        SummaryResult::new(
            view,
            rows.iter()
                .map(|(category, metric)| SummaryRow {
                    category: category.to_string(),
                    metric: *metric,
                })
                .collect(),
        )
    }

    #[test]
    fn gender_donut_uses_fixed_colors() {
        let spec = build(
            &summary(ViewKind::ByGender, &[("H", 10.0), ("Mujer", 12.0), ("X", 1.0)]),
            15,
        );
        assert_eq!(spec.kind, ChartKind::Donut);
        assert_eq!(spec.hole, Some(0.5));
        let colors: Vec<_> = spec.points.iter().map(|p| p.color.as_deref()).collect();
        assert_eq!(colors, vec![Some("blue"), Some("hotpink"), Some("grey")]);
    }

    #[test]
    fn failure_bars_fix_axis_and_format_labels() {
        let spec = build(&summary(ViewKind::FailureBySubject, &[("Fisica", 100.0 / 3.0)]), 15);
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.y_range, Some((0.0, 100.0)));
        assert_eq!(spec.color_scale.as_deref(), Some("Reds"));
        assert_eq!(spec.title, "Top 15 Failure Rate by ASIGNATURA");
        assert_eq!(spec.points[0].label, "33.33%");
        assert!(spec.points[0].color.is_none());
    }

    #[test]
    fn failure_title_follows_configured_limit() {
        let spec = build(&summary(ViewKind::FailureByInstructor, &[("Soto", 10.0)]), 10);
        assert_eq!(spec.title, "Top 10 Failure Rate by DOCENTE");
        assert_eq!(title(ViewKind::ByProgram, 10), "Enrollment by PE");
    }

    #[test]
    fn generation_is_a_line_chart() {
        let spec = build(&summary(ViewKind::ByGeneration, &[("2019", 4.0), ("2020", 8.0)]), 15);
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.y_label, "Student Count");
        let text = render_text(&spec);
        assert!(text.starts_with("Enrollment by Generation"));
        assert!(text.contains(&"#".repeat(30)));
    }

    #[test]
    fn present_shows_errors_as_plain_text() {
        let missing: Result<SummaryResult> = Err(crate::error::DashboardError::MissingColumn {
            column: "PE".to_string(),
        });
        assert_eq!(present(&missing, OutputFormat::Json, 15), "Missing column PE\n");

        let ok = Ok(summary(ViewKind::ByProgram, &[("ISC", 3.0)]));
        let json: serde_json::Value =
            serde_json::from_str(&present(&ok, OutputFormat::Json, 15)).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["points"][0]["label"], "3");
    }
}
