use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::columns;
use crate::config::AggregationConfig;
use crate::error::Result;
use crate::models::{SummaryResult, SummaryRow, ViewKind};
use crate::table::Table;

pub fn summarize(table: &Table, view: ViewKind) -> Result<SummaryResult> {
    summarize_with(table, view, &AggregationConfig::default())
}

pub fn summarize_with(
    table: &Table,
    view: ViewKind,
    config: &AggregationConfig,
) -> Result<SummaryResult> {
    let resolved = columns::resolve(table, view)?;

    let rows = match view {
        ViewKind::ByGeneration => {
            let mut rows = distinct_rows(table, resolved.group, resolved.measure, |label| label);
            rows.sort_by(|a, b| cohort_order(&a.category, &b.category));
            rows
        }
        ViewKind::ByGender => {
            let labels = config.gender_labels;
            distinct_rows(table, resolved.group, resolved.measure, |label| {
                labels.apply(label)
            })
        }
        ViewKind::ByProgram | ViewKind::ByHighSchool => {
            let rows = distinct_rows(table, resolved.group, resolved.measure, |label| label);
            top_n_by_metric(rows, config.top_n)
        }
        ViewKind::FailureBySubject | ViewKind::FailureByInstructor => {
            let rows = failure_counts_by_group(
                table,
                resolved.group,
                resolved.measure,
                config.passing_grade,
            )
            .into_iter()
            .map(|counts| SummaryRow {
                category: counts.category,
                metric: safe_rate(counts.failed, counts.graded) * 100.0,
            })
            .collect();
            top_n_by_metric(rows, config.top_n)
        }
    };

    debug!(view = %view, groups = rows.len(), "summarized view");
    Ok(SummaryResult::new(view, rows))
}

fn distinct_rows(
    table: &Table,
    group: usize,
    identity: usize,
    relabel: impl Fn(String) -> String,
) -> Vec<SummaryRow> {
    distinct_count_by_group(table, group, identity, relabel)
        .into_iter()
        .map(|(category, count)| SummaryRow {
            category,
            metric: count as f64,
        })
        .collect()
}

/// Unique identity values per group, groups in first-encountered order.
/// Rows with a null group are skipped; rows with a null identity add nothing.
pub fn distinct_count_by_group(
    table: &Table,
    group: usize,
    identity: usize,
    relabel: impl Fn(String) -> String,
) -> Vec<(String, usize)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, HashSet<String>)> = Vec::new();

    for row in table.rows() {
        let Some(label) = row[group].label() else {
            continue;
        };
        let label = relabel(label);
        let slot = *positions.entry(label.clone()).or_insert_with(|| {
            groups.push((label, HashSet::new()));
            groups.len() - 1
        });
        if let Some(id) = row[identity].label() {
            groups[slot].1.insert(id);
        }
    }

    groups
        .into_iter()
        .map(|(label, ids)| (label, ids.len()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureCounts {
    pub category: String,
    pub failed: usize,
    pub graded: usize,
}

/// Per group: rows with a usable grade, and how many of those fall below `passing_grade`.
pub fn failure_counts_by_group(
    table: &Table,
    group: usize,
    grade: usize,
    passing_grade: f64,
) -> Vec<FailureCounts> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<FailureCounts> = Vec::new();

    for row in table.rows() {
        let Some(label) = row[group].label() else {
            continue;
        };
        let slot = *positions.entry(label.clone()).or_insert_with(|| {
            groups.push(FailureCounts {
                category: label,
                failed: 0,
                graded: 0,
            });
            groups.len() - 1
        });
        if let Some(value) = row[grade].as_grade() {
            groups[slot].graded += 1;
            if value < passing_grade {
                groups[slot].failed += 1;
            }
        }
    }

    groups
}

pub fn safe_rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Stable descending sort by metric, then keep the first `n`.
pub fn top_n_by_metric(mut rows: Vec<SummaryRow>, n: usize) -> Vec<SummaryRow> {
    rows.sort_by(|a, b| b.metric.total_cmp(&a.metric));
    rows.truncate(n);
    rows
}

/// Numeric cohorts ascend numerically and come before textual ones.
fn cohort_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
