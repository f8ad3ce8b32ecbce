use crate::error::{DashboardError, Result};
use crate::models::{ViewKind, GRADE_COLUMN, STUDENT_COLUMN};
use crate::table::Table;

/// Column positions resolved for one view, ready for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub group: usize,
    /// Student identifier for distinct counts, or the grade for failure rates.
    pub measure: usize,
}

pub fn required_columns(view: ViewKind) -> [&'static str; 2] {
    let measure = if view.is_failure_rate() {
        GRADE_COLUMN
    } else {
        STUDENT_COLUMN
    };
    [view.group_column(), measure]
}

pub fn missing_columns(table: &Table, view: ViewKind) -> Vec<&'static str> {
    required_columns(view)
        .into_iter()
        .filter(|column| !table.has_column(column))
        .collect()
}

pub fn resolve(table: &Table, view: ViewKind) -> Result<ResolvedColumns> {
    let [group, measure] = required_columns(view);
    let lookup = |column: &str| {
        table
            .column_index(column)
            .ok_or_else(|| DashboardError::MissingColumn {
                column: column.to_string(),
            })
    };

    Ok(ResolvedColumns {
        group: lookup(group)?,
        measure: lookup(measure)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_views_need_grades_and_count_views_need_students() {
        assert_eq!(required_columns(ViewKind::ByProgram), ["PE", "ALUCTR"]);
        assert_eq!(
            required_columns(ViewKind::FailureByInstructor),
            ["DOCENTE", "KARCAL"]
        );
    }

    #[test]
    fn reports_the_group_column_first() {
        let table = Table::from_text_rows(&["GENERACION"], &[vec!["2020"]]);
        assert_eq!(missing_columns(&table, ViewKind::ByProgram), vec!["PE", "ALUCTR"]);

        match resolve(&table, ViewKind::ByProgram) {
            Err(DashboardError::MissingColumn { column }) => assert_eq!(column, "PE"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn resolves_positions() {
        let table = Table::from_text_rows(&["ALUCTR", "ALUSEX"], &[vec!["1", "H"]]);
        let resolved = resolve(&table, ViewKind::ByGender).unwrap();
        assert_eq!(resolved, ResolvedColumns { group: 1, measure: 0 });
    }
}
