use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub const COHORT_COLUMN: &str = "GENERACION";
pub const GENDER_COLUMN: &str = "ALUSEX";
pub const PROGRAM_COLUMN: &str = "PE";
pub const HIGH_SCHOOL_COLUMN: &str = "PREPARATORIA";
pub const SUBJECT_COLUMN: &str = "ASIGNATURA";
pub const INSTRUCTOR_COLUMN: &str = "DOCENTE";
pub const STUDENT_COLUMN: &str = "ALUCTR";
pub const GRADE_COLUMN: &str = "KARCAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    ByGeneration,
    ByGender,
    ByProgram,
    ByHighSchool,
    FailureBySubject,
    FailureByInstructor,
}

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        ViewKind::ByGeneration,
        ViewKind::ByGender,
        ViewKind::ByProgram,
        ViewKind::ByHighSchool,
        ViewKind::FailureBySubject,
        ViewKind::FailureByInstructor,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ViewKind::ByGeneration => "generation",
            ViewKind::ByGender => "gender",
            ViewKind::ByProgram => "program",
            ViewKind::ByHighSchool => "high-school",
            ViewKind::FailureBySubject => "failure-subject",
            ViewKind::FailureByInstructor => "failure-instructor",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewKind::ByGeneration => "Generation (Line)",
            ViewKind::ByGender => "Gender (Ring)",
            ViewKind::ByProgram => "Program (PE)",
            ViewKind::ByHighSchool => "High School",
            ViewKind::FailureBySubject => "Failure by Subject",
            ViewKind::FailureByInstructor => "Failure by Instructor",
        }
    }

    /// Column whose values become the categories of the view.
    pub fn group_column(self) -> &'static str {
        match self {
            ViewKind::ByGeneration => COHORT_COLUMN,
            ViewKind::ByGender => GENDER_COLUMN,
            ViewKind::ByProgram => PROGRAM_COLUMN,
            ViewKind::ByHighSchool => HIGH_SCHOOL_COLUMN,
            ViewKind::FailureBySubject => SUBJECT_COLUMN,
            ViewKind::FailureByInstructor => INSTRUCTOR_COLUMN,
        }
    }

    pub fn is_failure_rate(self) -> bool {
        matches!(
            self,
            ViewKind::FailureBySubject | ViewKind::FailureByInstructor
        )
    }

    pub fn metric_label(self) -> &'static str {
        if self.is_failure_rate() {
            "% Failure"
        } else {
            "Student Count"
        }
    }

    pub fn value_domain(self) -> Option<(f64, f64)> {
        if self.is_failure_rate() {
            Some((0.0, 100.0))
        } else {
            None
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        ViewKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = ViewKind::ALL.iter().map(|kind| kind.slug()).collect();
                format!("unknown view '{value}' (expected one of: {})", known.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub category: String,
    pub metric: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub view: ViewKind,
    pub metric_label: String,
    pub value_domain: Option<(f64, f64)>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryResult {
    pub fn new(view: ViewKind, rows: Vec<SummaryRow>) -> Self {
        SummaryResult {
            view,
            metric_label: view.metric_label().to_string(),
            value_domain: view.value_domain(),
            rows,
        }
    }

    #[cfg(test)]
    pub(crate) fn categories(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.category.as_str()).collect()
    }

    #[cfg(test)]
    pub(crate) fn metric_for(&self, category: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.category == category)
            .map(|row| row.metric)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display text for a metric: whole counts, or rates with two decimals.
    pub fn format_metric(&self, metric: f64) -> String {
        if self.view.is_failure_rate() {
            format!("{metric:.2}%")
        } else {
            format!("{metric:.0}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip_through_from_str() {
        for kind in ViewKind::ALL {
            assert_eq!(kind.slug().parse::<ViewKind>().unwrap(), kind);
        }
        assert_eq!(" Gender ".parse::<ViewKind>().unwrap(), ViewKind::ByGender);
        assert!("pie".parse::<ViewKind>().is_err());
    }

    #[test]
    fn failure_views_carry_rate_metadata() {
        let result = SummaryResult::new(ViewKind::FailureByInstructor, Vec::new());
        assert_eq!(result.metric_label, "% Failure");
        assert_eq!(result.value_domain, Some((0.0, 100.0)));
        assert_eq!(result.format_metric(33.3333), "33.33%");

        let result = SummaryResult::new(ViewKind::ByProgram, Vec::new());
        assert_eq!(result.metric_label, "Student Count");
        assert_eq!(result.value_domain, None);
        assert_eq!(result.format_metric(12.0), "12");
    }
}
