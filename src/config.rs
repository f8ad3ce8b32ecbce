use serde::Serialize;

pub const PASSING_GRADE: f64 = 70.0;
pub const TOP_N: usize = 15;
pub const DEFAULT_DATA_FILE: &str = "bd_dash.xlsx";
pub const SAMPLE_DATA_FILE: &str = "bd_dash.csv";

/// How gender labels are grouped. Source files mix abbreviations and full words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GenderLabels {
    /// Labels pass through untouched, so `H` and `Hombre` are separate categories.
    #[default]
    AsRecorded,
    /// Folds known spellings into `H` and `M`.
    Canonical,
}

impl GenderLabels {
    pub fn apply(self, label: String) -> String {
        match self {
            GenderLabels::AsRecorded => label,
            GenderLabels::Canonical => match label.trim().to_uppercase().as_str() {
                "H" | "HOMBRE" | "MASCULINO" => "H".to_string(),
                "M" | "F" | "MUJER" | "FEMENINO" => "M".to_string(),
                _ => label,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationConfig {
    pub passing_grade: f64,
    pub top_n: usize,
    pub gender_labels: GenderLabels,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        AggregationConfig {
            passing_grade: PASSING_GRADE,
            top_n: TOP_N,
            gender_labels: GenderLabels::AsRecorded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_gender_folds_known_spellings() {
        let canonical = GenderLabels::Canonical;
        assert_eq!(canonical.apply("Hombre".to_string()), "H");
        assert_eq!(canonical.apply("f".to_string()), "M");
        assert_eq!(canonical.apply("X".to_string()), "X");
        assert_eq!(GenderLabels::AsRecorded.apply("Mujer".to_string()), "Mujer");
    }
}
