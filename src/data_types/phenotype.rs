
use serde::{Deserialize, Serialize};

use crate::data_types::pgx_diplotype::Diplotype;

/// The trinary metabolizer classes used for the non-lookup genes (DPYD, UGT1A1).
/// Score convention follows the CPIC activity scale: 2.0 / 1.0 / 0.0.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::Display, strum_macros::EnumString)]
pub enum Metabolizer {
    #[strum(serialize = "Normal Metabolizer")]
    Normal,
    #[strum(serialize = "Intermediate Metabolizer")]
    Intermediate,
    #[strum(serialize = "Poor Metabolizer")]
    Poor
}

impl Metabolizer {
    /// The activity score associated with this metabolizer class
    pub fn activity_score(&self) -> f64 {
        match self {
            Metabolizer::Normal => 2.0,
            Metabolizer::Intermediate => 1.0,
            Metabolizer::Poor => 0.0
        }
    }
}

/// The fully classified result for one patient/gene pair
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PhenotypeRecord {
    /// The definitive diplotype the classification was derived from
    diplotype: Diplotype,
    /// The numeric activity/function score
    activity_score: f64,
    /// The score exactly as published, used as the guideline lookup value.
    /// This is kept separate because the numeric form loses trailing-zero formatting.
    score_label: String,
    /// The phenotype label, e.g. "Intermediate Metabolizer"
    phenotype: String
}

impl PhenotypeRecord {
    pub fn new(diplotype: Diplotype, activity_score: f64, score_label: String, phenotype: String) -> PhenotypeRecord {
        PhenotypeRecord {
            diplotype,
            activity_score,
            score_label,
            phenotype
        }
    }

    /// Builds a record from one of the trinary metabolizer classes
    pub fn from_metabolizer(diplotype: Diplotype, metabolizer: Metabolizer) -> PhenotypeRecord {
        let activity_score = metabolizer.activity_score();
        PhenotypeRecord {
            diplotype,
            activity_score,
            score_label: format!("{activity_score:.1}"),
            phenotype: metabolizer.to_string()
        }
    }

    pub fn diplotype(&self) -> &Diplotype {
        &self.diplotype
    }

    pub fn activity_score(&self) -> f64 {
        self.activity_score
    }

    pub fn score_label(&self) -> &str {
        &self.score_label
    }

    pub fn phenotype(&self) -> &str {
        &self.phenotype
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::str::FromStr;

    #[test]
    fn test_metabolizer_labels() {
        assert_eq!(Metabolizer::Normal.to_string(), "Normal Metabolizer");
        assert_eq!(Metabolizer::Intermediate.to_string(), "Intermediate Metabolizer");
        assert_eq!(Metabolizer::Poor.to_string(), "Poor Metabolizer");
        assert_eq!(Metabolizer::from_str("Poor Metabolizer").unwrap(), Metabolizer::Poor);
    }

    #[test]
    fn test_from_metabolizer() {
        let record = PhenotypeRecord::from_metabolizer(Diplotype::new("*1", "_2A"), Metabolizer::Intermediate);
        assert_approx_eq!(record.activity_score(), 1.0);
        assert_eq!(record.score_label(), "1.0");
        assert_eq!(record.phenotype(), "Intermediate Metabolizer");
        assert_eq!(record.diplotype().diplotype(), "*1/_2A");
    }
}
