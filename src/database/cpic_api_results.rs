
use serde::Deserialize;

// CPIC API quickstart: https://github.com/cpicpgx/cpic-data/wiki
// Useful postgrest reference: https://postgrest.org/en/v7.0.0/api.html#horizontal-filtering-rows

/// One entry of a CPIC recommendation response, we only parse the elements we need
#[derive(Debug, Deserialize)]
pub struct CpicRecommendationResult {
    /// The free-text dosing recommendation
    #[serde(alias = "drugrecommendation")]
    pub drug_recommendation: String,
    /// The drug this recommendation applies to
    pub drug: Option<CpicDrugReference>,
    /// The guideline this recommendation comes from
    pub guideline: Option<CpicGuidelineReference>
}

/// Nested drug reference from the "select=drug(name)" projection
#[derive(Debug, Deserialize)]
pub struct CpicDrugReference {
    pub name: String
}

/// Nested guideline reference from the "select=guideline(name)" projection
#[derive(Debug, Deserialize)]
pub struct CpicGuidelineReference {
    pub name: String
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recommendation_response() {
        // trimmed down from a real CPIC response
        let raw = r#"[
            {
                "drug": {"name": "tamoxifen"},
                "guideline": {"name": "CPIC Guideline for tamoxifen and CYP2D6"},
                "drugrecommendation": "Consider hormonal therapy without tamoxifen.",
                "implications": {"CYP2D6": "Lower endoxifen concentrations"}
            }
        ]"#;
        let results: Vec<CpicRecommendationResult> = serde_json::from_str(raw).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].drug_recommendation, "Consider hormonal therapy without tamoxifen.");
        assert_eq!(results[0].drug.as_ref().unwrap().name, "tamoxifen");
        assert_eq!(results[0].guideline.as_ref().unwrap().name, "CPIC Guideline for tamoxifen and CYP2D6");
    }

    #[test]
    fn test_parse_empty_response() {
        let results: Vec<CpicRecommendationResult> = serde_json::from_str("[]").unwrap();
        assert!(results.is_empty());
    }
}
