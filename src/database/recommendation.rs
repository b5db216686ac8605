
use log::debug;
use serde::{Deserialize, Serialize};
use simple_error::bail;
use std::collections::BTreeMap;

use crate::data_types::phenotype::PhenotypeRecord;
use crate::database::cpic_api_results::CpicRecommendationResult;
use crate::database::variant_panel::{CYP2D6, DPYD, UGT1A1};

/// Base URL for the CPIC recommendation endpoint
const CPIC_RECOMMENDATION_URL: &str = "https://api.cpicpgx.org/v1/recommendation";
/// PostgREST projection pulling the drug and guideline names alongside the full row
const CPIC_SELECT: &str = "drug(name),guideline(name),*";
/// Timeout for CPIC queries; failures are recoverable, so we would rather fail fast
const CPIC_TIMEOUT_SEC: u64 = 30;

// DPYD fluoropyrimidine guidance, keyed off the activity score
const DPYD_NORMAL_TEXT: &str = "Based on genotype, there is no indication to change dose or therapy. Use label-recommended dosage and administration.";
const DPYD_REDUCE_TEXT: &str = "Reduce starting dose by 50% followed by titration of dose based on toxicity or therapeutic drug monitoring (if available). Patients with the c.[2846A>T];[2846A>T] genotype may require >50% reduction in starting dose.";
const DPYD_STRONG_REDUCE_TEXT: &str = "Avoid use of 5- fluorouracil or 5-fluorouracil prodrug-based regimens. In the event, based on clinical advice, alternative agents are not considered a suitable therapeutic option, 5-fluorouracil should be administered at a strongly reduced dose with early therapeutic drug monitoring.";
const DPYD_AVOID_TEXT: &str = "Avoid use of 5-fluorouracil or 5-fluorouracil prodrug-based regimens.";

// UGT1A1 irinotecan guidance, keyed off the diplotype label
const UGT1A1_NORMAL_TEXT: &str = "The guideline does not provide a recommendation for irinotecan in normal metabolizers.";
const UGT1A1_HET_TEXT: &str = "NO action is needed for this gene-drug interaction.";
const UGT1A1_HOM_TEXT: &str = "Start with 70% of the normal dose If the patient tolerates this initial dose, the dose can be increased, guided by the neutrophil count.";

/// A dosing recommendation returned by the external guideline service
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CpicRecommendation {
    /// The drug the recommendation applies to, when the service reports it
    drug_name: Option<String>,
    /// The guideline the recommendation comes from, when the service reports it
    guideline_name: Option<String>,
    /// The free-text dosing recommendation
    recommendation: String
}

impl CpicRecommendation {
    pub fn new(drug_name: Option<String>, guideline_name: Option<String>, recommendation: String) -> CpicRecommendation {
        CpicRecommendation {
            drug_name,
            guideline_name,
            recommendation
        }
    }

    pub fn drug_name(&self) -> Option<&str> {
        self.drug_name.as_deref()
    }

    pub fn guideline_name(&self) -> Option<&str> {
        self.guideline_name.as_deref()
    }

    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }
}

/// The abstract capability the pipeline depends on: given a gene and the lookup value
/// derived from a phenotype record, fetch a recommendation if one exists. HTTP/JSON
/// specifics live entirely behind this seam.
pub trait RecommendationLookup {
    /// Returns the first matching recommendation, or None when the service has no match.
    /// # Arguments
    /// * `gene` - the gene symbol, e.g. "CYP2D6"
    /// * `lookup_value` - the published score or phenotype string for the lookup key
    /// # Errors
    /// * if the service is unreachable or returns an unparseable response
    fn lookup(&self, gene: &str, lookup_value: &str) -> Result<Option<CpicRecommendation>, Box<dyn std::error::Error>>;
}

/// Returns the hardcoded guideline recommendation for genes with static rules.
/// DPYD is keyed off the activity score, UGT1A1 off the diplotype label; CYP2D6
/// has no static rule and always defers to the external service.
pub fn static_guideline_recommendation(gene: &str, record: &PhenotypeRecord) -> Option<&'static str> {
    match gene {
        DPYD => {
            let score = record.activity_score();
            if score >= 2.0 {
                Some(DPYD_NORMAL_TEXT)
            } else if score >= 1.0 {
                Some(DPYD_REDUCE_TEXT)
            } else if score >= 0.5 {
                Some(DPYD_STRONG_REDUCE_TEXT)
            } else {
                Some(DPYD_AVOID_TEXT)
            }
        },
        UGT1A1 => {
            match record.diplotype().wild_type_count() {
                2 => Some(UGT1A1_NORMAL_TEXT),
                1 => Some(UGT1A1_HET_TEXT),
                _ => Some(UGT1A1_HOM_TEXT)
            }
        },
        _ => None
    }
}

/// Blocking client for the CPIC recommendation endpoint
pub struct CpicRecommendationClient {
    /// The underlying blocking HTTP client
    client: reqwest::blocking::Client,
    /// The recommendation endpoint, configurable for testing
    base_url: String,
    /// Map from gene symbol to the RxNorm drug identifier queried for that gene
    drug_ids: BTreeMap<String, String>
}

impl CpicRecommendationClient {
    /// Creates a client with the default endpoint and the panel's drug identifiers:
    /// tamoxifen for CYP2D6, fluoropyrimidines for DPYD and UGT1A1.
    /// # Errors
    /// * if the underlying HTTP client cannot be constructed
    pub fn new() -> Result<CpicRecommendationClient, Box<dyn std::error::Error>> {
        Self::with_default_drugs(CPIC_RECOMMENDATION_URL.to_string())
    }

    /// Creates a client with the panel's drug identifiers but a custom endpoint
    pub fn with_default_drugs(base_url: String) -> Result<CpicRecommendationClient, Box<dyn std::error::Error>> {
        let drug_ids: BTreeMap<String, String> = [
            (CYP2D6, "RxNorm:10324"),
            (DPYD, "RxNorm:51499"),
            (UGT1A1, "RxNorm:51499")
        ].into_iter()
            .map(|(gene, drug_id)| (gene.to_string(), drug_id.to_string()))
            .collect();
        Self::with_endpoint(base_url, drug_ids)
    }

    /// Full constructor for a custom endpoint and drug set
    pub fn with_endpoint(base_url: String, drug_ids: BTreeMap<String, String>) -> Result<CpicRecommendationClient, Box<dyn std::error::Error>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(CPIC_TIMEOUT_SEC))
            .build()?;
        Ok(CpicRecommendationClient {
            client,
            base_url,
            drug_ids
        })
    }
}

impl RecommendationLookup for CpicRecommendationClient {
    fn lookup(&self, gene: &str, lookup_value: &str) -> Result<Option<CpicRecommendation>, Box<dyn std::error::Error>> {
        let drug_id = match self.drug_ids.get(gene) {
            Some(drug_id) => drug_id,
            // no drug configured for this gene, nothing to look up
            None => return Ok(None)
        };

        // the lookup key is a PostgREST "contains" filter on a one-entry JSON object
        let lookup_key = serde_json::json!({ gene: lookup_value }).to_string();
        let query: Vec<(&str, String)> = vec![
            ("select", CPIC_SELECT.to_string()),
            ("drugid", format!("eq.{drug_id}")),
            ("lookupkey", format!("cs.{lookup_key}"))
        ];

        debug!("Querying CPIC recommendation for {gene} with key {lookup_key}");
        let response = self.client.get(&self.base_url)
            .query(&query)
            .send()?;
        if !response.status().is_success() {
            bail!("CPIC recommendation query returned status {}", response.status());
        }

        let raw_text = response.text()?;
        let results: Vec<CpicRecommendationResult> = serde_json::from_str(&raw_text)?;
        Ok(results.into_iter()
            .next()
            .map(|r| CpicRecommendation {
                drug_name: r.drug.map(|d| d.name),
                guideline_name: r.guideline.map(|g| g.name),
                recommendation: r.drug_recommendation
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data_types::pgx_diplotype::Diplotype;
    use crate::data_types::phenotype::Metabolizer;

    fn trinary_record(hap1: &str, hap2: &str, metabolizer: Metabolizer) -> PhenotypeRecord {
        PhenotypeRecord::from_metabolizer(Diplotype::new(hap1, hap2), metabolizer)
    }

    #[test]
    fn test_dpyd_static_rules() {
        let record = trinary_record("*1", "*1", Metabolizer::Normal);
        assert_eq!(static_guideline_recommendation(DPYD, &record), Some(DPYD_NORMAL_TEXT));

        let record = trinary_record("*1", "_2A", Metabolizer::Intermediate);
        assert_eq!(static_guideline_recommendation(DPYD, &record), Some(DPYD_REDUCE_TEXT));

        let record = trinary_record("_2A", "_13", Metabolizer::Poor);
        assert_eq!(static_guideline_recommendation(DPYD, &record), Some(DPYD_AVOID_TEXT));

        // the 0.5 band is only reachable via half-activity alleles, exercised directly
        let record = PhenotypeRecord::new(Diplotype::new("*1", "_2A"), 0.5, "0.5".to_string(), Metabolizer::Intermediate.to_string());
        assert_eq!(static_guideline_recommendation(DPYD, &record), Some(DPYD_STRONG_REDUCE_TEXT));
    }

    #[test]
    fn test_ugt1a1_static_rules() {
        let record = trinary_record("*1", "*1", Metabolizer::Normal);
        assert_eq!(static_guideline_recommendation(UGT1A1, &record), Some(UGT1A1_NORMAL_TEXT));

        let record = trinary_record("*1", "*28", Metabolizer::Intermediate);
        assert_eq!(static_guideline_recommendation(UGT1A1, &record), Some(UGT1A1_HET_TEXT));

        // orientation does not matter for the heterozygote
        let record = trinary_record("*28", "*1", Metabolizer::Intermediate);
        assert_eq!(static_guideline_recommendation(UGT1A1, &record), Some(UGT1A1_HET_TEXT));

        let record = trinary_record("*28", "*28", Metabolizer::Poor);
        assert_eq!(static_guideline_recommendation(UGT1A1, &record), Some(UGT1A1_HOM_TEXT));
    }

    #[test]
    fn test_cyp2d6_has_no_static_rule() {
        let record = PhenotypeRecord::new(Diplotype::new("*1", "*4"), 1.0, "1.0".to_string(), "Intermediate Metabolizer".to_string());
        assert_eq!(static_guideline_recommendation(CYP2D6, &record), None);
    }

    #[test]
    fn test_client_skips_unconfigured_gene() {
        let client = CpicRecommendationClient::with_endpoint(
            "http://localhost:9".to_string(), Default::default()
        ).unwrap();
        // no drug id configured, so no network traffic happens and we get None
        let result = client.lookup("CYP2C19", "2.0").unwrap();
        assert!(result.is_none());
    }
}
