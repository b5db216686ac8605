
use serde::{Deserialize, Serialize};
use simple_error::bail;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry::{Occupied, Vacant};

use crate::data_types::phenotype::PhenotypeRecord;
use crate::database::diplotype_table::Cyp2d6PhenotypeTable;
use crate::database::recommendation::CpicRecommendation;
use crate::database::variant_panel::VariantPanel;
use crate::pipeline::decomposer::AssayDetails;

/// Intended to be serialized to JSON as the final result
#[derive(Debug, Deserialize, Serialize)]
pub struct PhenoReportJson {
    /// Version of the tool that generated the report
    pgxpheno_version: String,
    /// Metadata about the reference tables and the run
    report_metadata: ReportMetadata,
    /// Assay columns that could not be used, one message per bad column
    column_errors: Vec<String>,
    /// Map from patient identifier to that patient's results
    patient_details: BTreeMap<String, PatientDetails>
}

impl PhenoReportJson {
    /// Basic constructor, will perform sanity checks if necessary
    pub fn new(report_metadata: ReportMetadata) -> Self {
        Self {
            pgxpheno_version: crate::cli::core::FULL_VERSION.to_string(),
            report_metadata,
            column_errors: vec![],
            patient_details: Default::default()
        }
    }

    /// Simple wrapper for our patient insertion to make sure we do not double insert
    /// # Arguments
    /// * `patient_id` - the patient the results belong to
    /// * `details` - the patient results getting saved
    pub fn insert(&mut self, patient_id: String, details: PatientDetails) -> Result<(), Box<dyn std::error::Error>> {
        match self.patient_details.entry(patient_id) {
            Vacant(entry) => entry.insert(details),
            Occupied(entry) => bail!("Entry for {} is already occupied.", entry.key())
        };
        Ok(())
    }

    pub fn add_column_error(&mut self, message: String) {
        self.column_errors.push(message);
    }

    pub fn report_metadata(&self) -> &ReportMetadata {
        &self.report_metadata
    }

    pub fn column_errors(&self) -> &[String] {
        &self.column_errors
    }

    pub fn patient_details(&self) -> &BTreeMap<String, PatientDetails> {
        &self.patient_details
    }
}

/// Contains metadata about the run and the reference tables backing it
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ReportMetadata {
    /// Where the CYP2D6 phenotype table was loaded from
    pub diplotype_table_source: String,
    /// The number of diplotype entries in the phenotype table
    pub diplotype_table_entries: usize,
    /// The number of genes on the variant panel
    pub panel_genes: usize,
    /// The time the report was generated
    pub report_time: chrono::DateTime<chrono::Utc>
}

impl ReportMetadata {
    pub fn new(phenotype_table: &Cyp2d6PhenotypeTable, variant_panel: &VariantPanel) -> ReportMetadata {
        ReportMetadata {
            diplotype_table_source: phenotype_table.source().to_string(),
            diplotype_table_entries: phenotype_table.len(),
            panel_genes: variant_panel.gene_count(),
            report_time: chrono::Utc::now()
        }
    }
}

/// All results for a single patient. A patient that failed part-way through still gets
/// an entry here: whatever genes classified successfully plus the error annotations.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PatientDetails {
    /// Map from gene name to the classified result
    gene_details: BTreeMap<String, GenePhenotypeDetails>,
    /// Errors encountered for this patient; scoped to a cell, a gene, or a lookup
    analysis_errors: Vec<String>
}

impl PatientDetails {
    /// Simple wrapper for our gene insertion to make sure we do not double insert
    /// # Arguments
    /// * `gene` - the gene name we are saving the result for
    /// * `details` - the classified result getting saved
    pub fn insert(&mut self, gene: String, details: GenePhenotypeDetails) -> Result<(), Box<dyn std::error::Error>> {
        match self.gene_details.entry(gene) {
            Vacant(entry) => entry.insert(details),
            Occupied(entry) => bail!("Entry for {} is already occupied.", entry.key())
        };
        Ok(())
    }

    pub fn add_error(&mut self, message: String) {
        self.analysis_errors.push(message);
    }

    pub fn gene_details(&self) -> &BTreeMap<String, GenePhenotypeDetails> {
        &self.gene_details
    }

    pub fn analysis_errors(&self) -> &[String] {
        &self.analysis_errors
    }
}

/// The full result for one patient/gene pair: the classified phenotype, the dosing
/// recommendations, and the per-assay evidence it was derived from
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GenePhenotypeDetails {
    /// The classified phenotype record
    phenotype_record: PhenotypeRecord,
    /// The hardcoded guideline recommendation, when the gene has static rules
    guideline_recommendation: Option<String>,
    /// The recommendation fetched from the external guideline service, when available
    cpic_recommendation: Option<CpicRecommendation>,
    /// The per-assay evidence that produced the diplotype
    assay_details: Vec<AssayDetails>
}

impl GenePhenotypeDetails {
    pub fn new(phenotype_record: PhenotypeRecord, assay_details: Vec<AssayDetails>) -> GenePhenotypeDetails {
        GenePhenotypeDetails {
            phenotype_record,
            guideline_recommendation: None,
            cpic_recommendation: None,
            assay_details
        }
    }

    pub fn set_guideline_recommendation(&mut self, recommendation: String) {
        self.guideline_recommendation = Some(recommendation);
    }

    pub fn set_cpic_recommendation(&mut self, recommendation: CpicRecommendation) {
        self.cpic_recommendation = Some(recommendation);
    }

    pub fn phenotype_record(&self) -> &PhenotypeRecord {
        &self.phenotype_record
    }

    pub fn guideline_recommendation(&self) -> Option<&str> {
        self.guideline_recommendation.as_deref()
    }

    pub fn cpic_recommendation(&self) -> Option<&CpicRecommendation> {
        self.cpic_recommendation.as_ref()
    }

    pub fn assay_details(&self) -> &[AssayDetails] {
        &self.assay_details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data_types::pgx_diplotype::Diplotype;
    use crate::data_types::phenotype::Metabolizer;

    fn test_details() -> GenePhenotypeDetails {
        let record = PhenotypeRecord::from_metabolizer(Diplotype::new("*1", "_2A"), Metabolizer::Intermediate);
        GenePhenotypeDetails::new(record, vec![])
    }

    #[test]
    fn test_pheno_report_json() {
        let mut report = PhenoReportJson::new(Default::default());
        let mut patient = PatientDetails::default();
        patient.insert("DPYD".to_string(), test_details()).unwrap();
        report.insert("DPD900".to_string(), patient.clone()).unwrap();

        let map = report.patient_details();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("DPD900").unwrap(), &patient);
    }

    #[test]
    #[should_panic]
    fn test_duplicate_patient() {
        let mut report = PhenoReportJson::new(Default::default());
        report.insert("DPD900".to_string(), Default::default()).unwrap();
        report.insert("DPD900".to_string(), Default::default()).unwrap();
    }

    #[test]
    #[should_panic]
    fn test_duplicate_gene() {
        let mut patient = PatientDetails::default();
        patient.insert("DPYD".to_string(), test_details()).unwrap();
        patient.insert("DPYD".to_string(), test_details()).unwrap();
    }

    #[test]
    fn test_error_annotations() {
        let mut patient = PatientDetails::default();
        patient.add_error("something went sideways".to_string());
        assert_eq!(patient.analysis_errors(), &["something went sideways".to_string()]);
        assert!(patient.gene_details().is_empty());
    }
}
