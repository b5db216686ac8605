
use log::{debug, info, warn};
use simple_error::bail;

use crate::data_types::report_json::{GenePhenotypeDetails, PatientDetails, PhenoReportJson, ReportMetadata};
use crate::database::diplotype_table::Cyp2d6PhenotypeTable;
use crate::database::recommendation::{RecommendationLookup, static_guideline_recommendation};
use crate::database::variant_panel::VariantPanel;
use crate::loader::CallTable;
use crate::pipeline::classifier::classify_phenotype;
use crate::pipeline::decomposer::{decompose_patient, parse_assay_keys};
use crate::pipeline::errors::PhenotyperError;
use crate::pipeline::resolver::resolve_diplotype;

/// Runs the full pipeline over a loaded call table and assembles the report.
/// Patients are processed independently: a failure in one patient's cells or
/// classification is recorded as an annotation on that patient and processing
/// continues with the next one. Recommendation lookups are best-effort.
/// # Arguments
/// * `call_table` - the loaded per-patient assay calls
/// * `variant_panel` - the variant-to-allele reference table
/// * `phenotype_table` - the CYP2D6 diplotype→phenotype reference table
/// * `recommender` - the external guideline lookup, None when running offline
/// # Errors
/// * if no assay column is usable at all
/// * if report assembly detects a duplicate patient or gene (indicates a bug upstream)
pub fn generate_phenotype_report(
    call_table: &CallTable,
    variant_panel: &VariantPanel,
    phenotype_table: &Cyp2d6PhenotypeTable,
    recommender: Option<&dyn RecommendationLookup>
) -> Result<PhenoReportJson, Box<dyn std::error::Error>> {
    let report_metadata = ReportMetadata::new(phenotype_table, variant_panel);
    let mut report = PhenoReportJson::new(report_metadata);

    // resolve the assay columns once, each bad column is reported individually
    let (assay_keys, column_errors) = parse_assay_keys(call_table.assay_ids(), variant_panel);
    for column_error in column_errors.iter() {
        warn!("Ignoring assay column: {column_error}");
        report.add_column_error(column_error.to_string());
    }
    if assay_keys.is_empty() {
        bail!("No usable assay columns were found in the call table.");
    }

    for (patient_id, calls) in call_table.patients().iter() {
        info!("Processing patient {patient_id}...");
        let mut patient_details = PatientDetails::default();

        match decompose_patient(calls, &assay_keys, variant_panel) {
            Ok(mut decomposed) => {
                let gene_list: Vec<String> = decomposed.gene_tuples().keys().cloned().collect();
                for gene in gene_list.iter() {
                    // resolve and classify; classification failures only cost this gene
                    let diplotype = resolve_diplotype(gene, &decomposed.gene_tuples()[gene.as_str()]);
                    debug!("{patient_id} {gene}: resolved diplotype {}", diplotype.diplotype());

                    match classify_phenotype(gene, diplotype, phenotype_table) {
                        Ok(record) => {
                            let assay_details = decomposed.take_assay_details(gene);
                            let mut gene_details = GenePhenotypeDetails::new(record, assay_details);
                            attach_recommendations(patient_id, gene, &mut gene_details, &mut patient_details, recommender);
                            patient_details.insert(gene.clone(), gene_details)?;
                        },
                        Err(e) => {
                            warn!("{patient_id} {gene}: {e}");
                            patient_details.add_error(e.to_string());
                        }
                    };
                }
            },
            Err(e) => {
                // decomposition errors abort this patient, the rest of the batch continues
                warn!("Aborting patient {patient_id}: {e}");
                patient_details.add_error(e.to_string());
            }
        };

        report.insert(patient_id.clone(), patient_details)?;
    }

    Ok(report)
}

/// Attaches the static guideline text and the external lookup result to a gene record.
/// External failures downgrade to a patient annotation, the record itself survives.
fn attach_recommendations(
    patient_id: &str,
    gene: &str,
    gene_details: &mut GenePhenotypeDetails,
    patient_details: &mut PatientDetails,
    recommender: Option<&dyn RecommendationLookup>
) {
    if let Some(text) = static_guideline_recommendation(gene, gene_details.phenotype_record()) {
        gene_details.set_guideline_recommendation(text.to_string());
    }

    let recommender = match recommender {
        Some(recommender) => recommender,
        None => return
    };

    let lookup_value = gene_details.phenotype_record().score_label().to_string();
    match recommender.lookup(gene, &lookup_value) {
        Ok(Some(recommendation)) => gene_details.set_cpic_recommendation(recommendation),
        Ok(None) => debug!("{patient_id} {gene}: no external recommendation for key {lookup_value:?}"),
        Err(e) => {
            let annotation = PhenotyperError::ExternalLookup {
                gene: gene.to_string(),
                lookup_value,
                reason: e.to_string()
            };
            warn!("{patient_id}: {annotation}");
            patient_details.add_error(annotation.to_string());
        }
    };
}
