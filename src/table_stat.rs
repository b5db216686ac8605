
use itertools::Itertools;
use std::collections::BTreeMap;

use crate::data_types::report_json::PhenoReportJson;

/// Prints the statistics for a generated phenotype report
/// # Arguments
/// * `report` - the report to print the statistics for
pub fn print_stats(report: &PhenoReportJson) {
    // display the report metadata
    let metadata = report.report_metadata();
    println!("Report metadata:");
    println!("\tDiplotype table source: {}", metadata.diplotype_table_source);
    println!("\tDiplotype table entries: {}", metadata.diplotype_table_entries);
    println!("\tPanel genes: {}", metadata.panel_genes);
    println!("\tReport time: {}", metadata.report_time);

    // display the patient-level statistics
    let patient_details = report.patient_details();
    let annotated_patients = patient_details.values()
        .filter(|p| !p.analysis_errors().is_empty())
        .count();
    println!("Patient statistics:");
    println!("\tTotal patients: {}", patient_details.len());
    println!("\tPatients with annotations: {annotated_patients}");
    println!("\tUnusable assay columns: {}", report.column_errors().len());

    // phenotype distribution per gene across the whole batch
    let phenotype_counts: BTreeMap<(&str, &str), usize> = patient_details.values()
        .flat_map(|p| p.gene_details().iter())
        .map(|(gene, details)| (gene.as_str(), details.phenotype_record().phenotype()))
        .counts()
        .into_iter()
        .collect();

    println!("Phenotype distribution:");
    println!("gene\tphenotype\tcount");
    for ((gene, phenotype), count) in phenotype_counts.iter() {
        println!("{gene}\t{phenotype}\t{count}");
    }

    // per-patient breakdown, but only if we have elevated verbosity
    if log::log_enabled!(log::Level::Debug) {
        println!();
        println!("Patient breakdown:");
        println!("patient\tgene\tdiplotype\tphenotype\tscore");
        for (patient_id, patient) in patient_details.iter() {
            for (gene, details) in patient.gene_details().iter() {
                let record = details.phenotype_record();
                println!("{patient_id}\t{gene}\t{}\t{}\t{}",
                    record.diplotype().diplotype(), record.phenotype(), record.score_label());
            }
            for annotation in patient.analysis_errors().iter() {
                println!("{patient_id}\t-\t-\t-\t{annotation}");
            }
        }
        println!();
    }
}
