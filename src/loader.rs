
use log::debug;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry::{Occupied, Vacant};
use std::path::Path;

use crate::data_types::raw_call::RawCall;
use crate::pipeline::errors::PhenotyperError;

/// The required header of the patient identifier column
pub const SAMPLE_ASSAY_HEADER: &str = "Sample/Assay";

/// The parsed call table: per-patient raw calls plus the assay column order.
/// Genotype strings are passed through unchanged, semantic validation happens downstream.
#[derive(Clone, Debug)]
pub struct CallTable {
    /// The assay column headers in file order
    assay_ids: Vec<String>,
    /// Map from patient identifier to that patient's raw calls, one per assay column
    patients: BTreeMap<String, Vec<RawCall>>
}

impl CallTable {
    pub fn assay_ids(&self) -> &[String] {
        &self.assay_ids
    }

    pub fn patients(&self) -> &BTreeMap<String, Vec<RawCall>> {
        &self.patients
    }

    pub fn patient_count(&self) -> usize {
        self.patients.len()
    }
}

/// Loads the semicolon-delimited per-patient call table.
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * `MalformedTable` if the identifier column is missing, a row has a column-count
///   mismatch, a patient identifier repeats, or the underlying parse fails
pub fn load_call_table(filename: &Path) -> Result<CallTable, PhenotyperError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_path(filename)?;

    // the first column must be the patient identifier
    let headers = csv_reader.headers()?.clone();
    match headers.get(0) {
        Some(SAMPLE_ASSAY_HEADER) => {},
        _ => {
            return Err(PhenotyperError::MalformedTable {
                reason: format!("first column must be {SAMPLE_ASSAY_HEADER:?}")
            });
        }
    };
    let assay_ids: Vec<String> = headers.iter()
        .skip(1)
        .map(|h| h.to_string())
        .collect();

    let mut patients: BTreeMap<String, Vec<RawCall>> = Default::default();
    for result in csv_reader.records() {
        // the csv reader rejects rows with a column-count mismatch
        let record = result?;
        let patient_id = record[0].to_string();
        let calls: Vec<RawCall> = record.iter()
            .skip(1)
            .zip(assay_ids.iter())
            .map(|(genotype, assay_id)| {
                RawCall::new(patient_id.clone(), assay_id.clone(), genotype.to_string())
            })
            .collect();

        match patients.entry(patient_id) {
            Vacant(entry) => entry.insert(calls),
            Occupied(entry) => {
                return Err(PhenotyperError::MalformedTable {
                    reason: format!("duplicate patient identifier {:?}", entry.key())
                });
            }
        };
    }

    debug!("Loaded {} patients x {} assays from {filename:?}", patients.len(), assay_ids.len());
    Ok(CallTable {
        assay_ids,
        patients
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::io::Write;

    /// Writes a call table to a temp file for tests downstream of the loader
    pub fn write_test_table(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_call_table() {
        let file = write_test_table(&[
            "Sample/Assay;DPYD_2A;DPYD_13;UGT1A1_80;CYP2D6*4",
            "DPD900;  T/T;       C/G;       T/C;       C/A",
            "DPD901;T/T;G/G;C/C;UND"
        ]);
        let table = load_call_table(file.path()).unwrap();
        assert_eq!(table.assay_ids(), &["DPYD_2A", "DPYD_13", "UGT1A1_80", "CYP2D6*4"]);
        assert_eq!(table.patient_count(), 2);

        // values are trimmed but otherwise untouched
        let calls = &table.patients()["DPD900"];
        assert_eq!(calls[0], RawCall::new("DPD900".to_string(), "DPYD_2A".to_string(), "T/T".to_string()));
        assert_eq!(calls[3].genotype(), "C/A");

        let calls = &table.patients()["DPD901"];
        assert!(calls[3].is_undetermined());
    }

    #[test]
    fn test_no_semantic_validation() {
        // nonsense genotype strings are passed through, downstream stages decide
        let file = write_test_table(&[
            "Sample/Assay;DPYD_2A",
            "DPD900;garbage"
        ]);
        let table = load_call_table(file.path()).unwrap();
        assert_eq!(table.patients()["DPD900"][0].genotype(), "garbage");
    }

    #[test]
    fn test_missing_identifier_column() {
        let file = write_test_table(&[
            "Patient;DPYD_2A",
            "DPD900;T/T"
        ]);
        let result = load_call_table(file.path());
        assert_eq!(result.unwrap_err(), PhenotyperError::MalformedTable {
            reason: "first column must be \"Sample/Assay\"".to_string()
        });
    }

    #[test]
    fn test_column_count_mismatch() {
        let file = write_test_table(&[
            "Sample/Assay;DPYD_2A;DPYD_13",
            "DPD900;T/T"
        ]);
        let result = load_call_table(file.path());
        assert!(matches!(result, Err(PhenotyperError::MalformedTable { .. })));
    }

    #[test]
    fn test_duplicate_patient() {
        let file = write_test_table(&[
            "Sample/Assay;DPYD_2A",
            "DPD900;T/T",
            "DPD900;T/C"
        ]);
        let result = load_call_table(file.path());
        assert_eq!(result.unwrap_err(), PhenotyperError::MalformedTable {
            reason: "duplicate patient identifier \"DPD900\"".to_string()
        });
    }
}
