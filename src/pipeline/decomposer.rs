
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::data_types::pgx_diplotype::{AlleleTuple, WILD_TYPE};
use crate::data_types::raw_call::{AssayKey, RawCall};
use crate::database::variant_panel::VariantPanel;
use crate::pipeline::errors::PhenotyperError;

/// Per-assay evidence retained for the final report: what was observed and how it mapped
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AssayDetails {
    /// The assay column this call came from
    assay_id: String,
    /// The raw genotype string as loaded
    raw_genotype: String,
    /// The star-allele tuple the call was mapped to
    mapped_alleles: AlleleTuple
}

impl AssayDetails {
    pub fn new(assay_id: String, raw_genotype: String, mapped_alleles: AlleleTuple) -> AssayDetails {
        AssayDetails {
            assay_id,
            raw_genotype,
            mapped_alleles
        }
    }

    pub fn assay_id(&self) -> &str {
        &self.assay_id
    }

    pub fn raw_genotype(&self) -> &str {
        &self.raw_genotype
    }

    pub fn mapped_alleles(&self) -> &AlleleTuple {
        &self.mapped_alleles
    }
}

/// One patient's calls decomposed into per-gene allele tuples (set semantics)
/// plus the per-assay evidence trail
#[derive(Clone, Debug, Default)]
pub struct DecomposedPatient {
    /// Map from gene to the deduplicated allele tuples observed across its assays
    gene_tuples: BTreeMap<String, BTreeSet<AlleleTuple>>,
    /// Map from gene to the evidence for each contributing assay
    assay_details: BTreeMap<String, Vec<AssayDetails>>
}

impl DecomposedPatient {
    pub fn gene_tuples(&self) -> &BTreeMap<String, BTreeSet<AlleleTuple>> {
        &self.gene_tuples
    }

    pub fn assay_details(&self) -> &BTreeMap<String, Vec<AssayDetails>> {
        &self.assay_details
    }

    /// Removes and returns the evidence for one gene, used while assembling the report
    pub fn take_assay_details(&mut self, gene: &str) -> Vec<AssayDetails> {
        self.assay_details.remove(gene).unwrap_or_default()
    }
}

/// Resolves every assay column up front so malformed columns are reported individually
/// instead of failing once per patient. Columns with errors are excluded from the
/// returned key map, the caller is responsible for surfacing the error list.
/// # Arguments
/// * `assay_ids` - the assay column headers in file order
/// * `variant_panel` - the reference panel the columns must belong to
pub fn parse_assay_keys(assay_ids: &[String], variant_panel: &VariantPanel) -> (BTreeMap<String, AssayKey>, Vec<PhenotyperError>) {
    let mut assay_keys: BTreeMap<String, AssayKey> = Default::default();
    let mut column_errors: Vec<PhenotyperError> = vec![];

    for assay_id in assay_ids.iter() {
        match AssayKey::parse(assay_id) {
            Ok(key) => {
                if variant_panel.contains(key.gene(), key.variant_label()) {
                    assay_keys.insert(assay_id.clone(), key);
                } else {
                    column_errors.push(PhenotyperError::UnknownPanelVariant {
                        assay_id: assay_id.clone(),
                        gene: key.gene().to_string(),
                        variant_label: key.variant_label().to_string()
                    });
                }
            },
            Err(e) => column_errors.push(e)
        };
    }

    (assay_keys, column_errors)
}

/// Decomposes one patient's raw calls into per-gene allele tuples.
/// Undetermined calls contribute a homozygous reference tuple; otherwise each side of
/// the "X/Y" genotype maps to the probed allele if the base is one of the panel's
/// indicator codes for that variant, and to the wild-type otherwise.
/// # Arguments
/// * `calls` - the patient's raw calls, one per assay column
/// * `assay_keys` - pre-parsed assay keys; calls for columns missing here are skipped
///   because the column was already reported as bad
/// * `variant_panel` - the indicator base reference table
/// # Errors
/// * `MalformedGenotype` if any cell is neither "X/Y" nor "UND"; this aborts the patient
pub fn decompose_patient(
    calls: &[RawCall],
    assay_keys: &BTreeMap<String, AssayKey>,
    variant_panel: &VariantPanel
) -> Result<DecomposedPatient, PhenotyperError> {
    let mut decomposed = DecomposedPatient::default();

    for call in calls.iter() {
        let key = match assay_keys.get(call.assay_id()) {
            Some(key) => key,
            // column was reported as unusable at parse time
            None => continue
        };

        let tuple = if call.is_undetermined() {
            // indeterminate calls are treated as homozygous reference by policy,
            // this is not a detection of the true genotype
            AlleleTuple::homozygous_reference()
        } else {
            let bases: Vec<&str> = call.genotype().split('/').collect();
            if bases.len() != 2 {
                return Err(PhenotyperError::MalformedGenotype {
                    assay_id: call.assay_id().to_string(),
                    genotype: call.genotype().to_string()
                });
            }

            let allele_name = key.allele_name();
            let mapped: Vec<&str> = bases.iter()
                .map(|&base| {
                    if variant_panel.is_indicator(key.gene(), key.variant_label(), base) {
                        allele_name.as_str()
                    } else {
                        WILD_TYPE
                    }
                })
                .collect();
            AlleleTuple::new(mapped[0], mapped[1])
        };
        trace!("{}: {} {:?} -> {:?}", call.patient_id(), call.assay_id(), call.genotype(), tuple);

        decomposed.gene_tuples.entry(key.gene().to_string())
            .or_default()
            .insert(tuple.clone());
        decomposed.assay_details.entry(key.gene().to_string())
            .or_default()
            .push(AssayDetails::new(call.assay_id().to_string(), call.genotype().to_string(), tuple));
    }

    Ok(decomposed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::variant_panel::DEFAULT_VARIANT_PANEL;

    fn call(assay_id: &str, genotype: &str) -> RawCall {
        RawCall::new("DPD900".to_string(), assay_id.to_string(), genotype.to_string())
    }

    fn keys_for(assay_ids: &[&str]) -> BTreeMap<String, AssayKey> {
        let ids: Vec<String> = assay_ids.iter().map(|s| s.to_string()).collect();
        let (keys, errors) = parse_assay_keys(&ids, &DEFAULT_VARIANT_PANEL);
        assert!(errors.is_empty());
        keys
    }

    #[test]
    fn test_parse_assay_keys_errors() {
        let ids: Vec<String> = ["DPYD_2A", "NOSEPARATOR", "CYP2C19*2"].iter()
            .map(|s| s.to_string())
            .collect();
        let (keys, errors) = parse_assay_keys(&ids, &DEFAULT_VARIANT_PANEL);
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("DPYD_2A"));
        assert_eq!(errors, vec![
            PhenotyperError::UnrecognizedAssayFormat { assay_id: "NOSEPARATOR".to_string() },
            PhenotyperError::UnknownPanelVariant {
                assay_id: "CYP2C19*2".to_string(),
                gene: "CYP2C19".to_string(),
                variant_label: "2".to_string()
            }
        ]);
    }

    #[test]
    fn test_decompose_heterozygote() {
        // T is a 2A indicator, C is not; HapB3 only flags on T
        let keys = keys_for(&["DPYD_2A", "DPYD_HapB3"]);
        let calls = vec![
            call("DPYD_2A", "T/C"),
            call("DPYD_HapB3", "C/C")
        ];
        let decomposed = decompose_patient(&calls, &keys, &DEFAULT_VARIANT_PANEL).unwrap();

        let tuples = &decomposed.gene_tuples()["DPYD"];
        assert_eq!(tuples.len(), 2);
        assert!(tuples.contains(&AlleleTuple::new("_2A", "*1")));
        assert!(tuples.contains(&AlleleTuple::homozygous_reference()));

        let details = &decomposed.assay_details()["DPYD"];
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].assay_id(), "DPYD_2A");
        assert_eq!(details[0].raw_genotype(), "T/C");
    }

    #[test]
    fn test_decompose_undetermined() {
        let keys = keys_for(&["CYP2D6*4"]);
        let calls = vec![call("CYP2D6*4", "UND")];
        let decomposed = decompose_patient(&calls, &keys, &DEFAULT_VARIANT_PANEL).unwrap();

        let tuples = &decomposed.gene_tuples()["CYP2D6"];
        assert_eq!(tuples.len(), 1);
        assert!(tuples.first().unwrap().is_homozygous_reference());
    }

    #[test]
    fn test_decompose_duplicate_tuples() {
        // two assays both mapping to homozygous reference collapse under set semantics
        let keys = keys_for(&["CYP2D6*4", "CYP2D6*10"]);
        let calls = vec![
            call("CYP2D6*4", "C/C"),
            call("CYP2D6*10", "UND")
        ];
        let decomposed = decompose_patient(&calls, &keys, &DEFAULT_VARIANT_PANEL).unwrap();
        assert_eq!(decomposed.gene_tuples()["CYP2D6"].len(), 1);
        // the evidence trail still has one entry per assay
        assert_eq!(decomposed.assay_details()["CYP2D6"].len(), 2);
    }

    #[test]
    fn test_decompose_malformed_genotype() {
        let keys = keys_for(&["DPYD_2A"]);
        let calls = vec![call("DPYD_2A", "T/C/G")];
        let result = decompose_patient(&calls, &keys, &DEFAULT_VARIANT_PANEL);
        assert_eq!(result.unwrap_err(), PhenotyperError::MalformedGenotype {
            assay_id: "DPYD_2A".to_string(),
            genotype: "T/C/G".to_string()
        });

        let calls = vec![call("DPYD_2A", "garbage")];
        assert!(decompose_patient(&calls, &keys, &DEFAULT_VARIANT_PANEL).is_err());
    }

    #[test]
    fn test_decompose_skips_unparsed_columns() {
        // the column is not in the key map, so its calls are ignored entirely
        let keys = keys_for(&["DPYD_2A"]);
        let calls = vec![
            call("DPYD_2A", "T/T"),
            call("BADCOLUMN", "A/A")
        ];
        let decomposed = decompose_patient(&calls, &keys, &DEFAULT_VARIANT_PANEL).unwrap();
        assert_eq!(decomposed.gene_tuples().len(), 1);
    }
}
