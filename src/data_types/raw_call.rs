
use serde::Serialize;

use crate::pipeline::errors::PhenotyperError;

/// The sentinel used by the genotyping instrument for an undetermined call
pub const UNDETERMINED: &str = "UND";

/// A single cell from the call table: one patient, one assay, one raw genotype string.
/// No semantic validation happens at this level, the loader passes strings through unchanged.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RawCall {
    /// The patient identifier from the "Sample/Assay" column
    patient_id: String,
    /// The assay column header, e.g. "CYP2D6*4" or "DPYD_2A"
    assay_id: String,
    /// The raw genotype string, either "X/Y" or the "UND" sentinel
    genotype: String
}

impl RawCall {
    pub fn new(patient_id: String, assay_id: String, genotype: String) -> RawCall {
        RawCall {
            patient_id,
            assay_id,
            genotype
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn assay_id(&self) -> &str {
        &self.assay_id
    }

    pub fn genotype(&self) -> &str {
        &self.genotype
    }

    /// True if the instrument could not determine a genotype for this cell
    pub fn is_undetermined(&self) -> bool {
        self.genotype == UNDETERMINED
    }
}

/// An assay identifier decomposed into its gene and variant label.
/// The separator is retained because it doubles as the allele name prefix,
/// e.g. "CYP2D6*4" probes allele "*4" while "DPYD_2A" probes allele "_2A".
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AssayKey {
    /// The gene symbol, e.g. "CYP2D6"
    gene: String,
    /// The variant label, e.g. "4" or "2A"; never contains the separator
    variant_label: String,
    /// The separator character, '*' or '_'
    separator: char
}

impl AssayKey {
    /// Splits an assay identifier on the first occurrence of its separator.
    /// A '*' takes precedence over '_' when both are present.
    /// # Arguments
    /// * `assay_id` - the raw assay column header
    /// # Errors
    /// * if neither separator is found, or either side of the split is empty
    pub fn parse(assay_id: &str) -> Result<AssayKey, PhenotyperError> {
        let separator: char = if assay_id.contains('*') {
            '*'
        } else if assay_id.contains('_') {
            '_'
        } else {
            return Err(PhenotyperError::UnrecognizedAssayFormat { assay_id: assay_id.to_string() });
        };

        // split_once cannot fail here, we just verified the separator is present
        let (gene, variant_label) = assay_id.split_once(separator).unwrap();
        if gene.is_empty() || variant_label.is_empty() {
            return Err(PhenotyperError::UnrecognizedAssayFormat { assay_id: assay_id.to_string() });
        }

        Ok(AssayKey {
            gene: gene.to_string(),
            variant_label: variant_label.to_string(),
            separator
        })
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn variant_label(&self) -> &str {
        &self.variant_label
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// The allele name reported when the probed variant is observed, e.g. "*4" or "_2A"
    pub fn allele_name(&self) -> String {
        format!("{}{}", self.separator, self.variant_label)
    }

    /// Rebuilds the original assay identifier from the parsed components
    pub fn assay_id(&self) -> String {
        format!("{}{}{}", self.gene, self.separator, self.variant_label)
    }
}
