
/// Errors that can be produced while turning raw assay calls into phenotype records.
/// The orchestrator decides the blast radius of each: table errors abort the load,
/// assay format errors are column-scoped, genotype errors are patient-scoped, and
/// classification/lookup errors are scoped to a single patient/gene pair.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PhenotyperError {
    #[error("input call table is malformed: {reason}")]
    MalformedTable { reason: String },

    #[error("assay {assay_id:?} does not contain a \"*\" or \"_\" separator")]
    UnrecognizedAssayFormat { assay_id: String },

    #[error("assay {assay_id:?} probes {gene} variant {variant_label:?}, which is not in the variant panel")]
    UnknownPanelVariant { assay_id: String, gene: String, variant_label: String },

    #[error("genotype {genotype:?} for assay {assay_id:?} is not of the form \"X/Y\" or \"UND\"")]
    MalformedGenotype { assay_id: String, genotype: String },

    #[error("diplotype {diplotype:?} was not found in the CYP2D6 phenotype table")]
    UnknownDiplotype { diplotype: String },

    #[error("recommendation lookup for {gene} with key {lookup_value:?} failed: {reason}")]
    ExternalLookup { gene: String, lookup_value: String, reason: String }
}

impl From<csv::Error> for PhenotyperError {
    fn from(error: csv::Error) -> Self {
        PhenotyperError::MalformedTable { reason: error.to_string() }
    }
}
