
/// Contains definitions related to the representation of a final diplotype
pub mod pgx_diplotype;
/// Contains the metabolizer classes and the classified phenotype record
pub mod phenotype;
/// Contains the raw assay call and the parsed assay column key
pub mod raw_call;
/// Contains the output JSON format for the final phenotype report
pub mod report_json;
