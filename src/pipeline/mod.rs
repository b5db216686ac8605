
/// Contains the phenotype classification rules
pub mod classifier;
/// Contains the assay decomposition logic
pub mod decomposer;
/// Contains the pipeline error taxonomy
pub mod errors;
/// Contains the diplotype resolution logic
pub mod resolver;
