
/// Contains all the CLI related functionality
pub mod cli;
/// Contains any specialized data types that are shared across the tooling
pub mod data_types;
/// Contains the static reference tables and the recommendation lookup
pub mod database;
/// Contains the loader for the raw assay call table
pub mod loader;
/// Contains the functionality for converting raw calls into phenotype records
pub mod phenotyper;
/// Contains the individual pipeline stages: decomposition, resolution, classification
pub mod pipeline;
/// Contains functionality for displaying reference table statistics
pub mod table_stat;
/// Contains generic utilities that are handy wrappers
pub mod util;
