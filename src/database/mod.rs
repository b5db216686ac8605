
/// Contains serialization for CPIC API result types
pub mod cpic_api_results;
/// Contains the CYP2D6 diplotype-to-phenotype reference table
pub mod diplotype_table;
/// Contains the recommendation lookup seam and the CPIC client behind it
pub mod recommendation;
/// Contains the variant panel mapping assay columns to star alleles
pub mod variant_panel;
