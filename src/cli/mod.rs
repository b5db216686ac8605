
/// the main CLI module
pub mod core;
/// the report CLI subcommand for running the phenotyper
pub mod report;
/// the table-stat CLI subcommand for summarizing a generated report
pub mod table_stat;
