use clap::Args;
use log::info;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, AFTER_HELP};

#[derive(Clone, Args)]
#[clap(author, about,
    after_help = &**AFTER_HELP)]
pub struct TableStatSettings {
    /// Input phenotype report file (JSON)
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "report")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_report: PathBuf,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_table_stat_settings(settings: TableStatSettings) -> TableStatSettings {
    // dump stuff to the logger
    check_required_filename(&settings.input_report, "Report JSON");

    info!("Input report: {:?}", &settings.input_report);

    settings
}
