

use clap::Args;
use log::{info, warn};
use std::path::PathBuf;

use crate::cli::core::{AFTER_HELP, check_optional_filename, check_required_filename};

#[derive(Args, Clone, Default)]
#[clap(author, about,
    after_help = &**AFTER_HELP)]
pub struct ReportSettings {
    /// Input assay call file (CSV, ";" delimited)
    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "calls")]
    #[clap(value_name = "CSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub call_filename: PathBuf,

    /// Input CYP2D6 diplotype-to-phenotype table (CSV, or TSV by extension)
    #[clap(required = true)]
    #[clap(short = 'd')]
    #[clap(long = "diplotype-table")]
    #[clap(value_name = "CSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub diplotype_table_filename: PathBuf,

    /// Optional variant panel file replacing the built-in panel (JSON)
    #[clap(short = 'p')]
    #[clap(long = "panel")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub panel_filename: Option<PathBuf>,

    /// Output phenotype report file (JSON)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-report")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub report_filename: PathBuf,

    /// Disables the external CPIC recommendation lookups
    #[clap(long = "offline")]
    #[clap(help_heading = Some("Recommendations"))]
    pub offline: bool,

    /// Custom endpoint for the CPIC recommendation API
    #[clap(hide = true)]
    #[clap(long = "cpic-url")]
    #[clap(value_name = "URL")]
    #[clap(help_heading = Some("Recommendations"))]
    pub cpic_url: Option<String>,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_report_settings(settings: ReportSettings) -> Result<ReportSettings, Box<dyn std::error::Error>> {
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.call_filename, "Assay call file");
    check_required_filename(&settings.diplotype_table_filename, "Diplotype table");
    check_optional_filename(settings.panel_filename.as_deref(), "Variant panel");

    // dump stuff to the logger
    info!("\tAssay calls: {:?}", settings.call_filename);
    info!("\tDiplotype table: {:?}", settings.diplotype_table_filename);
    if let Some(panel_fn) = settings.panel_filename.as_ref() {
        info!("\tVariant panel: {:?}", panel_fn);
    } else {
        info!("\tVariant panel: built-in");
    }

    // outputs
    info!("Outputs:");
    info!("\tPhenotype report: {:?}", settings.report_filename);

    // miscellaneous settings
    info!("Recommendation settings:");
    if settings.offline {
        warn!("\tExternal lookups: DISABLED, reports will only contain static guideline texts");
    } else {
        info!("\tExternal lookups: ENABLED");
        if let Some(url) = settings.cpic_url.as_ref() {
            info!("\tCPIC endpoint: {url}");
        }
    }

    Ok(settings)
}
