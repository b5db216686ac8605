
use log::{LevelFilter, error, info, warn};

use pgxpheno::cli::core::{Commands, get_cli};
use pgxpheno::cli::report::{ReportSettings, check_report_settings};
use pgxpheno::cli::table_stat::{TableStatSettings, check_table_stat_settings};
use pgxpheno::data_types::report_json::PhenoReportJson;
use pgxpheno::database::diplotype_table::Cyp2d6PhenotypeTable;
use pgxpheno::database::recommendation::{CpicRecommendationClient, RecommendationLookup};
use pgxpheno::database::variant_panel::{DEFAULT_VARIANT_PANEL, VariantPanel};
use pgxpheno::loader::{CallTable, load_call_table};
use pgxpheno::util::file_io::{load_json, save_json};

/// This will run the "report" mode of the tool
/// # Arguments
/// * `settings` - the ReportSettings object
fn run_report(settings: ReportSettings) {
    // get the settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };

    // immediately setup logging first
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    // okay, now we can check all the other settings
    let cli_settings: ReportSettings = match check_report_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while processing CLI settings: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };

    // load the variant panel, either the user-provided one or the built-in panel
    let variant_panel: VariantPanel = if let Some(panel_fn) = cli_settings.panel_filename.as_ref() {
        info!("Loading variant panel from {panel_fn:?}...");
        match load_json(panel_fn) {
            Ok(vp) => vp,
            Err(e) => {
                error!("Error while loading variant panel file: {e}");
                std::process::exit(exitcode::IOERR);
            }
        }
    } else {
        DEFAULT_VARIANT_PANEL.clone()
    };

    // we also need to validate that the panel is complete enough to run
    if let Err(e) = variant_panel.validate() {
        error!("Error while validating variant panel: {e}");
        std::process::exit(exitcode::IOERR);
    }

    // load the CYP2D6 diplotype table
    info!("Loading diplotype table from {:?}...", cli_settings.diplotype_table_filename);
    let phenotype_table: Cyp2d6PhenotypeTable = match Cyp2d6PhenotypeTable::load_csv(&cli_settings.diplotype_table_filename) {
        Ok(table) => table,
        Err(e) => {
            error!("Error while loading diplotype table: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };
    info!("Loaded {} diplotype entries.", phenotype_table.len());

    // load the assay calls
    info!("Loading assay calls from {:?}...", cli_settings.call_filename);
    let call_table: CallTable = match load_call_table(&cli_settings.call_filename) {
        Ok(ct) => ct,
        Err(e) => {
            error!("Error while loading assay call file: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };
    info!("Loaded {} patients across {} assay columns.", call_table.patients().len(), call_table.assay_ids().len());

    // set up the external lookup unless we are running offline
    let cpic_client: Option<CpicRecommendationClient> = if cli_settings.offline {
        None
    } else {
        let client_result = match cli_settings.cpic_url.as_ref() {
            Some(url) => CpicRecommendationClient::with_default_drugs(url.clone()),
            None => CpicRecommendationClient::new()
        };
        match client_result {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Error while creating CPIC client, continuing without external lookups: {e}");
                None
            }
        }
    };
    let recommender: Option<&dyn RecommendationLookup> = cpic_client.as_ref()
        .map(|c| c as &dyn RecommendationLookup);

    // now hand it all to the phenotyper
    let report: PhenoReportJson = match pgxpheno::phenotyper::generate_phenotype_report(
        &call_table,
        &variant_panel,
        &phenotype_table,
        recommender
    ) {
        Ok(report) => report,
        Err(e) => {
            error!("Error while generating phenotype report: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    // save the report to the defined file
    info!("Saving phenotype report to {:?}", cli_settings.report_filename);
    match save_json(&report, &cli_settings.report_filename) {
        Ok(()) => {},
        Err(e) => {
            error!("Error while writing phenotype report to file: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };
}

/// This will run the "table_stat" mode of the tool
/// # Arguments
/// * `settings` - the TableStatSettings object
fn run_table_stat(settings: TableStatSettings) {
    // get the settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };

    // immediately setup logging first
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    // okay, now we can check all the other settings
    let cli_settings: TableStatSettings = check_table_stat_settings(settings);

    // first load the report
    info!("Loading phenotype report from {:?}...", cli_settings.input_report);
    let report: PhenoReportJson = match load_json(&cli_settings.input_report) {
        Ok(report) => report,
        Err(e) => {
            error!("Error while loading phenotype report file: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };
    info!("Report loaded successfully.");

    // display the report statistics
    pgxpheno::table_stat::print_stats(&report);
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Report(settings) => {
            run_report(*settings);
        },
        Commands::TableStat(settings) => {
            run_table_stat(*settings);
        }
    }

    info!("Process finished successfully.");
}
