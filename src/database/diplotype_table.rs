
use log::debug;
use serde::Serialize;
use simple_error::bail;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry::{Occupied, Vacant};
use std::path::Path;

use crate::data_types::pgx_diplotype::Diplotype;

/// The (score, phenotype) pair stored for one CYP2D6 diplotype
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiplotypePhenotype {
    /// The numeric activity score
    activity_score: f64,
    /// The activity score exactly as published, e.g. "1.0" rather than "1"
    score_label: String,
    /// The phenotype label, e.g. "Poor Metabolizer"
    phenotype: String
}

impl DiplotypePhenotype {
    pub fn activity_score(&self) -> f64 {
        self.activity_score
    }

    pub fn score_label(&self) -> &str {
        &self.score_label
    }

    pub fn phenotype(&self) -> &str {
        &self.phenotype
    }
}

/// The CYP2D6 diplotype→phenotype reference table, loaded once from a CSV export
/// of the published spreadsheet. Keys are order-sensitive "allele1/allele2" strings,
/// so lookups retry with the swapped orientation before giving up.
#[derive(Clone, Debug, Serialize)]
pub struct Cyp2d6PhenotypeTable {
    /// Where the table was loaded from, tracked for report metadata
    source: String,
    /// Map from diplotype string to its published phenotype assignment
    entries: BTreeMap<String, DiplotypePhenotype>
}

impl Cyp2d6PhenotypeTable {
    /// Loads the table from a delimited file. The first three columns are used by
    /// position: diplotype, activity score, phenotype. A ".tsv" extension switches
    /// the delimiter to tabs.
    /// # Arguments
    /// * `filename` - the file path to open and parse
    /// # Errors
    /// * if the file does not open or parse as delimited data
    /// * if a row has fewer than three columns
    /// * if an activity score is not numeric
    /// * if the same diplotype appears twice
    pub fn load_csv(filename: &Path) -> Result<Cyp2d6PhenotypeTable, Box<dyn std::error::Error>> {
        let delimiter: u8 = if filename.extension().unwrap_or_default() == "tsv" {
            b'\t'
        } else {
            b','
        };
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_path(filename)?;

        let mut entries: BTreeMap<String, DiplotypePhenotype> = Default::default();
        for (row_index, result) in csv_reader.records().enumerate() {
            let record = result?;
            if record.len() < 3 {
                bail!("Row {} of {filename:?} has {} columns, expected at least 3", row_index + 2, record.len());
            }

            // columns are positional: diplotype, activity score, phenotype
            let diplotype = record[0].to_string();
            let score_label = record[1].to_string();
            let phenotype = record[2].to_string();
            let activity_score: f64 = match score_label.parse() {
                Ok(score) => score,
                Err(_) => bail!("Activity score {score_label:?} for diplotype {diplotype:?} is not numeric")
            };

            match entries.entry(diplotype) {
                Vacant(entry) => {
                    entry.insert(DiplotypePhenotype {
                        activity_score,
                        score_label,
                        phenotype
                    });
                },
                Occupied(entry) => bail!("Duplicate diplotype in phenotype table: {:?}", entry.key())
            };
        }

        debug!("Loaded {} diplotype entries from {filename:?}", entries.len());
        Ok(Cyp2d6PhenotypeTable {
            source: filename.display().to_string(),
            entries
        })
    }

    /// Looks up a diplotype, retrying with the swapped allele orientation since the
    /// published table only stores one orientation per pair. Returns None if neither
    /// orientation is present; the caller decides how fatal that is.
    pub fn lookup(&self, diplotype: &Diplotype) -> Option<&DiplotypePhenotype> {
        self.entries.get(diplotype.diplotype())
            .or_else(|| self.entries.get(diplotype.swapped().diplotype()))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, DiplotypePhenotype> {
        &self.entries
    }
}
