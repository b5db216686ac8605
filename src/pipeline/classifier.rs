
use crate::data_types::pgx_diplotype::Diplotype;
use crate::data_types::phenotype::{Metabolizer, PhenotypeRecord};
use crate::database::diplotype_table::Cyp2d6PhenotypeTable;
use crate::database::variant_panel::{DPYD, UGT1A1};
use crate::pipeline::errors::PhenotyperError;

/// Maps a definitive diplotype to its phenotype record.
/// DPYD and UGT1A1 use the trinary wild-type membership rule; everything else goes
/// through the diplotype reference table (in practice, CYP2D6), where a missing entry
/// is a hard error rather than a silent default.
/// # Arguments
/// * `gene` - the gene symbol
/// * `diplotype` - the resolved diplotype for this patient/gene
/// * `phenotype_table` - the published diplotype→phenotype reference table
/// # Errors
/// * `UnknownDiplotype` if a table-based gene has no entry for either orientation
pub fn classify_phenotype(
    gene: &str,
    diplotype: Diplotype,
    phenotype_table: &Cyp2d6PhenotypeTable
) -> Result<PhenotypeRecord, PhenotyperError> {
    match gene {
        DPYD | UGT1A1 => {
            let metabolizer = match diplotype.wild_type_count() {
                2 => Metabolizer::Normal,
                1 => Metabolizer::Intermediate,
                _ => Metabolizer::Poor
            };
            Ok(PhenotypeRecord::from_metabolizer(diplotype, metabolizer))
        },
        _ => {
            match phenotype_table.lookup(&diplotype) {
                Some(entry) => Ok(PhenotypeRecord::new(
                    diplotype,
                    entry.activity_score(),
                    entry.score_label().to_string(),
                    entry.phenotype().to_string()
                )),
                None => Err(PhenotyperError::UnknownDiplotype {
                    diplotype: diplotype.diplotype().to_string()
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    use crate::database::diplotype_table::tests::write_test_table;
    use crate::database::variant_panel::CYP2D6;

    fn test_table() -> Cyp2d6PhenotypeTable {
        let file = write_test_table(&[
            "*1/*1,2.0,Normal Metabolizer",
            "*1/*4,1.0,Intermediate Metabolizer",
            "*4/*4,0.0,Poor Metabolizer"
        ]);
        Cyp2d6PhenotypeTable::load_csv(file.path()).unwrap()
    }

    #[test]
    fn test_trinary_classification() {
        let table = test_table();

        let record = classify_phenotype(DPYD, Diplotype::new("*1", "*1"), &table).unwrap();
        assert_approx_eq!(record.activity_score(), 2.0);
        assert_eq!(record.phenotype(), "Normal Metabolizer");

        let record = classify_phenotype(DPYD, Diplotype::new("*1", "_2A"), &table).unwrap();
        assert_approx_eq!(record.activity_score(), 1.0);
        assert_eq!(record.phenotype(), "Intermediate Metabolizer");

        let record = classify_phenotype(UGT1A1, Diplotype::new("*28", "*28"), &table).unwrap();
        assert_approx_eq!(record.activity_score(), 0.0);
        assert_eq!(record.phenotype(), "Poor Metabolizer");
    }

    #[test]
    fn test_cyp2d6_table_lookup() {
        let table = test_table();

        let record = classify_phenotype(CYP2D6, Diplotype::new("*1", "*4"), &table).unwrap();
        assert_approx_eq!(record.activity_score(), 1.0);
        assert_eq!(record.score_label(), "1.0");
        assert_eq!(record.phenotype(), "Intermediate Metabolizer");

        // the table only stores one orientation, the swapped key still resolves
        let record = classify_phenotype(CYP2D6, Diplotype::new("*4", "*1"), &table).unwrap();
        assert_eq!(record.phenotype(), "Intermediate Metabolizer");
    }

    #[test]
    fn test_cyp2d6_unknown_diplotype() {
        let table = test_table();
        let result = classify_phenotype(CYP2D6, Diplotype::new("*4", "*10"), &table);
        assert_eq!(result.unwrap_err(), PhenotyperError::UnknownDiplotype {
            diplotype: "*4/*10".to_string()
        });
    }
}
