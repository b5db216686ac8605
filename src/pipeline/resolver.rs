
use log::trace;
use std::collections::BTreeSet;

use crate::data_types::pgx_diplotype::{AlleleTuple, Diplotype, WILD_TYPE};
use crate::database::variant_panel::{CYP2D6, UGT1A1};

// the CYP2D6 alleles involved in the combined-indicator collision rule
const COMBINED_10_4: &str = "*10*4";
const ALLELE_10: &str = "*10";
const ALLELE_4: &str = "*4";

/// The clinically reported UGT1A1 allele; the probed *80 marker is a linked proxy for it
const UGT1A1_REPORTED: &str = "*28";

/// Collapses the deduplicated allele tuples for one gene into the definitive diplotype.
/// Non-wild-type alleles are pooled per position, gene-specific normalization is applied,
/// and each non-empty pool contributes its lexicographically first allele. Pure and
/// idempotent: re-resolving a resolved result yields the same diplotype.
/// # Arguments
/// * `gene` - the gene symbol, which selects the normalization rules
/// * `tuples` - the deduplicated allele tuples accumulated across the gene's assays
pub fn resolve_diplotype(gene: &str, tuples: &BTreeSet<AlleleTuple>) -> Diplotype {
    let mut maternal_pool: BTreeSet<String> = Default::default();
    let mut paternal_pool: BTreeSet<String> = Default::default();

    for tuple in tuples.iter() {
        if tuple.is_homozygous_reference() {
            continue;
        }
        if tuple.maternal() != WILD_TYPE {
            maternal_pool.insert(tuple.maternal().to_string());
        }
        if tuple.paternal() != WILD_TYPE {
            paternal_pool.insert(tuple.paternal().to_string());
        }
    }

    match gene {
        CYP2D6 => normalize_cyp2d6_pools(&mut maternal_pool, &mut paternal_pool),
        UGT1A1 => {
            rename_first_allele(&mut maternal_pool, UGT1A1_REPORTED);
            rename_first_allele(&mut paternal_pool, UGT1A1_REPORTED);
        },
        _ => {}
    };
    trace!("{gene} pools after normalization: maternal={maternal_pool:?} paternal={paternal_pool:?}");

    // a lone variant is always reported in the second position, matching the
    // "*1/<variant>" convention for heterozygotes
    match (maternal_pool.first(), paternal_pool.first()) {
        (None, None) => Diplotype::new(WILD_TYPE, WILD_TYPE),
        (Some(maternal), None) => Diplotype::new(WILD_TYPE, maternal),
        (None, Some(paternal)) => Diplotype::new(WILD_TYPE, paternal),
        (Some(maternal), Some(paternal)) => Diplotype::new(maternal, paternal)
    }
}

/// Applies the CYP2D6 combined-indicator rule: "*10*4" double-counts information that
/// separate "*10"/"*4" observations already carry, so it is dropped whenever a plain
/// "*10" is present, and the redundant "*10" is dropped too if "*4" confirms the
/// secondary marker. The rule runs within each pool and then across the two pools.
fn normalize_cyp2d6_pools(maternal_pool: &mut BTreeSet<String>, paternal_pool: &mut BTreeSet<String>) {
    // both markers in the same pool
    if maternal_pool.contains(COMBINED_10_4) && maternal_pool.contains(ALLELE_10) {
        maternal_pool.remove(COMBINED_10_4);
        if maternal_pool.contains(ALLELE_4) {
            maternal_pool.remove(ALLELE_10);
        }
    }
    if paternal_pool.contains(COMBINED_10_4) && paternal_pool.contains(ALLELE_10) {
        paternal_pool.remove(COMBINED_10_4);
        if paternal_pool.contains(ALLELE_4) {
            paternal_pool.remove(ALLELE_10);
        }
    }

    // markers split across opposite pools
    if paternal_pool.contains(COMBINED_10_4) && maternal_pool.contains(ALLELE_10) {
        paternal_pool.remove(COMBINED_10_4);
        if maternal_pool.contains(ALLELE_4) {
            maternal_pool.remove(ALLELE_10);
        }
    }
    if maternal_pool.contains(COMBINED_10_4) && paternal_pool.contains(ALLELE_10) {
        maternal_pool.remove(COMBINED_10_4);
        if paternal_pool.contains(ALLELE_4) {
            paternal_pool.remove(ALLELE_10);
        }
    }
}

/// Renames the first pooled allele to the given canonical name. Pools are expected to
/// hold at most one meaningful entry after deduplication; any further entries are kept
/// as-is.
fn rename_first_allele(pool: &mut BTreeSet<String>, canonical: &str) {
    if let Some(first) = pool.pop_first() {
        trace!("renaming pooled allele {first:?} -> {canonical:?}");
        pool.insert(canonical.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::variant_panel::DPYD;

    fn tuple_set(tuples: &[(&str, &str)]) -> BTreeSet<AlleleTuple> {
        tuples.iter()
            .map(|&(m, p)| AlleleTuple::new(m, p))
            .collect()
    }

    #[test]
    fn test_all_wild_type() {
        let tuples = tuple_set(&[("*1", "*1")]);
        assert_eq!(resolve_diplotype(DPYD, &tuples).diplotype(), "*1/*1");

        // no tuples at all behaves the same
        assert_eq!(resolve_diplotype(DPYD, &Default::default()).diplotype(), "*1/*1");
    }

    #[test]
    fn test_single_heterozygote() {
        let tuples = tuple_set(&[("*1", "_2A"), ("*1", "*1")]);
        assert_eq!(resolve_diplotype(DPYD, &tuples).diplotype(), "*1/_2A");

        // a lone maternal variant is also reported in the second position
        let tuples = tuple_set(&[("_2A", "*1")]);
        assert_eq!(resolve_diplotype(DPYD, &tuples).diplotype(), "*1/_2A");
    }

    #[test]
    fn test_both_pools() {
        let tuples = tuple_set(&[("_2A", "_2A"), ("*1", "*1")]);
        assert_eq!(resolve_diplotype(DPYD, &tuples).diplotype(), "_2A/_2A");
    }

    #[test]
    fn test_lexicographic_tie_break() {
        // two different variants landed in the same pool; the first in sort order wins
        let tuples = tuple_set(&[("*1", "_2A"), ("*1", "_13")]);
        assert_eq!(resolve_diplotype(DPYD, &tuples).diplotype(), "*1/_13");
    }

    #[test]
    fn test_cyp2d6_same_pool_collapse() {
        // {*10*4, *10, *4} in one pool collapses to {*4}
        let tuples = tuple_set(&[("*10*4", "*1"), ("*10", "*1"), ("*4", "*1")]);
        assert_eq!(resolve_diplotype(CYP2D6, &tuples).diplotype(), "*1/*4");
    }

    #[test]
    fn test_cyp2d6_same_pool_without_secondary() {
        // without a confirming *4, only the combined marker is dropped
        let tuples = tuple_set(&[("*10*4", "*1"), ("*10", "*1")]);
        assert_eq!(resolve_diplotype(CYP2D6, &tuples).diplotype(), "*1/*10");
    }

    #[test]
    fn test_cyp2d6_opposite_pools() {
        let tuples = tuple_set(&[("*10*4", "*1"), ("*1", "*10"), ("*1", "*4")]);
        assert_eq!(resolve_diplotype(CYP2D6, &tuples).diplotype(), "*1/*4");
    }

    #[test]
    fn test_cyp2d6_combined_alone_is_kept() {
        // no plain *10 observation, the combined marker stands on its own
        let tuples = tuple_set(&[("*1", "*10*4")]);
        assert_eq!(resolve_diplotype(CYP2D6, &tuples).diplotype(), "*1/*10*4");
    }

    #[test]
    fn test_ugt1a1_rename() {
        let tuples = tuple_set(&[("*1", "_80")]);
        assert_eq!(resolve_diplotype(UGT1A1, &tuples).diplotype(), "*1/*28");

        let tuples = tuple_set(&[("_80", "_80")]);
        assert_eq!(resolve_diplotype(UGT1A1, &tuples).diplotype(), "*28/*28");
    }

    #[test]
    fn test_idempotent() {
        let tuples = tuple_set(&[("*1", "_80")]);
        let first = resolve_diplotype(UGT1A1, &tuples);

        let resolved_set = tuple_set(&[(first.hap1(), first.hap2())]);
        let second = resolve_diplotype(UGT1A1, &resolved_set);
        assert_eq!(first, second);

        let tuples = tuple_set(&[("*10*4", "*1"), ("*10", "*1"), ("*4", "*1")]);
        let first = resolve_diplotype(CYP2D6, &tuples);
        let resolved_set = tuple_set(&[(first.hap1(), first.hap2())]);
        assert_eq!(resolve_diplotype(CYP2D6, &resolved_set), first);
    }
}
