
use serde::{Deserialize, Serialize};

/// The wild-type / reference allele name shared by every gene on the panel
pub const WILD_TYPE: &str = "*1";

/// Checks that an allele name is either the wild-type or a separator-prefixed variant label
fn is_valid_allele(allele: &str) -> bool {
    allele == WILD_TYPE || ((allele.starts_with('*') || allele.starts_with('_')) && allele.len() > 1)
}

/// One (maternal, paternal) star-allele observation produced by a single assay.
/// Ordering is derived so sets of tuples are deterministic.
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct AlleleTuple {
    /// The allele observed at the maternal position
    maternal: String,
    /// The allele observed at the paternal position
    paternal: String
}

impl AlleleTuple {
    /// Basic constructor. Allele names always come from `AssayKey::allele_name()` or
    /// the wild-type constant, so malformed names indicate a caller bug.
    pub fn new(maternal: &str, paternal: &str) -> AlleleTuple {
        debug_assert!(is_valid_allele(maternal), "invalid maternal allele name: {maternal:?}");
        debug_assert!(is_valid_allele(paternal), "invalid paternal allele name: {paternal:?}");
        AlleleTuple {
            maternal: maternal.to_string(),
            paternal: paternal.to_string()
        }
    }

    /// The tuple emitted for undetermined calls and unobserved variants
    pub fn homozygous_reference() -> AlleleTuple {
        AlleleTuple {
            maternal: WILD_TYPE.to_string(),
            paternal: WILD_TYPE.to_string()
        }
    }

    pub fn maternal(&self) -> &str {
        &self.maternal
    }

    pub fn paternal(&self) -> &str {
        &self.paternal
    }

    /// True if neither position carries a variant allele
    pub fn is_homozygous_reference(&self) -> bool {
        self.maternal == WILD_TYPE && self.paternal == WILD_TYPE
    }
}

/// Contains the definitive diplotype call for a single gene
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Diplotype {
    /// short string for haplotype 1
    hap1: String,
    /// short string for haplotype 2
    hap2: String,
    /// combination diplotype call
    diplotype: String
}

impl Diplotype {
    pub fn new(hap1: &str, hap2: &str) -> Diplotype {
        Diplotype {
            hap1: hap1.to_string(),
            hap2: hap2.to_string(),
            diplotype: format!("{}/{}", hap1, hap2)
        }
    }

    pub fn hap1(&self) -> &str {
        &self.hap1
    }

    pub fn hap2(&self) -> &str {
        &self.hap2
    }

    pub fn diplotype(&self) -> &str {
        &self.diplotype
    }

    /// The same diplotype with the haplotypes in swapped order, e.g. "*4/*1" for "*1/*4".
    /// Useful when probing order-sensitive lookup tables.
    pub fn swapped(&self) -> Diplotype {
        Diplotype::new(&self.hap2, &self.hap1)
    }

    /// Counts how many of the two haplotypes are the wild-type allele
    pub fn wild_type_count(&self) -> usize {
        [&self.hap1, &self.hap2].iter()
            .filter(|h| h.as_str() == WILD_TYPE)
            .count()
    }
}

impl PartialEq for Diplotype {
    fn eq(&self, other: &Self) -> bool {
        // this allows for a swap in hap1/hap2 and we still report identity
        (self.hap1 == other.hap1 && self.hap2 == other.hap2) ||
            (self.hap1 == other.hap2 && self.hap2 == other.hap1)
    }
}
