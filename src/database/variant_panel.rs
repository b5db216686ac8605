
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use simple_error::SimpleError;
use std::collections::BTreeMap;

// gene names to prevent dev typos
pub const CYP2D6: &str = "CYP2D6";
pub const DPYD: &str = "DPYD";
pub const UGT1A1: &str = "UGT1A1";

lazy_static! {
    /// The built-in panel matching the genotyping instrument this tool was written for.
    /// Each entry maps a variant label to the raw base codes that indicate presence of
    /// that variant; "_" is the deletion code reported by the instrument.
    pub static ref DEFAULT_VARIANT_PANEL: VariantPanel = {
        let panel = [
            (CYP2D6, vec![
                ("3", vec!["_"]),
                ("4", vec!["T"]),
                ("6", vec!["_"]),
                ("7", vec!["G"]),
                ("8", vec!["A"]),
                ("9", vec!["_"]),
                ("10*4", vec!["A"]),
                ("10", vec!["G"]),
                ("12", vec!["T"]),
                ("14", vec!["T"]),
                ("15", vec!["_"]),
                ("17", vec!["A"]),
                ("19", vec!["_"]),
                ("29", vec!["A"]),
                ("41", vec!["T"]),
                ("56B", vec!["A"]),
                ("59", vec!["T"])
            ]),
            (UGT1A1, vec![
                ("80", vec!["T"])
            ]),
            (DPYD, vec![
                ("2A", vec!["G", "T"]),
                ("13", vec!["C", "T"]),
                ("HapB3", vec!["T"]),
                ("D949V", vec!["A"])
            ])
        ];
        let gene_variants = panel.into_iter()
            .map(|(gene, variants)| {
                let variant_map = variants.into_iter()
                    .map(|(label, bases)| {
                        (label.to_string(), bases.into_iter().map(|b| b.to_string()).collect())
                    })
                    .collect();
                (gene.to_string(), variant_map)
            })
            .collect();
        VariantPanel { gene_variants }
    };
}

/// The static reference table driving assay decomposition: for each (gene, variant label)
/// it lists the raw base codes that indicate the probed variant. Loaded once, read-only.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VariantPanel {
    /// Map from gene name to variant label to indicator base codes
    gene_variants: BTreeMap<String, BTreeMap<String, Vec<String>>>
}

impl VariantPanel {
    /// Validates a panel after loading it from a user-provided file.
    /// # Errors
    /// * if a gene has no variants or a variant has no indicator bases
    pub fn validate(&self) -> Result<(), SimpleError> {
        if self.gene_variants.is_empty() {
            return Err(SimpleError::new("Variant panel contains no genes"));
        }
        for (gene, variants) in self.gene_variants.iter() {
            if variants.is_empty() {
                return Err(SimpleError::new(format!("Variant panel gene {gene} has no variants")));
            }
            for (label, bases) in variants.iter() {
                if bases.is_empty() {
                    return Err(SimpleError::new(format!("Variant {gene} {label:?} has no indicator bases")));
                }
            }
        }
        Ok(())
    }

    /// True if the panel has an entry for this (gene, variant label) pair
    pub fn contains(&self, gene: &str, variant_label: &str) -> bool {
        self.gene_variants.get(gene)
            .map(|variants| variants.contains_key(variant_label))
            .unwrap_or(false)
    }

    /// True if the observed base indicates presence of the probed variant.
    /// Unknown (gene, label) pairs never match; callers are expected to have
    /// verified panel membership when the assay columns were parsed.
    pub fn is_indicator(&self, gene: &str, variant_label: &str, base: &str) -> bool {
        self.gene_variants.get(gene)
            .and_then(|variants| variants.get(variant_label))
            .map(|bases| bases.iter().any(|b| b == base))
            .unwrap_or(false)
    }

    pub fn genes(&self) -> impl Iterator<Item = &String> {
        self.gene_variants.keys()
    }

    pub fn gene_count(&self) -> usize {
        self.gene_variants.len()
    }

    /// The number of variants probed for a gene, 0 if the gene is absent
    pub fn variant_count(&self, gene: &str) -> usize {
        self.gene_variants.get(gene)
            .map(|variants| variants.len())
            .unwrap_or(0)
    }
}
