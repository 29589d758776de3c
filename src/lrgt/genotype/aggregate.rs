//! Aggregates per-read allele preferences into relative diploid genotype
//! likelihoods and per-allele read counts.

use super::models::{apply_model, GtModel, ModelInput};
use super::AlleleSupport;
use crate::lrgt::workflows::Params;

/// A read only contributes to the genotype likelihoods when its preferences
/// separate the alleles by more than this many bits.
const MIN_PREF_DIFF: f64 = 2.0;

/// Penalty table over diploid genotypes plus supporting read counts for one
/// variant under one genotyping model.
///
/// `penalties[gt]` indexes unordered allele pairs `(a1, a2 <= a1)` in
/// canonical order; larger values mean less likely. The last slot of `ad`
/// and `va` counts every overlapping read.
#[derive(Debug, Clone)]
pub struct VariantCall {
    pub n_alleles: usize,
    pub penalties: Vec<f64>,
    pub ad: Vec<usize>,
    pub va: Vec<usize>,
    pub va_ids: Vec<Vec<String>>,
}

impl VariantCall {
    pub fn new(n_alleles: usize) -> VariantCall {
        VariantCall {
            n_alleles,
            penalties: vec![0.0; n_alleles * (n_alleles + 1) / 2],
            ad: vec![0; n_alleles + 1],
            va: vec![0; n_alleles + 1],
            va_ids: vec![Vec::new(); n_alleles + 1],
        }
    }

    /// Folds one read's evidence into the table under `model`. Composite
    /// models are expanded here so each primitive model can update its own
    /// counters.
    pub fn record_read(
        &mut self,
        support: &AlleleSupport,
        model: GtModel,
        input: &ModelInput,
        params: &Params,
    ) {
        debug_assert_eq!(support.n_alleles(), self.n_alleles);
        let mut prefs = vec![0.0; self.n_alleles];

        if model.uses_alignment_counts() {
            let best = apply_model(GtModel::Ad, support, input, params, &mut prefs);
            if let Some(best) = best {
                self.ad[best] += 1;
            }
            *self.ad.last_mut().unwrap() += 1;
        }

        if model.uses_size_counts() {
            let best = apply_model(GtModel::Va, support, input, params, &mut prefs);
            if let Some(best) = best {
                self.va[best] += 1;
                self.va_ids[best].push(support.id.clone());
            }
            *self.va.last_mut().unwrap() += 1;
            log::debug!(
                "va {} nD={} nI={} best={:?}",
                support.id,
                support.n_del,
                support.n_ins,
                best
            );
        }

        if model == GtModel::VaOld {
            let best = apply_model(GtModel::VaOld, support, input, params, &mut prefs);
            if let Some(best) = best {
                self.va[best] += 1;
            }
            *self.va.last_mut().unwrap() += 1;
        }

        if model == GtModel::Presence {
            apply_model(GtModel::Presence, support, input, params, &mut prefs);
        }

        self.accumulate(&mut prefs);
    }

    fn accumulate(&mut self, prefs: &mut [f64]) {
        let min_pref = prefs.iter().cloned().fold(f64::MAX, f64::min);
        let max_pref = prefs.iter().cloned().fold(f64::MIN, f64::max);
        for pref in prefs.iter_mut() {
            *pref -= min_pref;
        }

        if max_pref - min_pref <= MIN_PREF_DIFF {
            return;
        }

        let mut gt = 0;
        for a1 in 0..self.n_alleles {
            for a2 in 0..=a1 {
                let (pa, pb) = (prefs[a1], prefs[a2]);
                self.penalties[gt] += if a1 == a2 || pa == pb {
                    pa
                } else if (pa - pb).abs() > MIN_PREF_DIFF {
                    pa.min(pb) + 1.0
                } else {
                    (pa + pb) / 2.0
                };
                gt += 1;
            }
        }
    }
}
