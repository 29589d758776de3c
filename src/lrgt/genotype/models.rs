use super::AlleleSupport;
use crate::lrgt::workflows::Params;
use std::str::FromStr;

/// Genotyping model selecting how per-read evidence turns into allele
/// preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GtModel {
    /// Alignment scores against the haplotype set.
    Ad,
    /// Indel-size match between read and allele.
    Va,
    /// `Ad` and `Va` applied to the same preference vector.
    Joint,
    /// Legacy size model with support/reject fractions. Kept selectable for
    /// comparisons: a supporting read subtracts from the allele's penalty,
    /// inverting the usual larger-is-worse reading.
    VaOld,
    /// Any large indel near the locus counts against the reference.
    Presence,
    /// Run all of the above.
    Multi,
}

impl FromStr for GtModel {
    type Err = &'static str;
    fn from_str(model: &str) -> Result<Self, Self::Err> {
        match model {
            "ad" => Ok(GtModel::Ad),
            "va" => Ok(GtModel::Va),
            "joint" => Ok(GtModel::Joint),
            "va_old" => Ok(GtModel::VaOld),
            "presence" => Ok(GtModel::Presence),
            "multi" => Ok(GtModel::Multi),
            _ => Err("Invalid model. Options are: ad, va, joint, va_old, presence, multi"),
        }
    }
}

impl GtModel {
    /// Evaluation order of the primitive models under `multi`.
    pub const MULTI_ORDER: [GtModel; 5] = [
        GtModel::Ad,
        GtModel::Va,
        GtModel::Joint,
        GtModel::Presence,
        GtModel::VaOld,
    ];

    pub fn uses_alignment_counts(&self) -> bool {
        matches!(self, GtModel::Ad | GtModel::Joint)
    }

    pub fn uses_size_counts(&self) -> bool {
        matches!(self, GtModel::Va | GtModel::Joint)
    }
}

/// Inputs shared by every model invocation for one variant.
pub struct ModelInput<'a> {
    pub w: usize,
    pub ref_len: usize,
    pub alt_lens: &'a [usize],
}

/// Applies one primitive model to a read's preference vector and returns the
/// read's best allele, if the model finds one decisive. `Joint` and `Multi`
/// are composites and are expanded by the caller.
pub fn apply_model(
    model: GtModel,
    support: &AlleleSupport,
    input: &ModelInput,
    params: &Params,
    prefs: &mut [f64],
) -> Option<usize> {
    match model {
        GtModel::Ad => support.alignment_preference(input.w, params, prefs),
        GtModel::Va => support.size_preference(input.ref_len, input.alt_lens, params, prefs),
        GtModel::VaOld => {
            let mut best_i = 0;
            let mut best_score = 0.0;
            for (i, &alt_len) in input.alt_lens.iter().enumerate() {
                let supports = support.supports(input.ref_len as f64, alt_len as f64, params);
                let rejects = support.rejects(input.ref_len as f64, alt_len as f64, params);
                let score =
                    params.overlap_bits * (rejects as i32 as f64 - supports as i32 as f64);
                prefs[i + 1] += score;
                if score < best_score {
                    best_score = score;
                    best_i = i + 1;
                }
            }
            Some(best_i)
        }
        GtModel::Presence => {
            if support.is_present(params.min_present) {
                prefs[0] += params.overlap_bits;
            } else {
                prefs[1] += params.overlap_bits;
            }
            for pref in prefs.iter_mut().skip(2) {
                *pref += params.overlap_bits;
            }
            None
        }
        GtModel::Joint | GtModel::Multi => {
            unreachable!("composite models are expanded by the caller")
        }
    }
}
