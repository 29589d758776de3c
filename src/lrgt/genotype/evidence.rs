//! Per-(read, variant) evidence record and the per-read allele preferences
//! derived from it.
//!
//! Preferences are penalties in bits: a value `x` for allele `i` means the
//! read considers that allele `2^-x` as likely as its best allele.

use crate::lrgt::align::NO_ALIGNMENT;
use crate::lrgt::workflows::Params;

/// How a single read aligns across a variant.
#[derive(Debug, Clone)]
pub struct AlleleSupport {
    pub id: String,
    /// Bases of large deletion observed inside the evidence region.
    pub n_del: usize,
    /// Bases of large insertion observed inside the evidence region.
    pub n_ins: usize,
    /// Local alignment score per allele, reference at index 0.
    pub scores: Vec<i32>,
    /// Read carries an oversized terminal clip on the breakpoint side.
    pub soft_clipped: bool,
    /// Alignment extends beyond the evidence region on the left.
    pub aligns_left: bool,
    /// Alignment extends beyond the evidence region on the right.
    pub aligns_right: bool,
}

impl AlleleSupport {
    pub fn new(id: &str, n_alleles: usize) -> AlleleSupport {
        AlleleSupport {
            id: id.to_string(),
            n_del: 0,
            n_ins: 0,
            scores: vec![NO_ALIGNMENT; n_alleles],
            soft_clipped: false,
            aligns_left: false,
            aligns_right: false,
        }
    }

    pub fn n_alleles(&self) -> usize {
        self.scores.len()
    }

    pub fn spans_region(&self) -> bool {
        self.aligns_left && self.aligns_right
    }

    pub fn is_present(&self, min_present: usize) -> bool {
        self.n_ins >= min_present || self.n_del >= min_present
    }

    /// Alternate allele is supported as judged from the alignment record.
    /// The indel arithmetic is simplistic when ref and alt are of similar
    /// size.
    pub fn supports(&self, ref_len: f64, alt_len: f64, params: &Params) -> bool {
        if alt_len > ref_len {
            (self.spans_region()
                && (self.n_ins as f64) > alt_len * params.alt_frac
                && (self.n_ins as f64) < alt_len * params.alt_frac_max)
                || self.soft_clipped
        } else {
            (self.spans_region()
                && (self.n_del as f64) > ref_len * params.alt_frac
                && (self.n_del as f64) < ref_len * params.alt_frac_max)
                || self.soft_clipped
        }
    }

    /// Alternate allele is rejected as judged from the alignment record.
    pub fn rejects(&self, ref_len: f64, alt_len: f64, params: &Params) -> bool {
        if alt_len > ref_len {
            self.spans_region()
                && (self.n_ins as f64) < alt_len * params.ref_frac
                && !self.soft_clipped
        } else {
            self.spans_region()
                && (self.n_del as f64) < ref_len * params.ref_frac
                && !self.soft_clipped
        }
    }

    /// Adds the alignment-score preference of this read to `prefs` and
    /// returns the most likely allele, if the scores are usable at all.
    ///
    /// Scores at or below `1.2 * w` are indistinguishable from noise and are
    /// treated like missing scores.
    pub fn alignment_preference(
        &self,
        w: usize,
        params: &Params,
        prefs: &mut [f64],
    ) -> Option<usize> {
        let min_align_score = (w as f64 * 1.2) as i32;

        let mut max_score = self.scores[0];
        let mut max_i = 0;
        for (i, &score) in self.scores.iter().enumerate() {
            if score > max_score {
                max_score = score;
                max_i = i;
            }
        }

        if max_score == NO_ALIGNMENT || max_score <= min_align_score {
            return None;
        }

        for (i, &score) in self.scores.iter().enumerate() {
            let mut d = if score == NO_ALIGNMENT || score <= min_align_score {
                (max_score - min_align_score) as f64 / params.log_scale_factor
            } else {
                (max_score - score) as f64 / params.log_scale_factor
            };
            if d > params.max_align_bits {
                d = params.max_align_bits;
            }
            if d < 0.0 {
                log::warn!("{}: negative alignment preference {}", self.id, d);
                d = 0.0;
            }
            prefs[i] += d;
        }

        Some(max_i)
    }

    /// Adds the indel-size preference of this read to `prefs` and returns
    /// the allele whose length delta best matches the observed insertions
    /// and deletions. The reference competes with a delta of zero.
    pub fn size_preference(
        &self,
        ref_len: usize,
        alt_lens: &[usize],
        params: &Params,
        prefs: &mut [f64],
    ) -> Option<usize> {
        if self.soft_clipped {
            // does not support the reference, all other alleles are equally
            // likely
            prefs[0] += params.overlap_bits;
            return None;
        }

        if !self.spans_region() {
            return None;
        }

        let ins_del = self.n_ins as i64 - self.n_del as i64;
        let mut min_delta = ins_del.abs();
        let mut min_i = 0;

        for (i, &alt_len) in alt_lens.iter().enumerate() {
            let delta = alt_len as i64 - ref_len as i64;
            if (delta - ins_del).abs() < min_delta {
                min_i = i + 1;
                min_delta = (delta - ins_del).abs();
            }
        }

        for (i, pref) in prefs.iter_mut().enumerate() {
            if i != min_i {
                *pref += params.overlap_bits;
            }
        }

        Some(min_i)
    }
}
