//! Banded local alignment of a (cropped) read against the haplotype set.

use bio::alignment::pairwise::banded;

/// Reserved "no usable score" value. Local alignment scores are
/// non-negative, so the aligner can never produce it.
pub const NO_ALIGNMENT: i32 = -10_000;

/// K-mer length used to seed the alignment band.
const BAND_KMER_LEN: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct AlnScoring {
    pub match_scr: i32,
    pub mism_scr: i32,
    pub gapo_scr: i32,
    pub gape_scr: i32,
}

/// Scores `read` against every haplotype, reference first. Alleles without a
/// usable target (an empty haplotype, or an empty read) keep `NO_ALIGNMENT`.
///
/// The band spans `band_pct` percent of the longer sequence; widening it
/// towards 100 recovers the unbanded score at quadratic cost.
pub fn score_alleles(
    haps: &[&[u8]],
    read: &[u8],
    scoring: &AlnScoring,
    band_pct: f64,
) -> Vec<i32> {
    let band_fac = band_pct.min(100.0) / 100.0;
    let match_fn = |a: u8, b: u8| {
        if a == b {
            scoring.match_scr
        } else {
            -scoring.mism_scr
        }
    };

    haps.iter()
        .map(|hap| {
            if hap.is_empty() || read.is_empty() {
                return NO_ALIGNMENT;
            }
            let band_width = ((hap.len().max(read.len()) as f64) * band_fac) as usize;
            let mut aligner = banded::Aligner::with_capacity(
                read.len(),
                hap.len(),
                -scoring.gapo_scr,
                -scoring.gape_scr,
                match_fn,
                BAND_KMER_LEN,
                band_width.max(1),
            );
            aligner.local(read, hap).score
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scoring() -> AlnScoring {
        AlnScoring {
            match_scr: 1,
            mism_scr: 1,
            gapo_scr: 1,
            gape_scr: 1,
        }
    }

    // deterministic mixed-composition sequence so k-mer seeding works
    fn window_seq(len: usize) -> Vec<u8> {
        const BASES: &[u8] = b"ACGTTGCAACGGTACT";
        (0..len).map(|i| BASES[i % BASES.len()]).collect()
    }

    #[test]
    fn identical_sequences_score_full_length() {
        let hap = window_seq(100);
        let scores = score_alleles(&[&hap], &hap, &scoring(), 25.0);
        assert_eq!(scores, vec![100]);
    }

    #[test]
    fn read_matching_one_allele_scores_it_highest() {
        let ref_hap = window_seq(100);
        let mut alt_hap = ref_hap.clone();
        alt_hap.insert(50, b'T');
        alt_hap.pop();

        let read = ref_hap.clone();
        let scores = score_alleles(&[&ref_hap, &alt_hap], &read, &scoring(), 25.0);
        assert_eq!(scores[0], 100);
        assert!(scores[1] < scores[0]);
        assert!(scores.iter().all(|&s| s != NO_ALIGNMENT));
    }

    #[test]
    fn empty_haplotype_keeps_sentinel() {
        let read = window_seq(100);
        let empty: &[u8] = &[];
        let scores = score_alleles(&[empty, &read], &read, &scoring(), 25.0);
        assert_eq!(scores[0], NO_ALIGNMENT);
        assert_eq!(scores[1], 100);
    }

    #[test]
    fn scores_are_never_negative() {
        let hap = window_seq(60);
        let read: Vec<u8> = window_seq(60).iter().rev().copied().collect();
        let scores = score_alleles(&[&hap], &read, &scoring(), 25.0);
        assert!(scores[0] >= 0);
    }
}
