//! Turns an aggregated penalty table into the emitted genotype fields.

use super::VariantCall;
use itertools::Itertools;
use std::fmt;

/// Relative log-likelihoods below this are reported as the floor.
const LL_THRESHOLD: f64 = -25.5;
/// log2(10), converting bits to phred decades.
const LG10: f64 = 3.322;

/// One genotype column: `GT:AD:VA:PL:REFREADS:ALTREADS`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeCall {
    /// Unordered allele pair, emitted as `gt.0/gt.1`.
    pub gt: (usize, usize),
    pub ad: Vec<usize>,
    pub va: Vec<usize>,
    pub pl: Vec<i32>,
    pub ref_reads: String,
    pub alt_reads: String,
}

impl GenotypeCall {
    /// Picks the most likely diploid genotype from the penalty table.
    ///
    /// The table stores penalties; likelihoods are their negation, and the
    /// maximum is found while walking the canonical `(a1, a2 <= a1)` order
    /// so ties resolve to the earliest pair.
    pub fn from_call(call: &VariantCall) -> GenotypeCall {
        let lls = call.penalties.iter().map(|p| -p).collect_vec();

        let mut max_ll = lls[0];
        let (mut a1, mut a2) = (0, 0);
        let (mut max_a1, mut max_a2) = (0, 0);
        for &ll in &lls {
            if ll > max_ll {
                max_ll = ll;
                max_a1 = a1;
                max_a2 = a2;
            }
            if a2 < a1 {
                a2 += 1;
            } else {
                a1 += 1;
                a2 = 0;
            }
        }

        let pl = lls
            .iter()
            .map(|&ll| {
                let lp = ((ll - max_ll) / LG10).max(LL_THRESHOLD);
                (-10.0 * lp) as i32
            })
            .collect_vec();

        GenotypeCall {
            gt: (max_a2, max_a1),
            ad: call.ad.clone(),
            va: call.va.clone(),
            pl,
            ref_reads: join_ids(&call.va_ids[0]),
            alt_reads: join_ids(&call.va_ids[1]),
        }
    }
}

fn join_ids(ids: &[String]) -> String {
    if ids.is_empty() {
        ".".to_string()
    } else {
        ids.iter().join(",")
    }
}

impl fmt::Display for GenotypeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}:{}:{}:{}:{}:{}",
            self.gt.0,
            self.gt.1,
            self.ad.iter().join(","),
            self.va.iter().join(","),
            self.pl.iter().join(","),
            self.ref_reads,
            self.alt_reads
        )
    }
}
