//! Builds the reference and alternate haplotypes a variant is genotyped
//! against: a window of `2 * w` bases centered on one of the variant's
//! breakpoints, with the alternate bases spliced in between the flanks.

use crate::lrgt::variant::{is_symbolic_allele, SvVariant};
use crate::lrgt::workflows::Params;
use rust_htslib::faidx;

pub struct HaplotypeSet {
    pub ref_hap: Vec<u8>,
    pub alt_haps: Vec<Vec<u8>>,
}

impl HaplotypeSet {
    pub fn empty(n_alts: usize) -> HaplotypeSet {
        HaplotypeSet {
            ref_hap: Vec::new(),
            alt_haps: vec![Vec::new(); n_alts],
        }
    }

    /// All haplotypes in allele order, reference first.
    pub fn alleles(&self) -> Vec<&[u8]> {
        std::iter::once(self.ref_hap.as_slice())
            .chain(self.alt_haps.iter().map(|h| h.as_slice()))
            .collect()
    }
}

/// Reads `[beg, end)` from the reference, clamped to the contig bounds.
pub fn read_region(
    genome: &faidx::Reader,
    contig: &str,
    contig_len: i64,
    beg: i64,
    end: i64,
) -> Vec<u8> {
    let beg = beg.max(0);
    let end = end.min(contig_len);
    if beg >= end {
        return Vec::new();
    }
    match genome.fetch_seq(contig, beg as usize, end as usize - 1) {
        Ok(seq) => seq.to_ascii_uppercase(),
        Err(e) => {
            log::warn!("Error fetching {}:{}-{}: {}", contig, beg, end, e);
            Vec::new()
        }
    }
}

/// Constructs the haplotype set for `var` from a windowed region fetcher.
///
/// `fetch(beg, end)` must return reference bases over `[beg, end)`, clamped
/// to the contig. In the default mode the window is centered on the variant
/// begin; in right-breakpoint mode on the end of the reference allele.
/// Alternate alleles longer than the window contribute the `w` bases nearest
/// the centered breakpoint.
pub fn build_haplotypes<F>(fetch: F, var: &SvVariant, w: i64, params: &Params) -> HaplotypeSet
where
    F: Fn(i64, i64) -> Vec<u8>,
{
    let pos = var.pos;
    let ref_len = var.ref_len() as i64;

    let ref_hap = if params.right_breakpoint {
        fetch(pos - w + ref_len, pos + ref_len + w)
    } else {
        fetch(pos - w, pos + w)
    };

    let mut alt_haps = Vec::with_capacity(var.alt_alleles.len());
    for alt in &var.alt_alleles {
        if is_symbolic_allele(alt) {
            // no literal sequence to splice; the allele keeps its score
            // sentinel and only indel evidence speaks for it
            alt_haps.push(Vec::new());
            continue;
        }
        let alt_len = alt.len() as i64;
        let mut hap;
        if !params.right_breakpoint {
            hap = fetch(pos - w, pos);
            if alt_len < w {
                hap.extend_from_slice(alt);
                hap.extend(fetch(pos + ref_len, pos + ref_len + w - alt_len));
            } else {
                hap.extend_from_slice(&alt[..w as usize]);
            }
        } else {
            if alt_len < w {
                hap = fetch(pos - w + alt_len, pos);
                hap.extend_from_slice(alt);
            } else {
                hap = alt[(alt_len - w) as usize..].to_vec();
            }
            hap.extend(fetch(pos + ref_len, pos + ref_len + w));
        }
        alt_haps.push(hap);
    }

    HaplotypeSet { ref_hap, alt_haps }
}

/// Collapses homopolymer runs to a single base.
pub fn mask_homopolymers(seq: &[u8]) -> Vec<u8> {
    let mut masked = Vec::with_capacity(seq.len());
    for &base in seq {
        if masked.last() != Some(&base) {
            masked.push(base);
        }
    }
    masked
}
