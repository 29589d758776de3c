//! Per-chunk genotyping pipeline: fetch the chunk's reads once, then for
//! each variant select evidence reads, build haplotypes, align, and
//! aggregate into genotype calls.

use crate::lrgt::align::{score_alleles, AlnScoring};
use crate::lrgt::chunk::VariantChunk;
use crate::lrgt::genotype::{AlleleSupport, GenotypeCall, GtModel, ModelInput, VariantCall};
use crate::lrgt::haplotype::{build_haplotypes, mask_homopolymers, read_region, HaplotypeSet};
use crate::lrgt::reads::{crop_to_window, fetch_chunk_reads, select_reads, SvRead};
use crate::lrgt::variant::SvVariant;
use crate::utils::Result;
use rust_htslib::{bam, faidx};
use std::collections::HashMap;

pub struct Params {
    pub w_size: usize,
    pub dynamic_w_size: bool,
    pub var_window: i64,
    pub min_del_ins: usize,
    pub max_soft_clip: usize,
    pub max_reads: usize,
    pub min_mapq: u8,
    pub right_breakpoint: bool,
    pub mask_homopolymers: bool,
    pub crop_read: bool,
    pub scoring: AlnScoring,
    pub band_pct: f64,
    pub log_scale_factor: f64,
    pub max_align_bits: f64,
    pub overlap_bits: f64,
    pub alt_frac: f64,
    pub alt_frac_max: f64,
    pub ref_frac: f64,
    pub min_present: usize,
    pub gt_model: GtModel,
    pub output_ref_alt: bool,
}

/// Genotypes every variant of a chunk. Returns one entry per record, `None`
/// where the record passes through un-genotyped (symbolic alts, haplotype
/// dump mode).
pub fn analyze_chunk(
    chunk: &VariantChunk,
    params: &Params,
    bams: &mut [bam::IndexedReader],
    genome: &faidx::Reader,
    chrom_lookup: &HashMap<String, i64>,
) -> Result<Vec<Option<Vec<GenotypeCall>>>> {
    let w = chunk.effective_window(params) as i64;
    let (fetch_beg, fetch_end) = chunk.fetch_interval(w, params.right_breakpoint);
    let reads = fetch_chunk_reads(bams, &chunk.contig, fetch_beg, fetch_end)?;
    log::debug!(
        "{}:{}-{}: fetched {} reads for {} variants",
        chunk.contig,
        fetch_beg,
        fetch_end,
        reads.len(),
        chunk.variants.len()
    );

    let contig_len = chrom_lookup.get(&chunk.contig).copied();
    if contig_len.is_none() {
        log::warn!(
            "Reference FASTA has no entry for contig {}, alignment evidence unavailable",
            chunk.contig
        );
    }

    let mut verdicts = Vec::with_capacity(chunk.variants.len());
    for var in &chunk.variants {
        if var.all_alts_symbolic() {
            log::warn!(
                "{}:{}: no sequence-resolved alt allele, record passed through",
                var.contig,
                var.pos + 1
            );
            verdicts.push(None);
            continue;
        }
        verdicts.push(analyze_variant(var, &reads, w, params, genome, contig_len));
    }

    Ok(verdicts)
}

fn analyze_variant(
    var: &SvVariant,
    reads: &[SvRead],
    w: i64,
    params: &Params,
    genome: &faidx::Reader,
    contig_len: Option<i64>,
) -> Option<Vec<GenotypeCall>> {
    let (selected, supports) = select_reads(reads, var, w, params);
    log::debug!(
        "{}:{}: {} reads selected as evidence",
        var.contig,
        var.pos + 1,
        selected.len()
    );

    let mut haps = match contig_len {
        Some(contig_len) => build_haplotypes(
            |beg, end| read_region(genome, &var.contig, contig_len, beg, end),
            var,
            w,
            params,
        ),
        // missing contig: empty haplotypes keep every alignment score at the
        // sentinel and alignment evidence stays unused
        None => HaplotypeSet::empty(var.alt_alleles.len()),
    };

    if params.output_ref_alt {
        dump_haplotypes(var, &haps);
        return None;
    }

    if params.mask_homopolymers {
        haps.ref_hap = mask_homopolymers(&haps.ref_hap);
    }

    Some(genotype_variant(var, &selected, supports, &haps, w, params))
}

/// Scores every evidence read against the haplotype set and folds the
/// per-read preferences into one genotype call per requested model.
pub fn genotype_variant(
    var: &SvVariant,
    reads: &[&SvRead],
    mut supports: Vec<AlleleSupport>,
    haps: &HaplotypeSet,
    w: i64,
    params: &Params,
) -> Vec<GenotypeCall> {
    let alleles = haps.alleles();
    for (read, support) in reads.iter().zip(supports.iter_mut()) {
        let seq;
        let to_align: &[u8] = if params.crop_read {
            seq = crop_to_window(read, var, w, params);
            &seq
        } else {
            &read.bases
        };
        support.scores = score_alleles(&alleles, to_align, &params.scoring, params.band_pct);
    }

    let input = ModelInput {
        w: w as usize,
        ref_len: var.ref_len(),
        alt_lens: &var.alt_lens(),
    };

    let models: &[GtModel] = match params.gt_model {
        GtModel::Multi => &GtModel::MULTI_ORDER,
        ref model => std::slice::from_ref(model),
    };

    models
        .iter()
        .map(|&model| {
            let mut call = VariantCall::new(var.n_alleles());
            for support in &supports {
                call.record_read(support, model, &input, params);
            }
            GenotypeCall::from_call(&call)
        })
        .collect()
}

fn dump_haplotypes(var: &SvVariant, haps: &HaplotypeSet) {
    let mut line = format!(
        "{} {} {}",
        var.contig,
        var.pos + 1,
        String::from_utf8_lossy(&haps.ref_hap)
    );
    for alt in &haps.alt_haps {
        line.push(' ');
        line.push_str(&String::from_utf8_lossy(alt));
    }
    eprintln!("{}", line);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::lrgt::haplotype::build_haplotypes;
    use crate::lrgt::reads::{select_reads, tests::make_read};
    use crate::lrgt::variant::tests::make_variant;

    pub fn test_params() -> Params {
        Params {
            w_size: 50,
            dynamic_w_size: false,
            var_window: 100,
            min_del_ins: 6,
            max_soft_clip: 500,
            max_reads: 200,
            min_mapq: 30,
            right_breakpoint: false,
            mask_homopolymers: false,
            crop_read: true,
            scoring: AlnScoring {
                match_scr: 1,
                mism_scr: 1,
                gapo_scr: 1,
                gape_scr: 1,
            },
            band_pct: 25.0,
            log_scale_factor: 2.0,
            max_align_bits: 10.0,
            overlap_bits: 10.0,
            alt_frac: 0.4,
            alt_frac_max: 2.0,
            ref_frac: 0.1,
            min_present: 20,
            gt_model: GtModel::Joint,
            output_ref_alt: false,
        }
    }

    // deterministic mixed-composition contig with an A at position 1000
    fn toy_contig() -> Vec<u8> {
        const BASES: &[u8] = b"ACGTTGCAACGGTACT";
        (0..2000).map(|i| BASES[(i + 8) % BASES.len()]).collect()
    }

    fn fetcher(contig: Vec<u8>) -> impl Fn(i64, i64) -> Vec<u8> {
        move |beg: i64, end: i64| {
            let beg = beg.max(0) as usize;
            let end = (end.max(0) as usize).min(contig.len());
            if beg >= end {
                return Vec::new();
            }
            contig[beg..end].to_vec()
        }
    }

    fn run_variant(
        var: &SvVariant,
        reads: &[SvRead],
        contig: Vec<u8>,
        w: i64,
        params: &Params,
    ) -> Vec<GenotypeCall> {
        let (selected, supports) = select_reads(reads, var, w, params);
        let haps = build_haplotypes(fetcher(contig), var, w, params);
        genotype_variant(var, &selected, supports, &haps, w, params)
    }

    #[test]
    fn insertion_read_votes_for_alt_under_size_model() {
        let contig = toy_contig();
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let mut bases = contig[950..1000].to_vec();
        bases.push(b'T');
        bases.extend_from_slice(&contig[1000..1049]);
        let reads = vec![make_read("r1", 950, std::str::from_utf8(&bases).unwrap(), "50=1I49=")];

        let mut params = test_params();
        params.gt_model = GtModel::Va;
        params.var_window = 40;
        params.min_del_ins = 1;

        let calls = run_variant(&var, &reads, contig, 50, &params);
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.va, vec![0, 1, 1]);
        assert_eq!(call.alt_reads, "r1");
        assert_eq!(call.gt, (1, 1));
        assert_eq!(call.pl[2], 0);
    }

    #[test]
    fn reference_reads_genotype_as_homref_under_alignment_model() {
        let contig = toy_contig();
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let reads: Vec<SvRead> = (0..3)
            .map(|i| {
                let id = format!("r{}", i);
                make_read(
                    &id,
                    930,
                    std::str::from_utf8(&contig[930..1070]).unwrap(),
                    "140=",
                )
            })
            .collect();

        let mut params = test_params();
        params.gt_model = GtModel::Ad;
        params.var_window = 40;

        let calls = run_variant(&var, &reads, contig, 50, &params);
        let call = &calls[0];
        assert_eq!(call.gt, (0, 0));
        assert_eq!(call.ad[0], 3);
        assert_eq!(*call.ad.last().unwrap(), 3);
        assert_eq!(call.pl[0], 0);
    }

    #[test]
    fn large_insertions_drive_presence_model_to_homalt() {
        let contig = toy_contig();
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let bases = "A".repeat(150);
        let reads: Vec<SvRead> = (0..10)
            .map(|i| make_read(&format!("r{}", i), 950, &bases, "50=50I50="))
            .collect();

        let mut params = test_params();
        params.gt_model = GtModel::Presence;
        params.min_present = 20;

        let calls = run_variant(&var, &reads, contig, 50, &params);
        let call = &calls[0];
        assert_eq!(call.gt, (1, 1));
        assert_eq!(call.pl[2], 0);
        // the presence model keeps no per-allele depth counts
        assert_eq!(call.ad, vec![0, 0, 0]);
    }

    #[test]
    fn mixed_record_is_genotyped_on_its_resolvable_alt() {
        let contig = toy_contig();
        let var = make_variant("chr1", 1000, "A", &["<DEL>", "AT"]);
        let mut bases = contig[950..1000].to_vec();
        bases.push(b'T');
        bases.extend_from_slice(&contig[1000..1049]);
        let reads = vec![make_read("r1", 950, std::str::from_utf8(&bases).unwrap(), "50=1I49=")];

        let mut params = test_params();
        params.gt_model = GtModel::Va;
        params.var_window = 40;
        params.min_del_ins = 1;

        let calls = run_variant(&var, &reads, contig, 50, &params);
        let call = &calls[0];
        assert_eq!(call.va, vec![0, 0, 1, 1]);
        assert_eq!(call.gt, (2, 2));
    }

    #[test]
    fn multi_runs_every_model() {
        let contig = toy_contig();
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let reads = vec![make_read(
            "r1",
            930,
            std::str::from_utf8(&contig[930..1070]).unwrap(),
            "140=",
        )];

        let mut params = test_params();
        params.gt_model = GtModel::Multi;

        let calls = run_variant(&var, &reads, contig, 50, &params);
        assert_eq!(calls.len(), GtModel::MULTI_ORDER.len());
    }
}

