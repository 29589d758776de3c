//! Fetches reads over a chunk's genomic interval and selects, per variant,
//! the records that qualify as genotyping evidence.

use super::{examine::examine_alignment, SvRead};
use crate::lrgt::genotype::AlleleSupport;
use crate::lrgt::variant::SvVariant;
use crate::lrgt::workflows::Params;
use crate::utils::Result;
use rust_htslib::bam::{self, Read, Record};
use std::collections::HashMap;

/// Fetches all records overlapping `[beg, end)` from every BAM. BAMs without
/// the contig are quietly ignored. The merged list is position-sorted so the
/// per-variant selection can stop early.
pub fn fetch_chunk_reads(
    bams: &mut [bam::IndexedReader],
    contig: &str,
    beg: i64,
    end: i64,
) -> Result<Vec<SvRead>> {
    let mut reads = Vec::new();

    for bam in bams.iter_mut() {
        let tid = bam.header().tid(contig.as_bytes());
        let tid = match tid {
            Some(tid) => tid,
            None => {
                log::debug!("Contig {} absent from BAM header, skipping file", contig);
                continue;
            }
        };

        if let Err(msg) = bam.fetch((tid, beg, end)) {
            log::warn!("Fetch error: {}", msg);
            continue;
        }

        let mut record = Record::new();
        while let Some(result) = bam.read(&mut record) {
            match result {
                Ok(()) => reads.push(SvRead::from_hts_rec(&record)),
                Err(err) => return Err(err.to_string()),
            }
        }
    }

    if bams.len() > 1 {
        reads.sort_by_key(|r| r.begin_pos);
    }

    Ok(reads)
}

/// Walks the position-sorted reads and keeps those usable as evidence for
/// `var`, paired with their CIGAR-derived support records.
///
/// A read is kept when it reaches back to the window begin, meets the
/// mapping-quality bar, and is not a duplicate, QC failure, hard-clipped
/// alignment, or over-clipped on the breakpoint side. Repeated alignments of
/// one read replace each other, keeping the record seen last.
pub fn select_reads<'a>(
    reads: &'a [SvRead],
    var: &SvVariant,
    w: i64,
    params: &Params,
) -> (Vec<&'a SvRead>, Vec<AlleleSupport>) {
    let mut beg = var.pos - w;
    let mut end = var.pos + w;
    if params.right_breakpoint {
        beg += var.ref_len() as i64;
        end += var.ref_len() as i64;
    }
    let stop_reading = if params.right_breakpoint { end } else { beg };

    let mut selected: Vec<&SvRead> = Vec::new();
    let mut supports: Vec<AlleleSupport> = Vec::new();
    let mut name_cache: HashMap<&str, usize> = HashMap::new();

    for read in reads {
        if selected.len() >= params.max_reads || read.begin_pos > stop_reading {
            break;
        }

        // Ignore the read if it does not stretch to the window
        if read.begin_pos + (read.bases.len() as i64) < beg
            || read.begin_pos + read.ref_span() < beg
            || read.mapq < params.min_mapq
        {
            continue;
        }

        let support = examine_alignment(read, var, params);

        if read.begin_pos >= end {
            break;
        }

        let clip_len = read.breakpoint_clip_len(params.right_breakpoint) as usize;
        if clip_len > params.max_soft_clip {
            log::debug!(
                "{}: removed for {} bp terminal clip on breakpoint side",
                read.id,
                clip_len
            );
            continue;
        }
        if read.is_hard_clipped() {
            log::debug!("{}: hard-clipped at {}, removed", read.id, read.begin_pos);
            continue;
        }
        if read.is_duplicate || read.is_qc_fail {
            log::debug!("{}: flagged duplicate or QC fail, removed", read.id);
            continue;
        }

        // prevent multiple alignments of the same read from being used
        match name_cache.get(read.id.as_str()) {
            Some(&index) => {
                selected[index] = read;
                supports[index] = support;
            }
            None => {
                name_cache.insert(read.id.as_str(), selected.len());
                selected.push(read);
                supports.push(support);
            }
        }
    }

    (selected, supports)
}
