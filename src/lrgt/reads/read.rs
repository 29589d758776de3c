//! Representation of an aligned long read, built from a BAM record.

use super::cigar::{CigarOp, CigarOpExt};
use rust_htslib::bam;
use std::str;

#[derive(Debug, PartialEq, Clone)]
pub struct SvRead {
    /// Unique identifier for the read.
    pub id: String,
    /// 0-based reference position where the alignment starts.
    pub begin_pos: i64,
    /// Vector of bases (nucleotides) in the read.
    pub bases: Vec<u8>,
    /// CIGAR operations of the alignment.
    pub cigar: Vec<CigarOp>,
    /// Mapping quality score.
    pub mapq: u8,
    pub is_duplicate: bool,
    pub is_qc_fail: bool,
}

impl SvRead {
    pub fn from_hts_rec(rec: &bam::Record) -> SvRead {
        let id = str::from_utf8(rec.qname()).unwrap().to_string();
        SvRead {
            id,
            begin_pos: rec.pos(),
            bases: rec.seq().as_bytes(),
            cigar: rec.cigar().take().to_vec(),
            mapq: rec.mapq(),
            is_duplicate: rec.is_duplicate(),
            is_qc_fail: rec.is_quality_check_failed(),
        }
    }

    /// Number of reference bases covered by the alignment.
    pub fn ref_span(&self) -> i64 {
        self.cigar.iter().map(|op| op.ref_len()).sum()
    }

    pub fn is_hard_clipped(&self) -> bool {
        matches!(self.cigar.first(), Some(CigarOp::HardClip(_)))
            || matches!(self.cigar.last(), Some(CigarOp::HardClip(_)))
    }

    /// Length of the terminal soft clip facing the breakpoint: the leading
    /// clip when genotyping the left breakpoint is off the table, i.e. the
    /// first operation in right-breakpoint mode, the last one otherwise.
    pub fn breakpoint_clip_len(&self, right_breakpoint: bool) -> u32 {
        let op = if right_breakpoint {
            self.cigar.first()
        } else {
            self.cigar.last()
        };
        match op {
            Some(CigarOp::SoftClip(len)) => *len,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lrgt::reads::tests::make_read;

    #[test]
    fn ref_span_counts_reference_consuming_ops() {
        let read = make_read("r1", 100, &"A".repeat(20), "5S10=3D5=");
        assert_eq!(read.ref_span(), 18);
    }

    #[test]
    fn hard_clip_detected_at_either_end() {
        let read = make_read("r1", 100, &"A".repeat(10), "10=5H");
        assert!(read.is_hard_clipped());
        let read = make_read("r1", 100, &"A".repeat(10), "5H10=");
        assert!(read.is_hard_clipped());
        let read = make_read("r1", 100, &"A".repeat(10), "10=");
        assert!(!read.is_hard_clipped());
    }

    #[test]
    fn breakpoint_clip_side_follows_anchor_mode() {
        let read = make_read("r1", 100, &"A".repeat(30), "10S10=10S");
        assert_eq!(read.breakpoint_clip_len(false), 10);
        assert_eq!(read.breakpoint_clip_len(true), 10);

        let read = make_read("r1", 100, &"A".repeat(25), "10=15S");
        assert_eq!(read.breakpoint_clip_len(false), 15);
        assert_eq!(read.breakpoint_clip_len(true), 0);
    }
}
