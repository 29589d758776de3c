//! Scans a read's CIGAR for evidence of supporting a variant, before any
//! alignment against the haplotype set is attempted.

use super::{cigar::CigarOp, SvRead};
use crate::lrgt::genotype::AlleleSupport;
use crate::lrgt::variant::SvVariant;
use crate::lrgt::workflows::Params;

/// Reference interval over which large insertions and deletions count as
/// evidence. Starts as the variant's span padded by `var_window` and widens
/// to any tandem-repeat or region coordinates the record carries.
pub fn evidence_region(var: &SvVariant, var_window: i64) -> (i64, i64) {
    let mut region_beg = var.pos - var_window;
    let mut region_end = var.pos + var.ref_len() as i64 + var_window;

    for val in [var.trr_begin, var.reg_begin].into_iter().flatten() {
        region_beg = region_beg.min(val - var_window);
    }
    for val in [var.trr_end, var.reg_end].into_iter().flatten() {
        region_end = region_end.max(val + var_window);
    }

    (region_beg, region_end)
}

pub fn examine_alignment(read: &SvRead, var: &SvVariant, params: &Params) -> AlleleSupport {
    let mut support = AlleleSupport::new(&read.id, var.n_alleles());
    let (region_beg, region_end) = evidence_region(var, params.var_window);

    let mut align_pos = read.begin_pos;
    let mut cigar_i = 0;

    if align_pos < region_beg {
        support.aligns_left = true;
    }

    // Find the first operation that overlaps the evidence region
    let mut last_op = None;
    while align_pos < region_beg && cigar_i < read.cigar.len() {
        let op = read.cigar[cigar_i];
        if matches!(
            op,
            CigarOp::Match(_) | CigarOp::Equal(_) | CigarOp::Diff(_) | CigarOp::Del(_)
        ) {
            align_pos += op.len() as i64;
        }
        last_op = Some(op);
        cigar_i += 1;
    }

    // A deletion that started before the region counts with the deleted
    // bases that fall inside it
    if align_pos > region_beg
        && matches!(last_op, Some(CigarOp::Del(_)))
        && align_pos - region_beg >= params.min_del_ins as i64
    {
        support.n_del = (align_pos - region_beg) as usize;
    }

    while align_pos < region_end && cigar_i < read.cigar.len() {
        let op = read.cigar[cigar_i];
        match op {
            CigarOp::Del(count) => {
                if count as usize >= params.min_del_ins {
                    support.n_del += count as usize;
                }
                align_pos += count as i64;
            }
            CigarOp::Match(count) | CigarOp::Equal(count) | CigarOp::Diff(count) => {
                align_pos += count as i64;
            }
            CigarOp::Ins(count) => {
                if count as usize >= params.min_del_ins {
                    support.n_ins += count as usize;
                }
            }
            CigarOp::SoftClip(count) => {
                if count as usize > params.max_soft_clip {
                    if !params.right_breakpoint {
                        if cigar_i == read.cigar.len() - 1 {
                            support.soft_clipped = true;
                        }
                    } else if cigar_i == 0 {
                        support.soft_clipped = true;
                    }
                }
            }
            CigarOp::HardClip(_) => {}
            _ => {
                log::warn!("{}: unhandled CIGAR operation {}", read.id, op);
            }
        }
        cigar_i += 1;
    }

    if align_pos > region_end {
        support.aligns_right = true;
    }

    log::debug!(
        "examined {}: nD={} nI={} soft_clipped={}",
        read.id,
        support.n_del,
        support.n_ins,
        support.soft_clipped
    );

    support
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrgt::reads::tests::make_read;
    use crate::lrgt::variant::tests::make_variant;
    use crate::lrgt::workflows::tests::test_params;

    #[test]
    fn insertion_read_anchors_both_sides() {
        // 1 bp insertion at pos 1000, read covers 950..1049
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let read = make_read("r1", 950, &("A".repeat(50) + "T" + &"A".repeat(49)), "50=1I49=");
        let mut params = test_params();
        params.var_window = 40;
        params.min_del_ins = 1;

        let support = examine_alignment(&read, &var, &params);
        assert!(support.aligns_left);
        assert!(support.aligns_right);
        assert_eq!(support.n_ins, 1);
        assert_eq!(support.n_del, 0);
        assert!(!support.soft_clipped);
    }

    #[test]
    fn perfect_match_read_has_no_indel_evidence() {
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let read = make_read("r1", 950, &"A".repeat(100), "100=");
        let mut params = test_params();
        params.var_window = 40;
        params.min_del_ins = 1;

        let support = examine_alignment(&read, &var, &params);
        assert!(support.aligns_left && support.aligns_right);
        assert_eq!(support.n_ins, 0);
        assert_eq!(support.n_del, 0);
    }

    #[test]
    fn short_indels_below_threshold_are_ignored() {
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let read = make_read("r1", 950, &"A".repeat(100), "40=3I30=4D27=");
        let mut params = test_params();
        params.var_window = 40;
        params.min_del_ins = 5;

        let support = examine_alignment(&read, &var, &params);
        assert_eq!(support.n_ins, 0);
        assert_eq!(support.n_del, 0);
    }

    #[test]
    fn deletion_overhanging_region_start_is_seeded() {
        // 30D starting at 955 runs past the region start at 980
        let var = make_variant("chr1", 1000, "A", &["A"]);
        let read = make_read("r1", 950, &"A".repeat(60), "5=30D55=");
        let mut params = test_params();
        params.var_window = 20;
        params.min_del_ins = 1;

        let support = examine_alignment(&read, &var, &params);
        assert_eq!(support.n_del, 5); // 980..985 inside the region
    }

    #[test]
    fn terminal_soft_clip_marks_breakpoint_side_only() {
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let bases = "A".repeat(120);
        let mut params = test_params();
        params.var_window = 40;
        params.max_soft_clip = 10;

        // trailing clip: flagged in left-breakpoint mode
        let read = make_read("r1", 950, &bases, "70=50S");
        let support = examine_alignment(&read, &var, &params);
        assert!(support.soft_clipped);

        // leading clip: only flagged in right-breakpoint mode, but the walk
        // skips leading ops before the region, so a short read stays clean
        let read = make_read("r2", 990, &bases, "50S70=");
        let support = examine_alignment(&read, &var, &params);
        assert!(!support.soft_clipped);
    }

    #[test]
    fn region_widens_to_tandem_repeat_coordinates() {
        let mut var = make_variant("chr1", 1000, "A", &["AT"]);
        var.trr_begin = Some(900);
        var.trr_end = Some(1100);
        let params = test_params();

        let (beg, end) = evidence_region(&var, params.var_window);
        assert_eq!(beg, 900 - params.var_window);
        assert_eq!(end, 1100 + params.var_window);
    }
}
