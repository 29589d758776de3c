//! Crops a read's sequence down to the window the aligner consumes.

use super::{cigar::CigarOp, SvRead};
use crate::lrgt::variant::SvVariant;
use crate::lrgt::workflows::Params;

/// Extracts the sub-sequence of `read` covering the variant window.
///
/// Walks the CIGAR until the reference position reaches the window edge
/// (left edge in left-breakpoint mode, right edge otherwise), then maps the
/// window back onto read coordinates. Normally returns `2 * w` bases; less
/// near the ends of the read.
pub fn crop_to_window(read: &SvRead, var: &SvVariant, w: i64, params: &Params) -> Vec<u8> {
    if read.bases.is_empty() {
        return Vec::new();
    }

    let mut align_pos = read.begin_pos;
    let mut read_pos: i64 = 0;
    let mut last_read_pos: i64 = 0;
    let mut cigar_i = 0;
    let mut last_op = read.cigar.first().copied();

    let mut search_pos = var.pos - w;
    if params.right_breakpoint {
        search_pos = var.pos + var.ref_len() as i64 + w;
    }
    search_pos = search_pos.max(0);

    while align_pos < search_pos && cigar_i < read.cigar.len() {
        last_read_pos = read_pos;
        let op = read.cigar[cigar_i];
        match op {
            CigarOp::Del(count) => align_pos += count as i64,
            CigarOp::Match(count) | CigarOp::Equal(count) | CigarOp::Diff(count) => {
                align_pos += count as i64;
                read_pos += count as i64;
            }
            CigarOp::SoftClip(count) | CigarOp::Ins(count) => read_pos += count as i64,
            CigarOp::HardClip(_) => {}
            _ => log::warn!("{}: unhandled CIGAR operation {}", read.id, op),
        }
        last_op = Some(op);
        cigar_i += 1;
    }

    // The window must not extend into a terminal clip
    if matches!(last_op, Some(CigarOp::SoftClip(_)) | Some(CigarOp::HardClip(_))) {
        read_pos = last_read_pos;
    }

    let mut r_beg;
    let mut r_end;
    if params.right_breakpoint {
        if align_pos >= search_pos - 2 * w {
            let r_shift = search_pos - align_pos;
            r_beg = read_pos - 2 * w + r_shift;
            r_end = read_pos + r_shift;
        } else {
            // clipped alignment never got near the breakpoint
            r_beg = read_pos;
            r_end = read_pos + w;
            log::debug!("{}: alignment ends {} before crop point", read.id, search_pos - align_pos);
        }
    } else {
        let r_shift = align_pos - search_pos;
        if r_shift < 0 {
            log::debug!("{}: alignment ends {} before the window edge", read.id, -r_shift);
        }
        r_beg = read_pos - r_shift;
        r_end = read_pos + 2 * w - r_shift;
    }

    let seq_len = read.bases.len() as i64;
    if r_beg < 0 {
        r_beg = 0;
    }
    if r_end < 2 * w {
        r_end = 2 * w;
    }
    if r_end > seq_len {
        r_end = seq_len;
    }
    if r_beg > r_end {
        r_beg = r_end;
    }
    // A window collapsed by the clamps above is widened by one base so the
    // aligner never sees an empty slice
    if r_end == r_beg {
        if r_beg > 0 {
            r_beg -= 1;
        } else {
            r_end += 1;
        }
    }

    read.bases[r_beg as usize..r_end as usize].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrgt::reads::tests::make_read;
    use crate::lrgt::variant::tests::make_variant;
    use crate::lrgt::workflows::tests::test_params;

    #[test]
    fn spanning_read_yields_full_window() {
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let bases = "C".repeat(20) + &"A".repeat(100) + &"G".repeat(20);
        let read = make_read("r1", 930, &bases, "140=");
        let params = test_params();

        // window edge at 950 -> read offset 20, crop of 2 * 50 bases
        let cropped = crop_to_window(&read, &var, 50, &params);
        assert_eq!(cropped.len(), 100);
        assert_eq!(cropped, bases.as_bytes()[20..120].to_vec());
    }

    #[test]
    fn crop_is_clamped_at_read_start() {
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let read = make_read("r1", 980, &"A".repeat(100), "100=");
        let params = test_params();

        // read starts 30 bases into the window
        let cropped = crop_to_window(&read, &var, 50, &params);
        assert_eq!(cropped.len(), 100);
    }

    #[test]
    fn insertion_keeps_read_coordinates_in_step() {
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let bases = "A".repeat(50) + "T" + &"A".repeat(49);
        let read = make_read("r1", 950, &bases, "50=1I49=");
        let params = test_params();

        let cropped = crop_to_window(&read, &var, 50, &params);
        assert_eq!(cropped, bases.as_bytes());
    }

    #[test]
    fn right_breakpoint_crops_up_to_the_crop_point() {
        let mut var = make_variant("chr1", 1000, "A", &["AT"]);
        var.ref_allele = b"A".to_vec();
        let bases = "A".repeat(200);
        let read = make_read("r1", 900, &bases, "200=");
        let mut params = test_params();
        params.right_breakpoint = true;

        // search pos = 1000 + 1 + 50 = 1051; read offset 151
        let cropped = crop_to_window(&read, &var, 50, &params);
        assert_eq!(cropped.len(), 100);
    }

    #[test]
    fn terminal_soft_clip_rewinds_crop_point() {
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        // alignment ends at 920, before the window edge; the walk consumes
        // the trailing clip and must rewind to the aligned part
        let bases = "A".repeat(70) + &"G".repeat(60);
        let read = make_read("r1", 850, &bases, "70=60S");
        let params = test_params();

        let cropped = crop_to_window(&read, &var, 50, &params);
        // rewound crop point is offset 70, shifted by the 30-base gap
        // between alignment end and window edge
        assert_eq!(cropped, "G".repeat(30).into_bytes());
    }

    #[test]
    fn collapsed_window_is_widened_by_one_base() {
        // read lies entirely left of the window: the crop interval clamps to
        // the read end and collapses
        let var = make_variant("chr1", 1000, "A", &["AT"]);
        let read = make_read("r1", 500, &"A".repeat(4), "4=");
        let params = test_params();

        let cropped = crop_to_window(&read, &var, 2, &params);
        assert_eq!(cropped.len(), 1);
    }
}
