mod cigar;
mod crop;
mod examine;
mod fetch;
mod read;

pub use cigar::{CigarOp, CigarOpExt};
pub use crop::crop_to_window;
pub use examine::{evidence_region, examine_alignment};
pub use fetch::{fetch_chunk_reads, select_reads};
pub use read::SvRead;

#[cfg(test)]
pub(crate) mod tests {
    use super::SvRead;
    use rust_htslib::bam::record::CigarString;

    pub fn make_read(id: &str, begin_pos: i64, bases: &str, encoding: &str) -> SvRead {
        SvRead {
            id: id.to_string(),
            begin_pos,
            bases: bases.as_bytes().to_vec(),
            cigar: CigarString::try_from(encoding).unwrap().to_vec(),
            mapq: 60,
            is_duplicate: false,
            is_qc_fail: false,
        }
    }
}
