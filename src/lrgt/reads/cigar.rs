pub type CigarOp = rust_htslib::bam::record::Cigar;

pub trait CigarOpExt {
    fn ref_len(&self) -> i64;
    fn query_len(&self) -> i64;
}

impl CigarOpExt for CigarOp {
    fn ref_len(&self) -> i64 {
        match self {
            CigarOp::Match(len)
            | CigarOp::RefSkip(len)
            | CigarOp::Del(len)
            | CigarOp::Equal(len)
            | CigarOp::Diff(len) => *len as i64,
            CigarOp::Ins(_) | CigarOp::SoftClip(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => 0,
        }
    }

    fn query_len(&self) -> i64 {
        match self {
            CigarOp::Match(len)
            | CigarOp::Equal(len)
            | CigarOp::Diff(len)
            | CigarOp::Ins(len)
            | CigarOp::SoftClip(len) => *len as i64,
            CigarOp::RefSkip(_) | CigarOp::Del(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_len() {
        assert_eq!(CigarOp::Match(10).ref_len(), 10);
        assert_eq!(CigarOp::Ins(5).ref_len(), 0);
        assert_eq!(CigarOp::Del(3).ref_len(), 3);
        assert_eq!(CigarOp::SoftClip(2).ref_len(), 0);
    }

    #[test]
    fn test_query_len() {
        assert_eq!(CigarOp::Match(10).query_len(), 10);
        assert_eq!(CigarOp::Ins(5).query_len(), 5);
        assert_eq!(CigarOp::Del(3).query_len(), 0);
        assert_eq!(CigarOp::SoftClip(2).query_len(), 2);
    }
}
