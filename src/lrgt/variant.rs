//! Owned view of a VCF record with the fields the genotyping engine needs.

use crate::utils::Result;
use rust_htslib::bcf::{self, header::HeaderView};

#[derive(Debug, Clone)]
pub struct SvVariant {
    pub contig: String,
    /// 0-based begin position.
    pub pos: i64,
    pub ref_allele: Vec<u8>,
    pub alt_alleles: Vec<Vec<u8>>,
    /// Tandem-repeat region bounds, when annotated.
    pub trr_begin: Option<i64>,
    pub trr_end: Option<i64>,
    /// Confidence-region bounds, when annotated.
    pub reg_begin: Option<i64>,
    pub reg_end: Option<i64>,
    pub sv_len: Option<i64>,
}

impl SvVariant {
    pub fn from_record(record: &bcf::Record, header: &HeaderView) -> Result<SvVariant> {
        let rid = record.rid().ok_or("VCF record without contig")?;
        let contig = String::from_utf8(header.rid2name(rid).map_err(|e| e.to_string())?.to_vec())
            .map_err(|e| e.to_string())?;

        let alleles = record.alleles();
        if alleles.is_empty() {
            return Err(format!("{}:{}: record without alleles", contig, record.pos() + 1));
        }
        let ref_allele = alleles[0].to_vec();
        let alt_alleles = alleles[1..].iter().map(|a| a.to_vec()).collect();

        Ok(SvVariant {
            contig,
            pos: record.pos(),
            ref_allele,
            alt_alleles,
            trr_begin: info_coordinate(record, b"TRRBEGIN"),
            trr_end: info_coordinate(record, b"TRREND"),
            reg_begin: info_coordinate(record, b"REGBEGIN"),
            reg_end: info_coordinate(record, b"REGEND"),
            sv_len: info_coordinate(record, b"SVLEN"),
        })
    }

    pub fn ref_len(&self) -> usize {
        self.ref_allele.len()
    }

    /// Total allele count, reference included.
    pub fn n_alleles(&self) -> usize {
        1 + self.alt_alleles.len()
    }

    pub fn alt_lens(&self) -> Vec<usize> {
        self.alt_alleles.iter().map(|a| a.len()).collect()
    }

    /// Longest allele this variant can contribute to the window size:
    /// the longest alternate sequence or the annotated |SVLEN|.
    pub fn max_allele_len(&self) -> usize {
        let max_alt = self.alt_alleles.iter().map(|a| a.len()).max().unwrap_or(0);
        let sv_len = self.sv_len.map(|l| l.unsigned_abs() as usize).unwrap_or(0);
        max_alt.max(sv_len)
    }

    /// Every alt is a tag: there is no sequence to genotype against.
    /// Empty alt lists count, so records with nothing to call also pass
    /// through.
    pub fn all_alts_symbolic(&self) -> bool {
        self.alt_alleles.iter().all(|a| is_symbolic_allele(a))
    }
}

/// True for symbolic (`<DEL>`), breakend, and overlapping-deletion alleles,
/// which carry a tag instead of literal sequence.
pub fn is_symbolic_allele(allele: &[u8]) -> bool {
    allele.first() == Some(&b'<')
        || allele.contains(&b'[')
        || allele.contains(&b']')
        || allele == b"*"
}

fn info_coordinate(record: &bcf::Record, tag: &[u8]) -> Option<i64> {
    match record.info(tag).integer() {
        Ok(Some(values)) if !values.is_empty() => Some(values[0] as i64),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn make_variant(contig: &str, pos: i64, ref_allele: &str, alts: &[&str]) -> SvVariant {
        SvVariant {
            contig: contig.to_string(),
            pos,
            ref_allele: ref_allele.as_bytes().to_vec(),
            alt_alleles: alts.iter().map(|a| a.as_bytes().to_vec()).collect(),
            trr_begin: None,
            trr_end: None,
            reg_begin: None,
            reg_end: None,
            sv_len: None,
        }
    }

    #[test]
    fn allele_accessors() {
        let var = make_variant("chr1", 1000, "AT", &["A", "ATTTT"]);
        assert_eq!(var.ref_len(), 2);
        assert_eq!(var.n_alleles(), 3);
        assert_eq!(var.alt_lens(), vec![1, 5]);
        assert_eq!(var.max_allele_len(), 5);
    }

    #[test]
    fn svlen_wins_when_longer_than_alts() {
        let mut var = make_variant("chr1", 1000, "A", &["<DEL>"]);
        var.sv_len = Some(-1200);
        assert_eq!(var.max_allele_len(), 1200);
    }

    #[test]
    fn symbolic_and_breakend_alleles_are_detected() {
        assert!(is_symbolic_allele(b"<INS>"));
        assert!(is_symbolic_allele(b"A[chr2:321682["));
        assert!(is_symbolic_allele(b"*"));
        assert!(!is_symbolic_allele(b"AT"));
    }

    #[test]
    fn mixed_records_keep_their_resolvable_alts() {
        assert!(!make_variant("chr1", 0, "A", &["<DEL>", "AT"]).all_alts_symbolic());
        assert!(make_variant("chr1", 0, "A", &["<DEL>", "<INS>"]).all_alts_symbolic());
        assert!(make_variant("chr1", 0, "A", &[]).all_alts_symbolic());
    }
}
