//! Writes the input VCF back out with each record's genotype column
//! replaced by the re-genotyping result.

use crate::lrgt::genotype::GenotypeCall;
use crate::utils::Result;
use rust_htslib::bcf::{self, header::HeaderView, record::GenotypeAllele, Format};
use std::env;

/// FORMAT fields emitted for every re-genotyped record.
const VCF_LINES: [&str; 6] = [
    r#"##FORMAT=<ID=GT,Number=1,Type=String,Description="Genotype">"#,
    r#"##FORMAT=<ID=AD,Number=.,Type=Integer,Description="Read count per allele from alignment scores, last value is the total overlapping reads">"#,
    r#"##FORMAT=<ID=VA,Number=.,Type=Integer,Description="Read count per allele from indel size match, last value is the total overlapping reads">"#,
    r#"##FORMAT=<ID=PL,Number=G,Type=Integer,Description="Phred-scaled relative genotype likelihoods">"#,
    r#"##FORMAT=<ID=REFREADS,Number=1,Type=String,Description="Reads supporting the reference allele">"#,
    r#"##FORMAT=<ID=ALTREADS,Number=1,Type=String,Description="Reads supporting the first alternate allele">"#,
];

pub struct VcfWriter {
    writer: bcf::Writer,
}

impl VcfWriter {
    pub fn new(output_path: &str, input_header: &HeaderView) -> Result<VcfWriter> {
        let mut vcf_header = bcf::Header::from_template(input_header);

        for line in VCF_LINES.iter() {
            vcf_header.push_record(line.as_bytes());
        }

        let line = format!(
            "##{}Version={}",
            env!("CARGO_PKG_NAME"),
            *crate::cli::FULL_VERSION
        );
        vcf_header.push_record(line.as_bytes());

        let args: Vec<String> = env::args().collect();
        let line = format!("##{}Command={}", env!("CARGO_PKG_NAME"), args.join(" "));
        vcf_header.push_record(line.as_bytes());

        let uncompressed = !output_path.ends_with(".gz");
        let writer = bcf::Writer::from_path(output_path, &vcf_header, uncompressed, Format::Vcf)
            .map_err(|_| format!("Invalid VCF output path: {}", output_path))?;

        Ok(VcfWriter { writer })
    }

    /// Writes one record, overwriting its genotype column when a call was
    /// made. Records without a call (symbolic alts, haplotype dump mode)
    /// pass through unchanged.
    pub fn write(&mut self, record: &mut bcf::Record, calls: &Option<Vec<GenotypeCall>>) {
        self.writer.translate(record);

        // TODO: emit one FORMAT block per model instead of keeping only the
        // last one when running all models
        if let Some(call) = calls.as_ref().and_then(|calls| calls.last()) {
            record
                .push_genotypes(&[
                    GenotypeAllele::Unphased(call.gt.0 as i32),
                    GenotypeAllele::Unphased(call.gt.1 as i32),
                ])
                .unwrap();

            let ad: Vec<i32> = call.ad.iter().map(|&c| c as i32).collect();
            record.push_format_integer(b"AD", &ad).unwrap();
            let va: Vec<i32> = call.va.iter().map(|&c| c as i32).collect();
            record.push_format_integer(b"VA", &va).unwrap();
            record.push_format_integer(b"PL", &call.pl).unwrap();
            record
                .push_format_string(b"REFREADS", &[call.ref_reads.as_bytes()])
                .unwrap();
            record
                .push_format_string(b"ALTREADS", &[call.alt_reads.as_bytes()])
                .unwrap();
        }

        self.writer.write(record).unwrap();
    }
}
