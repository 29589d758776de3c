//! Groups VCF records into contig-contiguous chunks, the unit of parallel
//! work, and derives each chunk's effective window and BAM fetch interval.

use crate::lrgt::variant::SvVariant;
use crate::lrgt::workflows::Params;
use crate::utils::{open_vcf_reader, Result};
use crossbeam_channel::Sender;
use rust_htslib::bcf::{self, Read};
use std::path::Path;

pub struct VariantChunk {
    /// Position of this chunk in the input, used to restore output order.
    pub serial: usize,
    pub contig: String,
    /// Original records, written back out with genotypes overwritten.
    pub records: Vec<bcf::Record>,
    pub variants: Vec<SvVariant>,
}

impl VariantChunk {
    /// The window half-width used for every variant in this chunk. Under
    /// dynamic sizing the base window grows by the longest allele so the
    /// haplotypes keep a flank on both sides of the spliced sequence.
    pub fn effective_window(&self, params: &Params) -> usize {
        if !params.dynamic_w_size {
            return params.w_size;
        }
        let max_allele_len = self
            .variants
            .iter()
            .map(|v| v.max_allele_len())
            .max()
            .unwrap_or(0);
        params.w_size + max_allele_len
    }

    /// Genomic interval covering every read any variant in the chunk may
    /// use, fetched from the BAMs once.
    pub fn fetch_interval(&self, w: i64, right_breakpoint: bool) -> (i64, i64) {
        let mut genome_begin = self.variants.first().map(|v| v.pos).unwrap_or(0);
        let mut genome_end = self.variants.last().map(|v| v.pos).unwrap_or(0) + 1;

        if right_breakpoint {
            let min_ref = self.variants.iter().map(|v| v.ref_len()).min().unwrap_or(0);
            let max_ref = self.variants.iter().map(|v| v.ref_len()).max().unwrap_or(0);
            genome_begin += min_ref as i64;
            genome_end += max_ref as i64;
        }

        genome_begin = if w >= genome_begin { 1 } else { genome_begin - w };
        genome_end += w;

        (genome_begin, genome_end)
    }
}

/// Streams the VCF into contig-contiguous chunks of at most `chunk_size`
/// records. Undecodable records abort the stream with an error on the
/// channel; the caller decides whether that ends the run.
pub fn stream_chunks_into_channel(
    vcf_path: &Path,
    chunk_size: usize,
    sender: Sender<Result<VariantChunk>>,
) -> Result<()> {
    let mut reader = open_vcf_reader(vcf_path)?;
    let header = reader.header().clone();

    let mut serial = 0;
    let mut records: Vec<bcf::Record> = Vec::new();
    let mut variants: Vec<SvVariant> = Vec::new();
    let mut contig = String::new();

    let mut flush = |records: &mut Vec<bcf::Record>,
                     variants: &mut Vec<SvVariant>,
                     contig: &str,
                     serial: &mut usize| {
        if records.is_empty() {
            return;
        }
        let chunk = VariantChunk {
            serial: *serial,
            contig: contig.to_string(),
            records: std::mem::take(records),
            variants: std::mem::take(variants),
        };
        *serial += 1;
        sender
            .send(Ok(chunk))
            .expect("Failed to send chunk through channel");
    };

    for (record_number, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                let error = format!("Error at VCF record {}: {}", record_number + 1, e);
                sender
                    .send(Err(error.clone()))
                    .expect("Failed to send error through channel");
                return Err(error);
            }
        };

        let variant = match SvVariant::from_record(&record, &header) {
            Ok(variant) => variant,
            Err(e) => {
                let error = format!("Error at VCF record {}: {}", record_number + 1, e);
                sender
                    .send(Err(error.clone()))
                    .expect("Failed to send error through channel");
                return Err(error);
            }
        };

        if variant.contig != contig || records.len() >= chunk_size {
            flush(&mut records, &mut variants, &contig, &mut serial);
            contig = variant.contig.clone();
        }
        records.push(record);
        variants.push(variant);
    }
    flush(&mut records, &mut variants, &contig, &mut serial);

    Ok(())
}
