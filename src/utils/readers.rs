use super::Result;
use rust_htslib::{bam, bam::Read as _, bcf, faidx};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Opens the reference FASTA, insisting on a faidx index so haplotype
/// windows can be fetched by region.
pub fn open_genome_reader(path: &Path) -> Result<faidx::Reader> {
    let fai_path = PathBuf::from(format!("{}.fai", path.display()));
    if !fai_path.exists() {
        return Err(format!(
            "Missing FASTA index {}. Index the reference with 'samtools faidx {}' first",
            fai_path.display(),
            path.display()
        ));
    }
    faidx::Reader::from_path(path)
        .map_err(|e| format!("Failed to open reference FASTA {}: {}", path.display(), e))
}

pub fn open_vcf_reader(path: &Path) -> Result<bcf::Reader> {
    bcf::Reader::from_path(path)
        .map_err(|e| format!("Failed to open VCF file {}: {}", path.display(), e))
}

pub fn open_bam_reader(path: &Path) -> Result<bam::IndexedReader> {
    bam::IndexedReader::from_path(path)
        .map_err(|e| format!("Failed to open BAM file {}: {}", path.display(), e))
}

/// Confirms the BAM holds aligned reads: region fetches need the @SQ
/// entries the aligner wrote into the header.
pub fn ensure_bam_mapped(path: &Path) -> Result<()> {
    let bam = open_bam_reader(path)?;
    let header_text = bam::Header::from_template(bam.header()).to_bytes();
    if String::from_utf8_lossy(&header_text)
        .lines()
        .any(|line| line.starts_with("@SQ"))
    {
        Ok(())
    } else {
        Err(format!("Input BAM is not mapped: {}", path.display()))
    }
}

/// Maps every contig in the reference to its length.
pub fn create_chrom_lookup(reader: &faidx::Reader) -> Result<HashMap<String, i64>> {
    let num_seqs = reader.n_seqs() as usize;
    let mut map = HashMap::with_capacity(num_seqs);
    for i in 0..num_seqs {
        let name = reader.seq_name(i as i32).map_err(|e| e.to_string())?;
        let len: i64 = reader
            .fetch_seq_len(&name)
            .try_into()
            .map_err(|_| format!("Sequence length for '{}' is negative", &name))?;
        map.insert(name, len);
    }
    Ok(map)
}
