mod io_utils;
mod readers;
mod util;

pub use io_utils::{cache_read_paths, resolve_read_paths};
pub use readers::{
    create_chrom_lookup, ensure_bam_mapped, open_bam_reader, open_genome_reader, open_vcf_reader,
};
pub use util::{handle_error_and_exit, Result};
