use crate::lrgt::align::AlnScoring;
use crate::lrgt::genotype::GtModel;
use crate::utils::Result;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="lrgt",
          version=&**FULL_VERSION,
          about="Re-genotypes structural variants from long-read alignments",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Structural Variant Re-Genotyper")]
    Genotype(GenotypeArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("genotype")))]
#[command(arg_required_else_help(true))]
pub struct GenotypeArgs {
    #[clap(required = true)]
    #[clap(short = 'g')]
    #[clap(long = "genome")]
    #[clap(help = "Path to reference genome FASTA")]
    #[clap(value_name = "FASTA")]
    #[arg(value_parser = check_file_exists)]
    pub genome_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reads")]
    #[clap(help = "BAM file with aligned long reads, or a file listing one BAM per line")]
    #[clap(value_name = "READS")]
    #[arg(value_parser = check_file_exists)]
    pub reads_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "vcf")]
    #[clap(help = "VCF file with variants to re-genotype")]
    #[clap(value_name = "VCF")]
    #[arg(value_parser = check_file_exists)]
    pub vcf_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Output VCF path")]
    #[clap(value_name = "OUTPUT")]
    #[arg(value_parser = check_output_path)]
    pub output_path: String,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(long = "chunk-size")]
    #[clap(value_name = "CHUNK_SIZE")]
    #[clap(help = "Number of VCF records processed per work unit")]
    #[clap(default_value = "100")]
    pub chunk_size: usize,

    #[clap(long = "gt-model")]
    #[clap(value_name = "MODEL")]
    #[clap(help = "Genotyping model (ad, va, joint, va_old, presence, or multi)")]
    #[clap(default_value = "joint")]
    pub gt_model: GtModel,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "window")]
    #[clap(value_name = "WINDOW")]
    #[clap(help = "Half-width of the haplotype window around the breakpoint")]
    #[clap(default_value = "500")]
    pub w_size: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "dynamic-window")]
    #[clap(help = "Grow the window by the longest allele in each work unit")]
    pub dynamic_w_size: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "var-window")]
    #[clap(value_name = "VAR_WINDOW")]
    #[clap(help = "Half-width of the indel evidence region around the variant")]
    #[clap(default_value = "100")]
    pub var_window: i64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-del-ins")]
    #[clap(value_name = "MIN_DEL_INS")]
    #[clap(help = "Minimum CIGAR insertion/deletion length counted as evidence")]
    #[clap(default_value = "6")]
    pub min_del_ins: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-soft-clip")]
    #[clap(value_name = "MAX_SOFT_CLIP")]
    #[clap(help = "Terminal soft clips longer than this mark or disqualify a read")]
    #[clap(default_value = "500")]
    pub max_soft_clip: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-reads")]
    #[clap(value_name = "MAX_READS")]
    #[clap(help = "Maximum number of reads scored per variant")]
    #[clap(default_value = "200")]
    pub max_reads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-mapq")]
    #[clap(value_name = "MIN_MAPQ")]
    #[clap(help = "Minimum mapping quality required to use a read")]
    #[clap(default_value = "30")]
    pub min_mapq: u8,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "right-breakpoint")]
    #[clap(help = "Center the window on the right breakpoint of each variant")]
    pub right_breakpoint: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "mask-homopolymers")]
    #[clap(help = "Collapse homopolymer runs in the reference haplotype")]
    pub mask_homopolymers: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "no-crop")]
    #[clap(help = "Align full read sequences instead of cropping to the window")]
    pub no_crop: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "aln-scoring")]
    #[clap(value_name = "SCORING")]
    #[clap(help = "Scoring function for the haplotype alignment (non-negative values): MATCH,MISM,GAPO,GAPE")]
    #[clap(default_value = "1,1,1,1")]
    #[arg(value_parser = scoring_from_string)]
    pub aln_scoring: AlnScoring,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "band-pct")]
    #[clap(value_name = "PERC")]
    #[clap(help = "Alignment band width as a percentage of the sequence length")]
    #[clap(default_value = "25")]
    #[arg(value_parser = ensure_percent)]
    pub band_pct: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "log-scale")]
    #[clap(value_name = "FACTOR")]
    #[clap(help = "Divisor converting alignment score differences to bits")]
    #[clap(default_value = "2.0")]
    pub log_scale_factor: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-align-bits")]
    #[clap(value_name = "BITS")]
    #[clap(help = "Upper bound on the per-allele alignment penalty")]
    #[clap(default_value = "10.0")]
    pub max_align_bits: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "overlap-bits")]
    #[clap(value_name = "BITS")]
    #[clap(help = "Penalty unit for non-alignment evidence")]
    #[clap(default_value = "10.0")]
    pub overlap_bits: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "alt-frac")]
    #[clap(value_name = "FRAC")]
    #[clap(help = "Minimum indel fraction of the allele size supporting it (va_old)")]
    #[clap(default_value = "0.4")]
    #[arg(value_parser = ensure_unit_float)]
    pub alt_frac: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "alt-frac-max")]
    #[clap(value_name = "FRAC")]
    #[clap(help = "Maximum indel fraction of the allele size supporting it (va_old)")]
    #[clap(default_value = "2.0")]
    pub alt_frac_max: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "ref-frac")]
    #[clap(value_name = "FRAC")]
    #[clap(help = "Indel fraction of the allele size below which a read rejects it (va_old)")]
    #[clap(default_value = "0.1")]
    #[arg(value_parser = ensure_unit_float)]
    pub ref_frac: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-present")]
    #[clap(value_name = "MIN_PRESENT")]
    #[clap(help = "Minimum indel bases for the presence model to call a variant present")]
    #[clap(default_value = "20")]
    pub min_present: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "output-ref-alt")]
    #[clap(help = "Dump the haplotype sequences instead of genotyping")]
    pub output_ref_alt: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "cache-dir")]
    #[clap(value_name = "CACHE_DIR")]
    #[clap(help = "Copy input BAMs and indexes into this directory before reading")]
    pub cache_dir: Option<PathBuf>,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(record.level()),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_output_path(s: &str) -> Result<String> {
    match Path::new(s).parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            Err(format!("Output directory does not exist: {}", dir.display()))
        }
        _ => Ok(s.to_string()),
    }
}

fn threads_in_range(s: &str) -> Result<usize> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        Ok(_) => Err("Thread count must be at least 1".to_string()),
        Err(_) => Err(format!("`{s}` is not a valid thread count")),
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = PathBuf::from(s);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("No such file: {s}"))
    }
}

fn ensure_unit_float(s: &str) -> Result<f64> {
    let value: f64 = s
        .parse()
        .map_err(|e| format!("Could not parse fraction: {e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("Fraction must lie in [0, 1], got {value}"))
    }
}

fn ensure_percent(s: &str) -> Result<f64> {
    let value: f64 = s
        .parse()
        .map_err(|e| format!("Could not parse percentage: {e}"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("Percentage must lie in [0, 100], got {value}"))
    }
}

fn scoring_from_string(s: &str) -> Result<AlnScoring> {
    const NUM_EXPECTED_VALUES: usize = 4;
    let values: Vec<i32> = s.split(',').filter_map(|x| x.parse().ok()).collect();
    if values.len() != NUM_EXPECTED_VALUES {
        return Err(format!(
            "Expected {} comma-separated values in scoring. Got {} -> {}",
            NUM_EXPECTED_VALUES,
            values.len(),
            s
        ));
    }

    if values.iter().any(|&val| val < 0) {
        return Err(format!(
            "Negative values are not allowed in scoring. Got {}.",
            s
        ));
    }

    Ok(AlnScoring {
        match_scr: values[0],
        mism_scr: values[1],
        gapo_scr: values[2],
        gape_scr: values[3],
    })
}
