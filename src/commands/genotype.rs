use crate::cli::GenotypeArgs;
use crate::lrgt::{
    chunk::{stream_chunks_into_channel, VariantChunk},
    genotype::GenotypeCall,
    workflows::{analyze_chunk, Params},
    writers::VcfWriter,
};
use crate::utils::{
    cache_read_paths, create_chrom_lookup, ensure_bam_mapped, open_bam_reader, open_genome_reader,
    open_vcf_reader, resolve_read_paths, Result,
};
use crossbeam_channel::{bounded, Sender};
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use rust_htslib::{bam, bcf, bcf::Read as _, faidx};
use std::{
    cell::RefCell,
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
    thread::{self},
};

#[derive(Debug, Clone)]
struct ThreadContextParams {
    read_paths: Vec<PathBuf>,
    genome_path: PathBuf,
}

thread_local! {
    static CTX_PARAMS: RefCell<Option<ThreadContextParams>> = const { RefCell::new(None) };
}

fn create_thread_local_bam_readers() -> Vec<bam::IndexedReader> {
    let paths = CTX_PARAMS.with(|ctx_cell| {
        ctx_cell
            .borrow()
            .as_ref()
            .expect("Thread context parameters not initialized for BAM paths")
            .read_paths
            .clone()
    });
    paths
        .iter()
        .map(|path| {
            open_bam_reader(path)
                .unwrap_or_else(|e| panic!("Failed to initialize BAM reader: {}", e))
        })
        .collect()
}

fn create_thread_local_genome_reader() -> faidx::Reader {
    let path = CTX_PARAMS.with(|ctx_cell| {
        ctx_cell
            .borrow()
            .as_ref()
            .expect("Thread context parameters not initialized for FASTA path")
            .genome_path
            .clone()
    });
    faidx::Reader::from_path(&path).unwrap_or_else(|e| {
        panic!(
            "Failed to initialize FASTA reader for path {}: {}",
            path.display(),
            e
        )
    })
}

thread_local! {
    static THREAD_BAM_READERS: RefCell<Vec<bam::IndexedReader>> =
        RefCell::new(create_thread_local_bam_readers());
    static THREAD_GENOME_READER: RefCell<faidx::Reader> =
        RefCell::new(create_thread_local_genome_reader());
}

const CHANNEL_BUFFER_SIZE: usize = 2048;

type ChunkResult = (usize, Vec<bcf::Record>, Vec<Option<Vec<GenotypeCall>>>);

pub fn genotype(args: GenotypeArgs) -> Result<()> {
    let mut read_paths = resolve_read_paths(&args.reads_path)?;
    if let Some(cache_dir) = &args.cache_dir {
        log::info!("Caching {} BAM file(s) in {}", read_paths.len(), cache_dir.display());
        read_paths = cache_read_paths(read_paths, cache_dir)?;
    }

    for path in &read_paths {
        ensure_bam_mapped(path)?;
    }

    let genome_reader = open_genome_reader(&args.genome_path)?;
    let chrom_lookup = Arc::new(create_chrom_lookup(&genome_reader)?);
    drop(genome_reader);

    let input_header = {
        let reader = open_vcf_reader(&args.vcf_path)?;
        reader.header().clone()
    };
    let mut vcf_writer = VcfWriter::new(&args.output_path, &input_header)?;

    let (sender_chunk, receiver_chunk) = bounded(CHANNEL_BUFFER_SIZE);
    let vcf_path = args.vcf_path.clone();
    let chunk_size = args.chunk_size;
    let chunk_stream_thread =
        thread::spawn(move || stream_chunks_into_channel(&vcf_path, chunk_size, sender_chunk));

    let (sender_result, receiver_result) = bounded::<ChunkResult>(CHANNEL_BUFFER_SIZE);
    let writer_thread = thread::spawn(move || {
        // chunks arrive in completion order; buffer them until their turn
        let mut pending: HashMap<usize, (Vec<bcf::Record>, Vec<Option<Vec<GenotypeCall>>>)> =
            HashMap::new();
        let mut next_serial = 0;
        for (serial, records, verdicts) in &receiver_result {
            pending.insert(serial, (records, verdicts));
            while let Some((mut records, verdicts)) = pending.remove(&next_serial) {
                for (record, verdict) in records.iter_mut().zip(verdicts.iter()) {
                    vcf_writer.write(record, verdict);
                }
                next_serial += 1;
            }
        }
    });

    let workflow_params = Arc::new(Params {
        w_size: args.w_size,
        dynamic_w_size: args.dynamic_w_size,
        var_window: args.var_window,
        min_del_ins: args.min_del_ins,
        max_soft_clip: args.max_soft_clip,
        max_reads: args.max_reads,
        min_mapq: args.min_mapq,
        right_breakpoint: args.right_breakpoint,
        mask_homopolymers: args.mask_homopolymers,
        crop_read: !args.no_crop,
        scoring: args.aln_scoring,
        band_pct: args.band_pct,
        log_scale_factor: args.log_scale_factor,
        max_align_bits: args.max_align_bits,
        overlap_bits: args.overlap_bits,
        alt_frac: args.alt_frac,
        alt_frac_max: args.alt_frac_max,
        ref_frac: args.ref_frac,
        min_present: args.min_present,
        gt_model: args.gt_model,
        output_ref_alt: args.output_ref_alt,
    });

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );

    let pool = initialize_thread_pool(
        args.num_threads,
        ThreadContextParams {
            read_paths,
            genome_path: args.genome_path.clone(),
        },
    )?;
    pool.install(|| {
        receiver_chunk
            .into_iter()
            .par_bridge()
            .for_each_with(&sender_result, |s, chunk_result| match chunk_result {
                Ok(chunk) => process_chunk(chunk, &workflow_params, &chrom_lookup, s),
                Err(err) => log::error!("Chunk processing: {:#}", err),
            });
    });

    // Clean-up
    drop(sender_result);
    writer_thread.join().expect("Writer thread panicked");
    log::trace!("Writer thread finished");
    match chunk_stream_thread
        .join()
        .expect("Chunk stream thread panicked")
    {
        Ok(_) => log::trace!("Chunk stream thread finished"),
        Err(e) => log::error!("VCF streaming failed: {}", e),
    }

    Ok(())
}

fn process_chunk(
    chunk: VariantChunk,
    workflow_params: &Arc<Params>,
    chrom_lookup: &Arc<HashMap<String, i64>>,
    sender_result: &Sender<ChunkResult>,
) {
    THREAD_BAM_READERS.with(|bams_cell| {
        THREAD_GENOME_READER.with(|genome_cell| {
            let mut bams = bams_cell.borrow_mut();
            let genome = genome_cell.borrow();
            match analyze_chunk(&chunk, workflow_params, &mut bams, &genome, chrom_lookup) {
                Ok(verdicts) => {
                    let VariantChunk {
                        serial, records, ..
                    } = chunk;
                    if let Err(e) = sender_result.send((serial, records, verdicts)) {
                        log::error!("Failed to send chunk result to writer thread: {}", e);
                    }
                }
                Err(err) => {
                    log::error!(
                        "Error analyzing chunk {} ({}): {}",
                        chunk.serial,
                        chunk.contig,
                        err
                    );
                }
            }
        });
    });
}

fn initialize_thread_pool(
    num_threads: usize,
    thread_context: ThreadContextParams,
) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("lrgt-{}", i))
        .start_handler(move |_thread_index| {
            CTX_PARAMS.with(|cell| {
                *cell.borrow_mut() = Some(thread_context.clone());
            });
            log::trace!("Initialized thread {:?}", std::thread::current().id());
        })
        .exit_handler(|_thread_index| {
            CTX_PARAMS.with(|cell| {
                *cell.borrow_mut() = None;
            });
        })
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
