use cenplot::{plot_one_cen, shared_range, Config};
use clap::Parser;
use log::{info, warn};
use rayon::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cenplot")]
#[command(about = "Plot multi-track centromere maps.", long_about = None)]
struct Args {
    /// Load track definitions from this TOML FILE.
    #[arg(short = 't', long = "tracks", value_name = "FILE")]
    tracks: PathBuf,

    /// Plot only this chromosome. Repeat for several; default is every chromosome in the tracks.
    #[arg(short = 'c', long = "chrom", value_name = "NAME")]
    chrom: Vec<String>,

    /// Write one image per chromosome into this directory.
    #[arg(short = 'd', long = "outdir", value_name = "DIR", default_value = ".")]
    outdir: PathBuf,

    /// Number of threads to use for parallel operations.
    #[arg(short = 'p', long = "threads", value_name = "N")]
    threads: Option<usize>,

    /// Verbosity level (0 = error, 1 = info, 2 = debug).
    #[arg(short = 'v', long = "verbose", value_name = "N", default_value_t = 1)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let config = match Config::from_path(&args.tracks) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading track file: {}", e);
            std::process::exit(1);
        }
    };

    let chroms = if args.chrom.is_empty() {
        match config.chroms() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading tracks: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        args.chrom.clone()
    };
    if chroms.is_empty() {
        eprintln!("Warning: No chromosomes found in the tracks.");
        return;
    }

    if let Err(e) = std::fs::create_dir_all(&args.outdir) {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    }

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(n) = args.threads {
        pool = pool.num_threads(n);
    }
    let pool = match pool.build() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error creating thread pool: {}", e);
            std::process::exit(1);
        }
    };

    info!("Plotting {} chromosomes with {} tracks...", chroms.len(), config.tracks.len());
    let failed: Vec<(String, cenplot::RenderError)> = pool.install(|| {
        chroms
            .par_iter()
            .filter_map(|chrom| {
                let result = config.load_tracks(chrom).and_then(|tracks| {
                    let Some(range) = shared_range(&tracks) else {
                        warn!("No data for {}, skipping.", chrom);
                        return Ok(());
                    };
                    plot_one_cen(&tracks, &args.outdir, chrom, &config.settings, range).map(|r| {
                        info!("Wrote {:?}", r.path);
                    })
                });
                result.err().map(|e| (chrom.clone(), e))
            })
            .collect()
    });

    for (chrom, e) in &failed {
        eprintln!("Error plotting {}: {}", chrom, e);
    }
    if !failed.is_empty() {
        std::process::exit(1);
    }
}
