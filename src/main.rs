use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use probe_scan::config::{OrderDirection, SearchConfig};
use probe_scan::io::query_table;
use probe_scan::io::regions::read_regions;
use probe_scan::io::report::{result_path, ReportWriter};
use probe_scan::io::Genome;
use probe_scan::search::{GeneSimilarityMatch, RegionFilter, RegionMode};
use probe_scan::similarity::{AlgorithmId, PatternConditions};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "probe-scan",
    author,
    version,
    about = "Approximate probe search over both strands of a genome",
    arg_required_else_help = true
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score every query of a table against a genome and write the match report
    Search {
        /// Genome file (FASTA or GenBank)
        genome: PathBuf,
        /// Tab-separated query table with `name` and `gene` columns
        queries: PathBuf,
        /// Output directory for `<queries>_match_result.txt`
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// FASTA record to use (first record if omitted)
        #[arg(long)]
        record: Option<String>,
        /// JSON search configuration; flags below override its fields
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Algorithm weight as `name=weight`, repeatable (e.g. `direct=1`)
        #[arg(short, long = "weight", value_parser = parse_weight)]
        weights: Vec<(AlgorithmId, u32)>,
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,
        #[arg(long = "candidate-distance")]
        candidate_distance: Option<usize>,
        #[arg(long)]
        patience: Option<usize>,
        /// JSON file with `{"must": [...], "optional": [...]}` pattern conditions
        #[arg(long)]
        conditions: Option<PathBuf>,
        #[arg(long = "continuous-mismatch-limit")]
        continuous_mismatch_limit: Option<usize>,
        /// Rank lowest scores first instead of highest
        #[arg(long)]
        increasing: bool,
        #[arg(short = 't', long = "threads")]
        threads: Option<usize>,
        /// Region table (`left<TAB>right`, 1-based) restricting candidate locations
        #[arg(long)]
        regions: Option<PathBuf>,
        /// `within` or `outside` the regions
        #[arg(long = "region-mode", default_value = "outside")]
        region_mode: String,
        /// Only scan the named queries, repeatable
        #[arg(long = "only")]
        only: Vec<String>,
    },
    /// Print the default search configuration as JSON
    DumpConfig,
}

fn parse_weight(s: &str) -> std::result::Result<(AlgorithmId, u32), String> {
    let (name, weight) = s.split_once('=').ok_or_else(|| format!("expected name=weight, got '{}'", s))?;
    let id: AlgorithmId = name.trim().parse().map_err(|e| format!("{}", e))?;
    let weight: u32 = weight.trim().parse().map_err(|e| format!("invalid weight '{}': {}", weight, e))?;
    Ok((id, weight))
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp_secs();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    match cli.command {
        Commands::Search {
            genome,
            queries,
            output,
            record,
            config,
            weights,
            top_k,
            candidate_distance,
            patience,
            conditions,
            continuous_mismatch_limit,
            increasing,
            threads,
            regions,
            region_mode,
            only,
        } => {
            let mut cfg = match &config {
                Some(p) => SearchConfig::from_json_file(p)
                    .with_context(|| format!("cannot load configuration '{}'", p.display()))?,
                None => SearchConfig::default(),
            };
            for (id, w) in weights {
                cfg.weights.insert(id, w);
            }
            if let Some(v) = top_k {
                cfg.top_k = v;
            }
            if let Some(v) = candidate_distance {
                cfg.candidate_distance = v;
            }
            if let Some(v) = patience {
                cfg.patience = v;
            }
            if let Some(p) = &conditions {
                cfg.conditions = Some(load_conditions(p)?);
            }
            if continuous_mismatch_limit.is_some() {
                cfg.continuous_mismatch_limit = continuous_mismatch_limit;
            }
            if increasing {
                cfg.order = OrderDirection::Increasing;
            }
            if let Some(v) = threads {
                cfg.concurrency_limit = v;
            }
            let filter = match &regions {
                Some(p) => {
                    let mode: RegionMode = region_mode.parse()?;
                    Some((p.as_path(), mode))
                }
                None => None,
            };
            run_search(&genome, record.as_deref(), &queries, &output, cfg, filter, &only)
        }
        Commands::DumpConfig => {
            println!("{}", serde_json::to_string_pretty(&SearchConfig::default())?);
            Ok(())
        }
    }
}

fn load_conditions(path: &Path) -> Result<PatternConditions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read pattern conditions '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("malformed pattern conditions in '{}'", path.display()))
}

fn run_search(
    genome_path: &Path,
    record: Option<&str>,
    queries_path: &Path,
    output: &Path,
    cfg: SearchConfig,
    regions: Option<(&Path, RegionMode)>,
    only: &[String],
) -> Result<()> {
    cfg.validate()?;

    let genome = Genome::load(genome_path, record)?;
    let mut queries = query_table::read_query_table(queries_path)?;
    if !only.is_empty() {
        query_table::retain_named(&mut queries, only);
        if queries.is_empty() {
            anyhow::bail!("none of the requested queries ({}) are in '{}'", only.join(", "), queries_path.display());
        }
    }
    if queries.is_empty() {
        warn!("query table '{}' is empty", queries_path.display());
    }

    let mut matcher = GeneSimilarityMatch::new(Arc::new(genome), cfg)?;
    if let Some((path, mode)) = regions {
        let filter = RegionFilter::new(read_regions(path)?, mode);
        info!("location filter: {} regions ({:?})", filter.len(), mode);
        matcher = matcher.with_filter(Arc::new(filter));
    }

    let out_path = result_path(output, queries_path);
    let writer = ReportWriter::create(&out_path)?;
    info!("writing matches to {}", out_path.display());

    let summary = matcher.run(&queries, &writer)?;
    println!("queries: {}", queries.len());
    println!("processed: {}", summary.processed);
    println!("failed: {}", summary.failed);
    println!("started: {}", summary.started.to_rfc3339());
    println!("result: {}", out_path.display());
    if summary.failed > 0 {
        anyhow::bail!("{} of {} queries failed, see the log for details", summary.failed, queries.len());
    }
    Ok(())
}
