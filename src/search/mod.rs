//! 探针相似性搜索：双链扫描、候选筛选、全局 top-K 与比对渲染

pub mod candidate;
pub mod filter;
pub mod progress;
pub mod scanner;
pub mod topk;
pub mod weighted;
pub mod window;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use log::{debug, error, info};
use rayon::prelude::*;

pub use candidate::MatchCandidate;
pub use filter::{LocationFilter, RegionFilter, RegionMode};
pub use progress::{ProgressLogger, ScanProgress};
pub use scanner::{rank_and_truncate, StrandScanner, CANDIDATE_CLEAR_SIZE};
pub use topk::TopKSelector;
pub use weighted::WeightedScorer;
pub use window::CandidateWindow;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::io::report::{format_query_report, RenderedCandidate, ReportWriter};
use crate::io::{Genome, Query};

/// 一次批量搜索的统计
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub elapsed: Duration,
    pub processed: usize,
    pub failed: usize,
}

/// Top-level driver: scans every query against both strands of one genome
/// and appends a report block per retained candidate.
pub struct GeneSimilarityMatch {
    genome: Arc<Genome>,
    config: SearchConfig,
    filter: Option<Arc<dyn LocationFilter>>,
}

impl GeneSimilarityMatch {
    /// Fails fast on an unusable configuration, before anything is scanned.
    pub fn new(genome: Arc<Genome>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { genome, config, filter: None })
    }

    pub fn with_filter(mut self, filter: Arc<dyn LocationFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Offsets one query contributes to the shared progress counter.
    fn scan_size(&self, query: &Query) -> u64 {
        let n = query.sequence.len();
        let len = self.genome.len();
        if n == 0 || n > len {
            0
        } else {
            2 * (len - n + 1) as u64
        }
    }

    /// 对单个 query 扫描两条链，合并后截断到 top_k 并渲染
    pub fn find_candidates(&self, query: &Query, progress: &ScanProgress) -> Result<Vec<RenderedCandidate>> {
        let pattern = self.config.match_pattern(&query.sequence)?;
        let scanner = |is_reverse: bool| StrandScanner {
            name: &query.name,
            query: &query.sequence,
            strand: self.genome.strand(is_reverse),
            is_reverse,
            config: &self.config,
            pattern: pattern.clone(),
            filter: self.filter.as_deref(),
            progress,
        };
        let (forward, reverse) = rayon::join(|| scanner(false).scan(), || scanner(true).scan());

        let mut candidates = forward?;
        candidates.extend(reverse?);
        debug!("{}: {} candidates before truncation", query.name, candidates.len());
        rank_and_truncate(&mut candidates, self.config.order, self.config.top_k);

        let mut renderer = WeightedScorer::new(&self.config, pattern)?;
        candidates
            .into_iter()
            .map(|candidate| {
                let strand = self.genome.strand(candidate.is_reverse);
                let alignments = renderer.render(&query.sequence, strand, candidate.left)?;
                Ok(RenderedCandidate { candidate, alignments })
            })
            .collect()
    }

    /// Runs every query on a pool of `concurrency_limit` threads. A failing
    /// query is logged and left out of the report; the others still complete.
    pub fn run(&self, queries: &[Query], writer: &ReportWriter) -> Result<RunSummary> {
        let started = Local::now();
        let clock = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.concurrency_limit)
            .build()
            .map_err(|e| SearchError::Internal(format!("cannot start thread pool: {}", e)))?;

        let progress = ScanProgress::new();
        for q in queries {
            progress.add_total(self.scan_size(q));
        }
        let total = queries.len();
        let solved = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let logger = Mutex::new(ProgressLogger::new(Duration::from_secs(self.config.progress_interval_secs)));
        info!(
            "matching {} queries against {} ({} bp) with {} threads",
            total,
            self.genome.name,
            self.genome.len(),
            self.config.concurrency_limit
        );

        pool.install(|| {
            queries.par_iter().for_each(|query| {
                let outcome = self.find_candidates(query, &progress).and_then(|results| {
                    let text =
                        format_query_report(&self.genome.name, &query.name, query.sequence_str(), &results);
                    writer.append(&text)?;
                    Ok(results.len())
                });
                match outcome {
                    Ok(n) => debug!("{}: {} candidates written", query.name, n),
                    Err(e) => {
                        error!("query {} failed: {}", query.name, e);
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }

                let done = solved.fetch_add(1, Ordering::Relaxed) + 1;
                if let Ok(mut logger) = logger.lock() {
                    logger.tick(done as u64, total as u64, || {
                        let (scanned, offsets) = progress.snapshot();
                        format!("Doing similarity matching (offsets {}/{}):", scanned, offsets)
                    });
                }
            });
        });

        let failed = failed.into_inner();
        let summary = RunSummary {
            started,
            finished: Local::now(),
            elapsed: clock.elapsed(),
            processed: total - failed,
            failed,
        };
        info!(
            "finished at {}: {} queries processed, {} failed, elapsed {}",
            summary.finished.format("%Y-%m-%d %H:%M:%S"),
            summary.processed,
            summary.failed,
            progress::format_hms(summary.elapsed)
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::AlgorithmId;

    fn genome() -> Arc<Genome> {
        // forward copy at 0-based 12, reverse-complement copy on the minus strand
        Arc::new(Genome::from_sequence("toy", b"ttttttttttttgacgtcaacctttttttttttaggttgacgtctttt"))
    }

    fn config() -> SearchConfig {
        SearchConfig { top_k: 2, ..SearchConfig::default() }.with_weight(AlgorithmId::Direct, 1)
    }

    #[test]
    fn rejects_invalid_config_up_front() {
        assert!(GeneSimilarityMatch::new(genome(), SearchConfig::default()).is_err());
    }

    #[test]
    fn finds_hits_on_both_strands() {
        let m = GeneSimilarityMatch::new(genome(), config()).unwrap();
        let q = Query::new("probe", b"gacgtcaacc");
        let found = m.find_candidates(&q, &ScanProgress::new()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.candidate.weighted_similarity == 10.0));
        let fwd = found.iter().find(|r| !r.candidate.is_reverse).unwrap();
        assert_eq!((fwd.candidate.start, fwd.candidate.end), (13, 22));
        let rev = found.iter().find(|r| r.candidate.is_reverse).unwrap();
        assert_eq!((rev.candidate.start, rev.candidate.end), (44, 35));
        assert_eq!(fwd.alignments[0].1.matches, "**********");
    }

    #[test]
    fn oversized_limits_keep_one_hit_per_strand() {
        let cfg = SearchConfig { top_k: usize::MAX, candidate_distance: usize::MAX / 2, ..config() };
        let m = GeneSimilarityMatch::new(genome(), cfg).unwrap();
        let q = Query::new("probe", b"gacgtcaacc");
        let found = m.find_candidates(&q, &ScanProgress::new()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.candidate.weighted_similarity == 10.0));
    }

    #[test]
    fn filter_restricts_hits() {
        let only_forward_copy = Arc::new(RegionFilter::new(vec![(1, 25)], RegionMode::Within));
        let m = GeneSimilarityMatch::new(genome(), config()).unwrap().with_filter(only_forward_copy);
        let q = Query::new("probe", b"gacgtcaacc");
        let found = m.find_candidates(&q, &ScanProgress::new()).unwrap();
        assert_eq!(found[0].candidate.start, 13);
        assert!(found.iter().all(|r| r.candidate.span().1 <= 25));
    }

    #[test]
    fn bad_query_does_not_stop_the_batch() {
        use crate::similarity::{Constraint, PatternConditions};
        let cfg = SearchConfig {
            conditions: Some(PatternConditions { must: vec![Constraint { offset: 6, length: 4 }], optional: vec![] }),
            ..config().with_weight(AlgorithmId::Pattern, 1)
        };
        let m = GeneSimilarityMatch::new(genome(), cfg).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::create(dir.path().join("r.txt")).unwrap();
        // the constraint runs past the end of the short query only
        let queries = vec![Query::new("short", b"gacgtc"), Query::new("probe", b"gacgtcaacc")];
        let summary = m.run(&queries, &writer).unwrap();
        assert_eq!((summary.processed, summary.failed), (1, 1));
        let text = std::fs::read_to_string(writer.path()).unwrap();
        assert!(text.contains("name=probe"));
        assert!(!text.contains("name=short"));
    }
}
