use std::sync::Arc;
use std::time::Duration;

use super::candidate::MatchCandidate;
use super::filter::LocationFilter;
use super::progress::{ProgressLogger, ScanProgress};
use super::topk::TopKSelector;
use super::weighted::WeightedScorer;
use super::window::CandidateWindow;
use crate::config::{OrderDirection, SearchConfig};
use crate::error::Result;
use crate::similarity::MatchPattern;

/// 候选列表超过该长度时压缩到 top_k
pub const CANDIDATE_CLEAR_SIZE: usize = 10_000;
/// offsets between progress/clock checks
const PROGRESS_STRIDE: usize = 4096;

/// Stable sort best-first under `order`, then keep the first `k`.
pub fn rank_and_truncate(list: &mut Vec<MatchCandidate>, order: OrderDirection, k: usize) {
    list.sort_by(|a, b| order.key(b.weighted_similarity).total_cmp(&order.key(a.weighted_similarity)));
    list.truncate(k);
}

/// 单条链、单个 query 的完整线性扫描
pub struct StrandScanner<'a> {
    pub name: &'a str,
    pub query: &'a [u8],
    pub strand: &'a [u8],
    pub is_reverse: bool,
    pub config: &'a SearchConfig,
    pub pattern: Option<Arc<MatchPattern>>,
    pub filter: Option<&'a dyn LocationFilter>,
    pub progress: &'a ScanProgress,
}

impl StrandScanner<'_> {
    pub fn scan(&self) -> Result<Vec<MatchCandidate>> {
        let n = self.query.len();
        let database_length = self.strand.len();
        if n == 0 || n > database_length {
            return Ok(Vec::new());
        }
        let order = self.config.order;
        let top_k = self.config.top_k;
        let total = database_length - n + 1;

        let mut scorer = WeightedScorer::new(self.config, self.pattern.clone())?;
        let mut window = CandidateWindow::new(self.config.candidate_distance, order);
        let mut heap = TopKSelector::new(top_k);
        let mut logger = ProgressLogger::new(Duration::from_secs(self.config.progress_interval_secs));
        let mut candidates: Vec<MatchCandidate> = Vec::new();
        let mut unreported = 0usize;

        for offset in 0..total {
            // out-of-scope offsets score zero and never compete with in-scope neighbours
            let in_scope = self.filter.map_or(true, |f| {
                let (start, end) = MatchCandidate::coordinates(offset, offset + n - 1, self.is_reverse, database_length);
                f.in_scope(start, end)
            });

            if in_scope {
                let (weighted, parts) = scorer.score(self.query, self.strand, offset)?;
                let candidate =
                    MatchCandidate::new(offset, offset + n - 1, self.is_reverse, database_length, weighted, parts);
                let before = candidates.len();
                window.push(candidate, &mut candidates);
                for c in &candidates[before..] {
                    heap.push(order.key(c.weighted_similarity));
                }
                if candidates.len() > CANDIDATE_CLEAR_SIZE {
                    rank_and_truncate(&mut candidates, order, top_k);
                }
            }

            unreported += 1;
            if unreported == PROGRESS_STRIDE {
                self.progress.advance(unreported as u64);
                unreported = 0;
                logger.tick(offset as u64 + 1, total as u64, || self.progress_line(&heap, candidates.len()));
            }
        }
        self.progress.advance(unreported as u64);
        window.flush(&mut candidates);
        Ok(candidates)
    }

    fn progress_line(&self, heap: &TopKSelector, retained: usize) -> String {
        let floor = heap
            .floor()
            .map(|r| format!("{:.2}", self.config.order.key(r)))
            .unwrap_or_else(|| "None".to_string());
        format!(
            "Analysis for {}[{}] --top_k={} --top_k_floor={} --gene_length={} --candidates_num={}",
            self.name,
            if self.is_reverse { '-' } else { '+' },
            self.config.top_k,
            floor,
            self.query.len(),
            retained
        )
    }
}
