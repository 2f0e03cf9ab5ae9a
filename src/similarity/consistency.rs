use super::{window, AlgorithmId, Alignment, Scorer};
use crate::error::Result;
use crate::util::dna::MismatchPolicy;

/// 连续匹配段：长度 + 段尾（不含）位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub len: usize,
    pub end: usize,
}

impl Run {
    #[inline]
    pub fn start(&self) -> usize {
        self.end - self.len
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyTrace {
    pub score: usize,
    pub runs: Vec<Run>,
    /// 被合并的段下标区间（闭区间）
    pub merged: Option<(usize, usize)>,
}

/// Longest run of consecutive matches, optionally bridging short mismatch
/// gaps within a `patience` budget.
pub struct ConsistencyScorer {
    policy: MismatchPolicy,
    patience: usize,
}

impl ConsistencyScorer {
    pub fn new(policy: MismatchPolicy, patience: usize) -> Self {
        Self { policy, patience }
    }

    pub fn evaluate(&self, query: &[u8], win: &[u8]) -> ConsistencyTrace {
        let n = query.len();
        let mut score = 0usize;
        let mut cur = 0usize;
        // every mismatch closes a (possibly empty) run
        let mut runs: Vec<Run> = Vec::new();
        for i in 0..n {
            if self.policy.is_match(query[i], win[i]) {
                cur += 1;
                if i == n - 1 {
                    runs.push(Run { len: cur, end: n });
                }
            } else {
                runs.push(Run { len: cur, end: i });
                cur = 0;
            }
            score = score.max(cur);
        }

        let mut merged = None;
        for idx in 0..runs.len() {
            let left = runs[idx].start();
            let mut total = 0usize;
            for width in 0..=self.patience {
                let Some(run) = runs.get(idx + width) else {
                    break;
                };
                let span = run.end - left;
                total += run.len;
                if span - total > self.patience {
                    break;
                }
                if total > score {
                    score = total;
                    merged = Some((idx, idx + width));
                }
            }
        }

        ConsistencyTrace { score, runs, merged }
    }
}

impl Scorer for ConsistencyScorer {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::Consistency
    }

    fn score(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<f64> {
        let win = window(query, target, offset)?;
        Ok(self.evaluate(query, win).score as f64)
    }

    fn render(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<Alignment> {
        let win = window(query, target, offset)?;
        let trace = self.evaluate(query, win);
        let (gap_start, gap_end) = match trace.merged {
            Some((a, b)) => (trace.runs[a].start(), trace.runs[b].end),
            None => (0, 0),
        };

        let mut out = Alignment::with_capacity(query.len());
        for (i, (&q, &t)) in query.iter().zip(win).enumerate() {
            let m = if self.policy.is_match(q, t) {
                b'*'
            } else if i >= gap_start && i < gap_end {
                b'-'
            } else {
                b'.'
            };
            out.push(q, t, m);
        }
        Ok(out)
    }
}
