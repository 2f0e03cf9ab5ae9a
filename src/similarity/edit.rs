use super::{window, AlgorithmId, Alignment, Scorer};
use crate::error::{Result, SearchError};
use crate::util::dna::MismatchPolicy;

/// DP 工作缓冲区，可跨 offset 复用
#[derive(Debug, Default)]
struct EditBuffer {
    dp: Vec<i32>,
    cols: usize,
}

impl EditBuffer {
    fn resize(&mut self, n: usize) {
        self.cols = n + 1;
        self.dp.resize(self.cols * self.cols, 0);
    }

    #[inline]
    fn at(&self, i: usize, j: usize) -> i32 {
        self.dp[i * self.cols + j]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Diag,
    Up,
    Left,
}

/// 等长窗口上的 Levenshtein 编辑距离相似度：`n - dp[n][n]`
///
/// Borders are the classic `dp[i][0] = i`, `dp[0][j] = j`, so leading
/// indels are charged normally. Scores therefore differ from tools that pin
/// `query[0]` to `window[0]` (all borders except the corner set to infinity):
/// `acgt` against `cgta` is 2 here, 1 under the pinned variant.
pub struct EditScorer {
    policy: MismatchPolicy,
    continuous_mismatch_limit: Option<usize>,
    buf: EditBuffer,
}

impl EditScorer {
    pub fn new(policy: MismatchPolicy, continuous_mismatch_limit: Option<usize>) -> Self {
        Self { policy, continuous_mismatch_limit, buf: EditBuffer::default() }
    }

    fn fill(&mut self, query: &[u8], win: &[u8]) {
        let n = query.len();
        self.buf.resize(n);
        let cols = self.buf.cols;
        let dp = &mut self.buf.dp;
        for j in 0..=n {
            dp[j] = j as i32;
        }
        for i in 1..=n {
            dp[i * cols] = i as i32;
            let qa = query[i - 1];
            for j in 1..=n {
                let subst = dp[(i - 1) * cols + (j - 1)] + self.policy.should_change(qa, win[j - 1]);
                let up = dp[(i - 1) * cols + j] + 1;
                let left = dp[i * cols + (j - 1)] + 1;
                dp[i * cols + j] = subst.min(up).min(left);
            }
        }
    }

    /// 从 (i, j) 回退一步；相等时优先对角线
    fn step_back(&self, query: &[u8], win: &[u8], i: usize, j: usize) -> Result<Step> {
        let here = self.buf.at(i, j);
        if i > 0 && j > 0 && here == self.buf.at(i - 1, j - 1) + self.policy.should_change(query[i - 1], win[j - 1]) {
            Ok(Step::Diag)
        } else if i > 0 && here == self.buf.at(i - 1, j) + 1 {
            Ok(Step::Up)
        } else if j > 0 && here == self.buf.at(i, j - 1) + 1 {
            Ok(Step::Left)
        } else {
            Err(SearchError::Internal(format!("edit distance traceback stuck at ({}, {})", i, j)))
        }
    }

    /// Walks the traceback and reports whether a run of `limit` consecutive
    /// mismatches or indels occurs on it.
    fn hits_mismatch_run(&self, query: &[u8], win: &[u8], limit: usize) -> Result<bool> {
        let (mut i, mut j) = (query.len(), win.len());
        let mut run = 0usize;
        while i > 0 || j > 0 {
            match self.step_back(query, win, i, j)? {
                Step::Diag => {
                    if self.policy.should_change(query[i - 1], win[j - 1]) != 0 {
                        run += 1;
                    } else {
                        run = 0;
                    }
                    i -= 1;
                    j -= 1;
                }
                Step::Up => {
                    run += 1;
                    i -= 1;
                }
                Step::Left => {
                    run += 1;
                    j -= 1;
                }
            }
            if run >= limit {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Scorer for EditScorer {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::TextEdit
    }

    fn score(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<f64> {
        let win = window(query, target, offset)?;
        let n = query.len();
        self.fill(query, win);
        let distance = self.buf.at(n, n);
        if let Some(limit) = self.continuous_mismatch_limit {
            if self.hits_mismatch_run(query, win, limit)? {
                return Ok(0.0);
            }
        }
        Ok((n as i32 - distance) as f64)
    }

    fn render(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<Alignment> {
        let win = window(query, target, offset)?;
        self.fill(query, win);

        let mut ops: Vec<(u8, u8, u8)> = Vec::with_capacity(query.len() * 2);
        let (mut i, mut j) = (query.len(), win.len());
        while i > 0 || j > 0 {
            match self.step_back(query, win, i, j)? {
                Step::Diag => {
                    let m = if self.policy.is_match(query[i - 1], win[j - 1]) { b'*' } else { b'.' };
                    ops.push((query[i - 1], win[j - 1], m));
                    i -= 1;
                    j -= 1;
                }
                Step::Up => {
                    ops.push((query[i - 1], b'-', b'.'));
                    i -= 1;
                }
                Step::Left => {
                    ops.push((b'-', win[j - 1], b'.'));
                    j -= 1;
                }
            }
        }

        let mut out = Alignment::with_capacity(ops.len());
        for &(q, t, m) in ops.iter().rev() {
            out.push(q, t, m);
        }
        Ok(out)
    }
}
