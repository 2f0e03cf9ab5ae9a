use serde::{Deserialize, Serialize};

use super::{AlgorithmId, Alignment, Scorer};
use crate::error::Result;
use crate::util::dna::MismatchPolicy;

/// 锚点长度：左右两半各 4 个碱基
pub const ANCHOR_LEN: usize = 8;
const HALF: usize = ANCHOR_LEN / 2;
/// 命中时的得分基数，跨度越短得分越高
const SPAN_BASE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlatLimits {
    /// target bases that may be skipped inside each half
    pub end_limit: usize,
    /// target bases that may be skipped across the middle gap
    pub mid_limit: usize,
}

impl Default for BlatLimits {
    fn default() -> Self {
        Self { end_limit: 2, mid_limit: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// anchor position, target position
    Match(usize, usize),
    /// skipped target position
    Skip(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlatHit {
    /// exclusive end of the matched target span
    pub end: usize,
    pub steps: Vec<Step>,
}

struct Search<'a> {
    anchor: &'a [u8],
    target: &'a [u8],
    policy: &'a MismatchPolicy,
    limits: BlatLimits,
    /// steps are only kept when rendering
    record: bool,
    steps: Vec<Step>,
}

impl Search<'_> {
    #[inline]
    fn note(&mut self, step: Step) {
        if self.record {
            self.steps.push(step);
        }
    }

    #[inline]
    fn differs(&self, pg: usize, pd: usize) -> bool {
        self.policy.should_change(self.anchor[pg], self.target[pd]) > 0
    }

    /// Extends one half of the anchor, tolerating up to `end_limit` skipped
    /// target bases. Returns the anchor and target positions reached.
    fn extend_half(&mut self, mut pg: usize, mut pd: usize, stop: usize) -> Option<(usize, usize)> {
        let mut inserted = 0usize;
        let mut matched_run = 1usize;
        let mut clean = false;
        while pg < stop && pd < self.target.len() {
            while self.differs(pg, pd) {
                matched_run = 0;
                inserted += 1;
                self.note(Step::Skip(pd));
                pd += 1;
                if inserted > self.limits.end_limit || pd >= self.target.len() {
                    return None;
                }
            }
            if matched_run > 0 {
                clean = true;
            }
            matched_run += 1;
            self.note(Step::Match(pg, pd));
            pg += 1;
            pd += 1;
        }
        if !clean || pg < stop {
            return None;
        }
        Some((pg, pd))
    }

    /// 中间间隙：先尝试当前位置继续右半段，失败再把间隙加宽一个碱基
    fn cross_gap(&mut self, mut pd: usize, mut inserted: usize) -> Option<usize> {
        if inserted > self.limits.mid_limit || pd >= self.target.len() {
            return None;
        }
        while self.differs(HALF, pd) {
            self.note(Step::Skip(pd));
            pd += 1;
            inserted += 1;
            if pd >= self.target.len() || inserted > self.limits.mid_limit {
                return None;
            }
        }
        let mark = self.steps.len();
        self.note(Step::Match(HALF, pd));
        if let Some((_, end)) = self.extend_half(HALF + 1, pd + 1, ANCHOR_LEN) {
            return Some(end);
        }
        self.steps.truncate(mark);
        self.note(Step::Skip(pd));
        self.cross_gap(pd + 1, inserted + 1)
    }

    fn run(&mut self, offset: usize) -> Option<usize> {
        if offset >= self.target.len() || self.differs(0, offset) {
            return None;
        }
        self.note(Step::Match(0, offset));
        let (_, pd) = self.extend_half(1, offset + 1, HALF)?;
        // the middle region always opens with one skipped base
        if pd < self.target.len() {
            self.note(Step::Skip(pd));
        }
        self.cross_gap(pd + 1, 1)
    }
}

/// BLAT 风格的种子延伸：8 碱基锚点，左右各 4 个碱基，中间允许可变长间隙
pub struct BlatScorer {
    policy: MismatchPolicy,
    limits: BlatLimits,
}

impl BlatScorer {
    pub fn new(policy: MismatchPolicy, limits: BlatLimits) -> Self {
        Self { policy, limits }
    }

    /// Anchor search with the alignment steps recorded.
    pub fn search(&self, query: &[u8], target: &[u8], offset: usize) -> Option<BlatHit> {
        self.find(query, target, offset, true)
    }

    fn find(&self, query: &[u8], target: &[u8], offset: usize, record: bool) -> Option<BlatHit> {
        if query.len() < ANCHOR_LEN {
            return None;
        }
        let mut search = Search {
            anchor: &query[..ANCHOR_LEN],
            target,
            policy: &self.policy,
            limits: self.limits,
            record,
            steps: Vec::new(),
        };
        let end = search.run(offset)?;
        Some(BlatHit { end, steps: search.steps })
    }
}

impl Scorer for BlatScorer {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::Blat
    }

    fn score(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<f64> {
        Ok(match self.find(query, target, offset, false) {
            Some(hit) => SPAN_BASE - (hit.end - offset) as f64,
            None => 0.0,
        })
    }

    fn render(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<Alignment> {
        let Some(hit) = self.search(query, target, offset) else {
            let anchor = &query[..query.len().min(ANCHOR_LEN)];
            let mut out = Alignment::with_capacity(anchor.len());
            for (i, &q) in anchor.iter().enumerate() {
                out.push(q, target.get(offset + i).copied().unwrap_or(b'-'), b'.');
            }
            return Ok(out);
        };

        let mut out = Alignment::with_capacity(hit.steps.len());
        for step in &hit.steps {
            match *step {
                Step::Match(pg, pd) => out.push(query[pg], target[pd], b'*'),
                Step::Skip(pd) => out.push(b'-', target[pd], b'.'),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> BlatScorer {
        BlatScorer::new(MismatchPolicy::default(), BlatLimits::default())
    }

    #[test]
    fn finds_anchor_across_middle_gap() {
        let hit = scorer().search(b"tgatatca", b"tgataatca", 0).expect("hit");
        assert_eq!(hit.end, 9);
    }

    #[test]
    fn contiguous_anchor_has_no_middle_gap() {
        assert_eq!(scorer().search(b"tgatatca", b"tgatatca", 0), None);
    }

    #[test]
    fn score_prefers_tight_spans() {
        let mut s = scorer();
        assert_eq!(s.score(b"tgatatca", b"tgataatca", 0).unwrap(), 41.0);
        assert_eq!(s.score(b"tgatatca", b"tgatatca", 0).unwrap(), 0.0);
        assert_eq!(s.score(b"tgatatca", b"gtgataatca", 1).unwrap(), 41.0);
    }

    #[test]
    fn right_half_must_fit_inside_target() {
        // the right half runs off the end after two bases
        assert_eq!(scorer().search(b"tgatatca", b"tgataat", 0), None);
        assert_eq!(scorer().score(b"tgatatca", b"tgataat", 0).unwrap(), 0.0);
    }

    #[test]
    fn scoring_does_not_record_steps() {
        let hit = scorer().find(b"tgatatca", b"tgataatca", 0, false).expect("hit");
        assert_eq!(hit.end, 9);
        assert!(hit.steps.is_empty());
        assert_eq!(scorer().search(b"tgatatca", b"tgataatca", 0).map(|h| h.steps.len()), Some(9));
    }

    #[test]
    fn short_query_never_matches() {
        assert_eq!(scorer().search(b"tgat", b"tgataatca", 0), None);
    }

    #[test]
    fn mid_limit_bounds_the_gap() {
        // 12 filler bases between the halves
        let target = b"tgatggggggggggggatca";
        let tight = BlatScorer::new(MismatchPolicy::default(), BlatLimits { end_limit: 2, mid_limit: 10 });
        assert_eq!(tight.search(b"tgatatca", target, 0), None);
        let loose = BlatScorer::new(MismatchPolicy::default(), BlatLimits { end_limit: 2, mid_limit: 20 });
        assert_eq!(loose.search(b"tgatatca", target, 0).map(|h| h.end), Some(20));
    }

    #[test]
    fn render_concatenates_halves_and_gap() {
        let mut s = scorer();
        let aln = s.render(b"tgatatca", b"tgataatca", 0).unwrap();
        assert_eq!(aln.query, "tgat-atca");
        assert_eq!(aln.target, "tgataatca");
        assert_eq!(aln.matches, "****.****");
    }
}
