use super::{window, AlgorithmId, Alignment, Scorer};
use crate::error::Result;
use crate::util::dna::MismatchPolicy;

/// 逐位比较，不允许插入/缺失
pub struct DirectScorer {
    policy: MismatchPolicy,
}

impl DirectScorer {
    pub fn new(policy: MismatchPolicy) -> Self {
        Self { policy }
    }
}

impl Scorer for DirectScorer {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::Direct
    }

    fn score(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<f64> {
        let win = window(query, target, offset)?;
        let same = query
            .iter()
            .zip(win)
            .filter(|&(&q, &t)| self.policy.is_match(q, t))
            .count();
        Ok(same as f64)
    }

    fn render(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<Alignment> {
        let win = window(query, target, offset)?;
        let mut out = Alignment::with_capacity(query.len());
        for (&q, &t) in query.iter().zip(win) {
            out.push(q, t, if self.policy.is_match(q, t) { b'*' } else { b'.' });
        }
        Ok(out)
    }
}
