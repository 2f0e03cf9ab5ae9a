use std::sync::Arc;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::similarity::{AlgorithmId, Alignment, MatchPattern, Scorer, SimilarityScorer};

/// `Σ score_i × weight_i / Σ weight_i`
pub fn combine(parts: &[(f64, u32)]) -> f64 {
    let total: u32 = parts.iter().map(|&(_, w)| w).sum();
    if total == 0 {
        return 0.0;
    }
    let sum: f64 = parts.iter().map(|&(s, w)| s * w as f64).sum();
    sum / total as f64
}

/// 多算法加权打分器；权重为 0 的算法不会被构造，更不会被调用
pub struct WeightedScorer {
    scorers: Vec<(SimilarityScorer, u32)>,
    parts: Vec<(f64, u32)>,
}

impl WeightedScorer {
    pub fn new(config: &SearchConfig, pattern: Option<Arc<MatchPattern>>) -> Result<Self> {
        let settings = config.scorer_settings(pattern);
        let mut scorers = Vec::new();
        for (id, weight) in config.enabled() {
            scorers.push((SimilarityScorer::build(id, &settings)?, weight));
        }
        if scorers.iter().all(|&(_, w)| w == 0) {
            return Err(SearchError::Config("no similarity algorithm is enabled".into()));
        }
        let parts = Vec::with_capacity(scorers.len());
        Ok(Self { scorers, parts })
    }

    pub fn algorithms(&self) -> Vec<AlgorithmId> {
        self.scorers.iter().map(|(s, _)| s.id()).collect()
    }

    /// Combined score plus the per-algorithm breakdown.
    pub fn score(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<(f64, Vec<(AlgorithmId, f64)>)> {
        self.parts.clear();
        let mut breakdown = Vec::with_capacity(self.scorers.len());
        for (scorer, weight) in self.scorers.iter_mut() {
            let s = scorer.score(query, target, offset)?;
            self.parts.push((s, *weight));
            breakdown.push((scorer.id(), s));
        }
        Ok((combine(&self.parts), breakdown))
    }

    pub fn render(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<Vec<(AlgorithmId, Alignment)>> {
        let mut out = Vec::with_capacity(self.scorers.len());
        for (scorer, _) in self.scorers.iter_mut() {
            out.push((scorer.id(), scorer.render(query, target, offset)?));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_weighted_mean() {
        assert_eq!(combine(&[(80.0, 1), (40.0, 1)]), 60.0);
        assert_eq!(combine(&[(80.0, 3), (40.0, 1)]), 70.0);
        assert_eq!(combine(&[]), 0.0);
    }

    #[test]
    fn scores_only_enabled_algorithms() {
        let cfg = SearchConfig::default()
            .with_weight(AlgorithmId::Direct, 1)
            .with_weight(AlgorithmId::Consistency, 1)
            .with_weight(AlgorithmId::TextEdit, 0);
        let mut w = WeightedScorer::new(&cfg, None).unwrap();
        assert_eq!(w.algorithms(), vec![AlgorithmId::Direct, AlgorithmId::Consistency]);

        // direct 3, longest run 2
        let (combined, parts) = w.score(b"aaaa", b"aaga", 0).unwrap();
        assert_eq!(parts, vec![(AlgorithmId::Direct, 3.0), (AlgorithmId::Consistency, 2.0)]);
        assert_eq!(combined, 2.5);

        let rendered = w.render(b"aaaa", b"aaga", 0).unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].1.matches, "**.*");
    }

    #[test]
    fn scan_score_is_the_weighted_mean() {
        let cfg = SearchConfig::default()
            .with_weight(AlgorithmId::Direct, 1)
            .with_weight(AlgorithmId::TextEdit, 1);
        let mut w = WeightedScorer::new(&cfg, None).unwrap();
        // a one-base shift: no positional match, edit distance 2
        let query: Vec<u8> = b"ag".repeat(40);
        let mut target = query[1..].to_vec();
        target.push(b'a');
        let (combined, parts) = w.score(&query, &target, 0).unwrap();
        assert_eq!(parts, vec![(AlgorithmId::TextEdit, 78.0), (AlgorithmId::Direct, 0.0)]);
        assert_eq!(combined, 39.0);

        let cfg = SearchConfig::default()
            .with_weight(AlgorithmId::Direct, 3)
            .with_weight(AlgorithmId::Consistency, 1);
        let mut w = WeightedScorer::new(&cfg, None).unwrap();
        let (combined, _) = w.score(b"aaaa", b"aaga", 0).unwrap();
        assert_eq!(combined, 2.75);
    }

    #[test]
    fn refuses_to_build_without_weights() {
        assert!(WeightedScorer::new(&SearchConfig::default(), None).is_err());
    }
}
