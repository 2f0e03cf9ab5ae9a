use proptest::prelude::*;

use probe_scan::config::OrderDirection;
use probe_scan::search::{CandidateWindow, MatchCandidate};
use probe_scan::similarity::{AlgorithmId, Scorer, ScorerSettings, SimilarityScorer};

fn survivors(scores: &[u8], distance: usize) -> Vec<MatchCandidate> {
    let mut window = CandidateWindow::new(distance, OrderDirection::Decreasing);
    let mut out = Vec::new();
    for (left, &s) in scores.iter().enumerate() {
        let c = MatchCandidate::new(left, left + 9, false, 10_000, s as f64, vec![]);
        window.push(c, &mut out);
    }
    window.flush(&mut out);
    out
}

fn dna(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![b'a', b'c', b'g', b't']), 1..max_len)
}

proptest! {
    #[test]
    fn survivors_are_spaced_local_maxima(
        scores in prop::collection::vec(1u8..20, 1..200),
        distance in 1usize..10,
    ) {
        let out = survivors(&scores, distance);

        for pair in out.windows(2) {
            prop_assert!(pair[1].left >= pair[0].left + distance);
        }
        for c in &out {
            let lo = c.left.saturating_sub(distance - 1);
            let hi = (c.left + distance).min(scores.len());
            for x in lo..hi {
                let s = scores[x] as f64;
                if x < c.left {
                    prop_assert!(s < c.weighted_similarity);
                } else {
                    prop_assert!(s <= c.weighted_similarity);
                }
            }
        }

        let best = scores.iter().copied().max().unwrap_or(0);
        let first_best = scores.iter().position(|&s| s == best).unwrap_or(0);
        prop_assert!(out.iter().any(|c| c.left == first_best));
    }

    #[test]
    fn direct_render_agrees_with_score(query in dna(40), target in dna(60)) {
        prop_assume!(query.len() <= target.len());
        let mut direct = SimilarityScorer::build(AlgorithmId::Direct, &ScorerSettings::default()).unwrap();
        let offset = target.len() - query.len();
        let score = direct.score(&query, &target, offset).unwrap();
        let aln = direct.render(&query, &target, offset).unwrap();
        prop_assert_eq!(aln.query.len(), query.len());
        prop_assert_eq!(aln.target.len(), query.len());
        prop_assert_eq!(aln.matches.chars().filter(|&m| m == '*').count() as f64, score);
    }

    #[test]
    fn edit_similarity_never_below_direct(query in dna(30), target in dna(40)) {
        prop_assume!(query.len() <= target.len());
        let settings = ScorerSettings::default();
        let mut direct = SimilarityScorer::build(AlgorithmId::Direct, &settings).unwrap();
        let mut edit = SimilarityScorer::build(AlgorithmId::TextEdit, &settings).unwrap();
        for offset in 0..=(target.len() - query.len()) {
            let d = direct.score(&query, &target, offset).unwrap();
            let e = edit.score(&query, &target, offset).unwrap();
            prop_assert!(e >= d);
            prop_assert!(e <= query.len() as f64);
        }
    }
}
