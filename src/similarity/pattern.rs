use std::sync::Arc;

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use super::{window, AlgorithmId, Alignment, Scorer};
use crate::error::{Result, SearchError};
use crate::util::dna::MismatchPolicy;

/// 位置约束：`offset` 为负时从 query 末尾起算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub offset: i64,
    pub length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternConditions {
    #[serde(default)]
    pub must: Vec<Constraint>,
    #[serde(default)]
    pub optional: Vec<Constraint>,
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    regex: Regex,
    score: usize,
    /// resolved `[start, end)` spans in query coordinates
    spans: Vec<(usize, usize)>,
}

/// A query-specific matcher built from [`PatternConditions`].
///
/// Each optional pattern embeds the mandatory constraints, so an optional
/// bonus is only ever awarded on top of a mandatory match.
#[derive(Debug, Clone)]
pub struct MatchPattern {
    must: CompiledPattern,
    optional: Vec<CompiledPattern>,
}

impl MatchPattern {
    pub fn compile(query: &[u8], conditions: &PatternConditions, policy: &MismatchPolicy) -> Result<Self> {
        let must = generate_pattern(query, &conditions.must, policy)?;
        let mut optional = Vec::with_capacity(conditions.optional.len());
        for &extra in &conditions.optional {
            let mut combined = vec![extra];
            combined.extend_from_slice(&conditions.must);
            let mut compiled = generate_pattern(query, &combined, policy)?;
            compiled.score -= must.score;
            compiled.spans.retain(|span| !must.spans.contains(span));
            optional.push(compiled);
        }
        Ok(Self { must, optional })
    }

    pub fn must_score(&self) -> usize {
        self.must.score
    }

    pub fn must_source(&self) -> &str {
        self.must.regex.as_str()
    }

    pub fn optional_sources(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.optional.iter().map(|p| (p.regex.as_str(), p.score))
    }

    /// Score of a genome window, 0 when the mandatory pattern fails.
    pub fn score_window(&self, win: &[u8]) -> usize {
        if !self.must.regex.is_match(win) {
            return 0;
        }
        let bonus: usize = self
            .optional
            .iter()
            .filter(|p| p.regex.is_match(win))
            .map(|p| p.score)
            .sum();
        self.must.score + bonus
    }

    fn matched_spans(&self, win: &[u8]) -> Vec<(usize, usize)> {
        if !self.must.regex.is_match(win) {
            return Vec::new();
        }
        let mut spans = self.must.spans.clone();
        for p in &self.optional {
            if p.regex.is_match(win) {
                spans.extend_from_slice(&p.spans);
            }
        }
        spans
    }
}

fn resolve(query_len: usize, c: &Constraint) -> Result<(usize, usize)> {
    let start = if c.offset < 0 {
        query_len as i64 + c.offset
    } else {
        c.offset
    };
    if c.length == 0 {
        return Err(SearchError::Pattern(format!("constraint at offset {} has zero length", c.offset)));
    }
    if start < 0 || start as usize + c.length > query_len {
        return Err(SearchError::Pattern(format!(
            "constraint {{offset: {}, length: {}}} falls outside a query of length {}",
            c.offset, c.length, query_len
        )));
    }
    Ok((start as usize, start as usize + c.length))
}

fn literal(bases: &[u8], policy: &MismatchPolicy) -> String {
    let mut out = String::with_capacity(bases.len() * 2);
    for &b in bases {
        let b = b.to_ascii_lowercase();
        let alts = policy.widen(b);
        if alts.len() == 1 {
            out.push_str(&regex::escape(&(b as char).to_string()));
        } else {
            let parts: Vec<String> = alts.iter().map(|&a| regex::escape(&(a as char).to_string())).collect();
            out.push('(');
            out.push_str(&parts.join("|"));
            out.push(')');
        }
    }
    out
}

fn generate_pattern(query: &[u8], constraints: &[Constraint], policy: &MismatchPolicy) -> Result<CompiledPattern> {
    let n = query.len();
    let mut spans = constraints
        .iter()
        .map(|c| resolve(n, c))
        .collect::<Result<Vec<_>>>()?;
    spans.sort_unstable();

    let mut body = String::new();
    let mut score = 0usize;
    let mut index = 0usize;
    for &(start, end) in &spans {
        if start < index {
            return Err(SearchError::Pattern(format!(
                "constraint at {}..{} overlaps the previous one ending at {}",
                start, end, index
            )));
        }
        if start == 0 {
            body.push('^');
        }
        if start > index {
            body.push_str(".+");
        }
        body.push_str(&literal(&query[start..end], policy));
        index = end;
        if index == n {
            body.push('$');
        }
        score += end - start;
    }
    if index != n {
        body.push_str(".+");
    }

    // anchored at the window start, like a prefix match
    let source = format!("^(?:{})", body);
    let regex = Regex::new(&source).map_err(|e| SearchError::Pattern(e.to_string()))?;
    Ok(CompiledPattern { regex, score, spans })
}

pub struct PatternScorer {
    policy: MismatchPolicy,
    pattern: Arc<MatchPattern>,
}

impl PatternScorer {
    pub fn new(policy: MismatchPolicy, pattern: Arc<MatchPattern>) -> Self {
        Self { policy, pattern }
    }
}

impl Scorer for PatternScorer {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::Pattern
    }

    fn score(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<f64> {
        let win = window(query, target, offset)?;
        Ok(self.pattern.score_window(win) as f64)
    }

    fn render(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<Alignment> {
        let win = window(query, target, offset)?;
        let spans = self.pattern.matched_spans(win);
        let mut out = Alignment::with_capacity(query.len());
        for (i, (&q, &t)) in query.iter().zip(win).enumerate() {
            let covered = spans.iter().any(|&(s, e)| i >= s && i < e);
            let m = if covered && self.policy.is_match(q, t) { b'*' } else { b'.' };
            out.push(q, t, m);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUERY: &[u8] = b"ggacttaaccgtga";

    fn conditions() -> PatternConditions {
        PatternConditions {
            must: vec![Constraint { offset: 0, length: 4 }, Constraint { offset: -4, length: 4 }],
            optional: vec![Constraint { offset: 4, length: 1 }, Constraint { offset: -5, length: 1 }],
        }
    }

    fn compiled() -> MatchPattern {
        MatchPattern::compile(QUERY, &conditions(), &MismatchPolicy::default()).unwrap()
    }

    #[test]
    fn builds_anchored_regex_with_widening() {
        let p = compiled();
        assert_eq!(p.must_source(), "^(?:^gga(c|t).+gtga$)");
        assert_eq!(p.must_score(), 8);
        let optional: Vec<(&str, usize)> = p.optional_sources().collect();
        assert_eq!(optional[0], ("^(?:^gga(c|t)t.+gtga$)", 1));
        assert_eq!(optional[1], ("^(?:^gga(c|t).+(c|t)gtga$)", 1));
    }

    #[test]
    fn scores_mandatory_plus_satisfied_options() {
        let p = compiled();
        assert_eq!(p.score_window(QUERY), 10);
        assert_eq!(p.score_window(b"ggatgggggagtga"), 8);
        assert_eq!(p.score_window(b"aaaaaaaaaaaaaa"), 0);
    }

    #[test]
    fn rejects_malformed_conditions() {
        let policy = MismatchPolicy::default();
        let out_of_range = PatternConditions { must: vec![Constraint { offset: 20, length: 2 }], optional: vec![] };
        assert!(MatchPattern::compile(QUERY, &out_of_range, &policy).is_err());

        let empty = PatternConditions { must: vec![Constraint { offset: 1, length: 0 }], optional: vec![] };
        assert!(MatchPattern::compile(QUERY, &empty, &policy).is_err());

        let overlap = PatternConditions {
            must: vec![Constraint { offset: 0, length: 4 }, Constraint { offset: 2, length: 4 }],
            optional: vec![],
        };
        assert!(matches!(MatchPattern::compile(QUERY, &overlap, &policy), Err(SearchError::Pattern(_))));
    }

    #[test]
    fn scorer_uses_window_at_offset() {
        let p = Arc::new(compiled());
        let mut s = PatternScorer::new(MismatchPolicy::default(), p);
        let mut target = b"tttt".to_vec();
        target.extend_from_slice(QUERY);
        assert_eq!(s.score(QUERY, &target, 4).unwrap(), 10.0);
        assert_eq!(s.score(QUERY, &target, 0).unwrap(), 0.0);

        let aln = s.render(QUERY, &target, 4).unwrap();
        assert_eq!(aln.matches, "*****....*****");
    }
}
