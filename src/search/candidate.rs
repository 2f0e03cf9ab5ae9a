use std::fmt;

use crate::similarity::AlgorithmId;

/// 一个候选匹配位置
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    /// 0-based offsets into the strand being scanned
    pub left: usize,
    pub right: usize,
    pub is_reverse: bool,
    pub database_length: usize,
    pub weighted_similarity: f64,
    /// raw score per enabled algorithm, in report order
    pub similarity: Vec<(AlgorithmId, f64)>,
    /// 1-based genomic coordinates; decreasing on the reverse strand
    pub start: usize,
    pub end: usize,
    pub should_ignore: bool,
}

impl MatchCandidate {
    pub fn new(
        left: usize,
        right: usize,
        is_reverse: bool,
        database_length: usize,
        weighted_similarity: f64,
        similarity: Vec<(AlgorithmId, f64)>,
    ) -> Self {
        let (start, end) = Self::coordinates(left, right, is_reverse, database_length);
        Self {
            left,
            right,
            is_reverse,
            database_length,
            weighted_similarity,
            similarity,
            start,
            end,
            should_ignore: false,
        }
    }

    /// 1-based genomic `(start, end)` of strand offsets `left..=right`.
    #[inline]
    pub fn coordinates(left: usize, right: usize, is_reverse: bool, database_length: usize) -> (usize, usize) {
        if is_reverse {
            (database_length - left, database_length - right)
        } else {
            (left + 1, right + 1)
        }
    }

    pub fn direction(&self) -> char {
        if self.is_reverse {
            '-'
        } else {
            '+'
        }
    }

    /// Genomic span as `(low, high)`, independent of strand.
    pub fn span(&self) -> (usize, usize) {
        (self.start.min(self.end), self.start.max(self.end))
    }

    pub fn similarity_str(&self) -> String {
        let mut s = format!("weighted={:.2}", self.weighted_similarity);
        for (id, v) in &self.similarity {
            s.push_str(&format!(", {}={:.2}", id, v));
        }
        s
    }
}

impl fmt::Display for MatchCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]({}) {}", self.start, self.end, self.direction(), self.similarity_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_coordinates_are_one_based() {
        let c = MatchCandidate::new(10, 29, false, 1000, 20.0, vec![]);
        assert_eq!((c.start, c.end), (11, 30));
        assert_eq!(c.direction(), '+');
    }

    #[test]
    fn reverse_coordinates_count_down() {
        let c = MatchCandidate::new(10, 29, true, 1000, 20.0, vec![]);
        assert_eq!((c.start, c.end), (990, 971));
        assert_eq!(c.span(), (971, 990));
        assert_eq!(c.direction(), '-');
    }

    #[test]
    fn display_lists_scores() {
        let c = MatchCandidate::new(0, 3, false, 10, 3.0, vec![(AlgorithmId::Direct, 3.0)]);
        assert_eq!(c.to_string(), "[1-4](+) weighted=3.00, direct=3.00");
    }
}
