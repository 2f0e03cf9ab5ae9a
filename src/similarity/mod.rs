//! 相似度算法族。
//!
//! Every algorithm compares a query against the equal-length genome window
//! starting at `offset` and exposes two modes: `score` for the scan loop and
//! `render` for the report. New algorithms are added as a variant of
//! [`AlgorithmId`] plus an arm in [`SimilarityScorer::build`]; the scanner
//! only sees the [`Scorer`] interface.

pub mod blat;
pub mod consistency;
pub mod direct;
pub mod edit;
pub mod pattern;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::util::dna::MismatchPolicy;

pub use blat::{BlatLimits, BlatScorer};
pub use consistency::ConsistencyScorer;
pub use direct::DirectScorer;
pub use edit::EditScorer;
pub use pattern::{Constraint, MatchPattern, PatternConditions, PatternScorer};

/// 算法标识，排序即报告中的输出顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AlgorithmId {
    TextEdit,
    Direct,
    Consistency,
    Pattern,
    Blat,
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 5] = [
        AlgorithmId::TextEdit,
        AlgorithmId::Direct,
        AlgorithmId::Consistency,
        AlgorithmId::Pattern,
        AlgorithmId::Blat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmId::TextEdit => "textedit",
            AlgorithmId::Direct => "direct",
            AlgorithmId::Consistency => "consistency",
            AlgorithmId::Pattern => "pattern",
            AlgorithmId::Blat => "blat",
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmId {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "textedit" | "text_edit" | "textdistance" | "text_distance" | "edit" => {
                Ok(AlgorithmId::TextEdit)
            }
            "direct" | "direct_match" => Ok(AlgorithmId::Direct),
            "consistency" | "consistent" => Ok(AlgorithmId::Consistency),
            "pattern" | "pat" => Ok(AlgorithmId::Pattern),
            "blat" => Ok(AlgorithmId::Blat),
            _ => Err(SearchError::Config(format!("unknown similarity algorithm '{}'", s))),
        }
    }
}

impl TryFrom<String> for AlgorithmId {
    type Error = SearchError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<AlgorithmId> for String {
    fn from(id: AlgorithmId) -> String {
        id.name().to_string()
    }
}

/// 三轨比对展示：query / target / match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    pub query: String,
    pub target: String,
    pub matches: String,
}

impl Alignment {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            query: String::with_capacity(n),
            target: String::with_capacity(n),
            matches: String::with_capacity(n),
        }
    }

    #[inline]
    pub fn push(&mut self, q: u8, t: u8, m: u8) {
        self.query.push(q as char);
        self.target.push(t as char);
        self.matches.push(m as char);
    }

    pub fn append(&mut self, other: Alignment) {
        self.query.push_str(&other.query);
        self.target.push_str(&other.target);
        self.matches.push_str(&other.matches);
    }
}

pub trait Scorer {
    fn id(&self) -> AlgorithmId;

    /// Similarity of `query` against `target[offset..offset + query.len()]`.
    fn score(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<f64>;

    fn render(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<Alignment>;
}

/// 构造打分器所需的全部参数
#[derive(Debug, Clone, Default)]
pub struct ScorerSettings {
    pub policy: MismatchPolicy,
    pub patience: usize,
    pub continuous_mismatch_limit: Option<usize>,
    pub blat: BlatLimits,
    pub pattern: Option<Arc<MatchPattern>>,
}

pub enum SimilarityScorer {
    TextEdit(EditScorer),
    Direct(DirectScorer),
    Consistency(ConsistencyScorer),
    Pattern(PatternScorer),
    Blat(BlatScorer),
}

impl SimilarityScorer {
    pub fn build(id: AlgorithmId, settings: &ScorerSettings) -> Result<Self> {
        let policy = settings.policy.clone();
        Ok(match id {
            AlgorithmId::TextEdit => {
                SimilarityScorer::TextEdit(EditScorer::new(policy, settings.continuous_mismatch_limit))
            }
            AlgorithmId::Direct => SimilarityScorer::Direct(DirectScorer::new(policy)),
            AlgorithmId::Consistency => {
                SimilarityScorer::Consistency(ConsistencyScorer::new(policy, settings.patience))
            }
            AlgorithmId::Pattern => {
                let pattern = settings.pattern.clone().ok_or_else(|| {
                    SearchError::Config("pattern similarity requires pattern conditions".into())
                })?;
                SimilarityScorer::Pattern(PatternScorer::new(policy, pattern))
            }
            AlgorithmId::Blat => SimilarityScorer::Blat(BlatScorer::new(policy, settings.blat)),
        })
    }
}

impl Scorer for SimilarityScorer {
    fn id(&self) -> AlgorithmId {
        match self {
            SimilarityScorer::TextEdit(s) => s.id(),
            SimilarityScorer::Direct(s) => s.id(),
            SimilarityScorer::Consistency(s) => s.id(),
            SimilarityScorer::Pattern(s) => s.id(),
            SimilarityScorer::Blat(s) => s.id(),
        }
    }

    fn score(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<f64> {
        match self {
            SimilarityScorer::TextEdit(s) => s.score(query, target, offset),
            SimilarityScorer::Direct(s) => s.score(query, target, offset),
            SimilarityScorer::Consistency(s) => s.score(query, target, offset),
            SimilarityScorer::Pattern(s) => s.score(query, target, offset),
            SimilarityScorer::Blat(s) => s.score(query, target, offset),
        }
    }

    fn render(&mut self, query: &[u8], target: &[u8], offset: usize) -> Result<Alignment> {
        match self {
            SimilarityScorer::TextEdit(s) => s.render(query, target, offset),
            SimilarityScorer::Direct(s) => s.render(query, target, offset),
            SimilarityScorer::Consistency(s) => s.render(query, target, offset),
            SimilarityScorer::Pattern(s) => s.render(query, target, offset),
            SimilarityScorer::Blat(s) => s.render(query, target, offset),
        }
    }
}

/// 取出与 query 等长的窗口
#[inline]
pub(crate) fn window<'a>(query: &[u8], target: &'a [u8], offset: usize) -> Result<&'a [u8]> {
    let end = offset + query.len();
    target.get(offset..end).ok_or_else(|| {
        SearchError::Internal(format!(
            "window {}..{} exceeds target length {}",
            offset,
            end,
            target.len()
        ))
    })
}
