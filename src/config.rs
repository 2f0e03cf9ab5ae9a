use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::similarity::{AlgorithmId, BlatLimits, MatchPattern, PatternConditions, ScorerSettings};
use crate::util::dna::MismatchPolicy;

/// 排序方向：`Increasing` 用于寻找差异最大的区域
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Decreasing,
    Increasing,
}

impl OrderDirection {
    /// Ranking key: larger is better in both directions.
    #[inline]
    pub fn key(self, score: f64) -> f64 {
        match self {
            OrderDirection::Decreasing => score,
            OrderDirection::Increasing => -score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
    /// minimum offset separation between two retained candidates
    pub candidate_distance: usize,
    pub patience: usize,
    /// algorithm weights, zero disables an algorithm
    pub weights: BTreeMap<AlgorithmId, u32>,
    pub conditions: Option<PatternConditions>,
    pub continuous_mismatch_limit: Option<usize>,
    pub order: OrderDirection,
    pub concurrency_limit: usize,
    pub blat: BlatLimits,
    pub mismatch_policy: MismatchPolicy,
    pub progress_interval_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 20,
            candidate_distance: 5,
            patience: 0,
            weights: BTreeMap::new(),
            conditions: None,
            continuous_mismatch_limit: None,
            order: OrderDirection::Decreasing,
            concurrency_limit: 2,
            blat: BlatLimits::default(),
            mismatch_policy: MismatchPolicy::default(),
            progress_interval_secs: 5,
        }
    }
}

impl SearchConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SearchError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| SearchError::Parse {
            path: path.to_path_buf(),
            line: e.line(),
            message: e.to_string(),
        })
    }

    pub fn with_weight(mut self, id: AlgorithmId, weight: u32) -> Self {
        self.weights.insert(id, weight);
        self
    }

    /// Algorithms with a positive weight, in report order.
    pub fn enabled(&self) -> Vec<(AlgorithmId, u32)> {
        self.weights
            .iter()
            .filter(|(_, &w)| w > 0)
            .map(|(&id, &w)| (id, w))
            .collect()
    }

    pub fn is_enabled(&self, id: AlgorithmId) -> bool {
        self.weights.get(&id).is_some_and(|&w| w > 0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.enabled().is_empty() {
            return Err(SearchError::Config("at least one similarity algorithm needs a positive weight".into()));
        }
        if self.top_k == 0 {
            return Err(SearchError::Config("top_k must be at least 1".into()));
        }
        if self.candidate_distance == 0 {
            return Err(SearchError::Config("candidate_distance must be at least 1".into()));
        }
        if self.concurrency_limit == 0 {
            return Err(SearchError::Config("concurrency_limit must be at least 1".into()));
        }
        if self.continuous_mismatch_limit == Some(0) {
            return Err(SearchError::Config("continuous_mismatch_limit must be at least 1".into()));
        }
        if self.is_enabled(AlgorithmId::Pattern) && self.conditions.is_none() {
            return Err(SearchError::Config("pattern similarity is enabled but no conditions are given".into()));
        }
        for &(a, b) in &self.mismatch_policy.equivalences {
            if !a.is_ascii_alphabetic() || !b.is_ascii_alphabetic() {
                return Err(SearchError::Config(format!("mismatch equivalence ({}, {}) is not a base pair", a, b)));
            }
        }
        Ok(())
    }

    /// Compiles the pattern for one query when pattern similarity is enabled.
    pub fn match_pattern(&self, query: &[u8]) -> Result<Option<Arc<MatchPattern>>> {
        match &self.conditions {
            Some(c) if self.is_enabled(AlgorithmId::Pattern) => {
                Ok(Some(Arc::new(MatchPattern::compile(query, c, &self.normalized_policy())?)))
            }
            _ => Ok(None),
        }
    }

    pub fn scorer_settings(&self, pattern: Option<Arc<MatchPattern>>) -> ScorerSettings {
        ScorerSettings {
            policy: self.normalized_policy(),
            patience: self.patience,
            continuous_mismatch_limit: self.continuous_mismatch_limit,
            blat: self.blat,
            pattern,
        }
    }

    fn normalized_policy(&self) -> MismatchPolicy {
        MismatchPolicy {
            equivalences: self
                .mismatch_policy
                .equivalences
                .iter()
                .map(|&(a, b)| (a.to_ascii_lowercase(), b.to_ascii_lowercase()))
                .collect(),
        }
    }
}
