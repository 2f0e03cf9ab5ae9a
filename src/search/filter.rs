use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// 按基因组位置筛选候选（1-based 坐标，start/end 顺序不限）
pub trait LocationFilter: Send + Sync {
    fn in_scope(&self, start: usize, end: usize) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionMode {
    /// span must lie inside an annotated region
    Within,
    /// span must not touch any annotated region, e.g. intergenic only
    Outside,
}

impl FromStr for RegionMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "within" | "inside" => Ok(RegionMode::Within),
            "outside" | "intergenic" => Ok(RegionMode::Outside),
            _ => Err(SearchError::Config(format!("unknown region mode '{}'", s))),
        }
    }
}

pub struct RegionFilter {
    /// merged, sorted, inclusive
    regions: Vec<(usize, usize)>,
    mode: RegionMode,
}

impl RegionFilter {
    pub fn new(mut regions: Vec<(usize, usize)>, mode: RegionMode) -> Self {
        for r in regions.iter_mut() {
            if r.0 > r.1 {
                *r = (r.1, r.0);
            }
        }
        regions.sort_unstable();
        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(regions.len());
        for (l, r) in regions {
            match merged.last_mut() {
                Some(last) if l <= last.1.saturating_add(1) => last.1 = last.1.max(r),
                _ => merged.push((l, r)),
            }
        }
        Self { regions: merged, mode }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Last region starting at or before `pos`.
    fn region_before(&self, pos: usize) -> Option<(usize, usize)> {
        let idx = self.regions.partition_point(|&(l, _)| l <= pos);
        idx.checked_sub(1).map(|i| self.regions[i])
    }
}

impl LocationFilter for RegionFilter {
    fn in_scope(&self, start: usize, end: usize) -> bool {
        let (low, high) = (start.min(end), start.max(end));
        match self.mode {
            RegionMode::Within => self.region_before(low).is_some_and(|(_, r)| high <= r),
            RegionMode::Outside => !self.region_before(high).is_some_and(|(_, r)| r >= low),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions() -> Vec<(usize, usize)> {
        vec![(100, 200), (150, 250), (400, 300)]
    }

    #[test]
    fn merges_and_normalizes_regions() {
        let f = RegionFilter::new(regions(), RegionMode::Within);
        assert_eq!(f.regions, vec![(100, 250), (300, 400)]);
    }

    #[test]
    fn within_requires_full_containment() {
        let f = RegionFilter::new(regions(), RegionMode::Within);
        assert!(f.in_scope(120, 140));
        assert!(f.in_scope(240, 110));
        assert!(!f.in_scope(240, 260));
        assert!(!f.in_scope(10, 20));
    }

    #[test]
    fn outside_rejects_any_overlap() {
        let f = RegionFilter::new(regions(), RegionMode::Outside);
        assert!(f.in_scope(260, 290));
        assert!(f.in_scope(1, 99));
        assert!(!f.in_scope(90, 100));
        assert!(!f.in_scope(390, 500));
    }

    #[test]
    fn mode_names() {
        assert_eq!("intergenic".parse::<RegionMode>().unwrap(), RegionMode::Outside);
        assert!("sideways".parse::<RegionMode>().is_err());
    }
}
