//! Online spatial deduplication of per-offset candidates.
//!
//! Candidates arrive in strictly increasing `left` order for a single
//! strand/query pair. Every pair closer than `distance` is compared exactly
//! once while both sit in the pending buffer, so the committed output never
//! holds two live candidates closer than `distance`, and each one outranks
//! all of its neighbours. On equal rank the earlier candidate wins.

use std::collections::VecDeque;

use super::candidate::MatchCandidate;
use crate::config::OrderDirection;

/// 预分配上限；`distance` 来自配置，可能远大于实际需要
const PENDING_PREALLOC: usize = 64;

pub struct CandidateWindow {
    distance: usize,
    order: OrderDirection,
    pending: VecDeque<MatchCandidate>,
}

impl CandidateWindow {
    pub fn new(distance: usize, order: OrderDirection) -> Self {
        let distance = distance.max(1);
        Self { distance, order, pending: VecDeque::with_capacity(distance.min(PENDING_PREALLOC)) }
    }

    /// 插入新候选；被挤出缓冲区且未被忽略的候选追加到 `out`
    pub fn push(&mut self, mut candidate: MatchCandidate, out: &mut Vec<MatchCandidate>) {
        while let Some(front) = self.pending.front() {
            let far = candidate.left.abs_diff(front.left) >= self.distance;
            if self.pending.len() < self.distance && !far {
                break;
            }
            self.evict_front(out);
        }

        if self.order == OrderDirection::Decreasing && candidate.weighted_similarity <= 0.0 {
            candidate.should_ignore = true;
        }
        let rank = self.order.key(candidate.weighted_similarity);
        for old in self.pending.iter_mut() {
            let old_rank = self.order.key(old.weighted_similarity);
            if old_rank >= rank {
                candidate.should_ignore = true;
            } else {
                old.should_ignore = true;
            }
        }
        self.pending.push_back(candidate);
    }

    /// 扫描结束后清空缓冲区
    pub fn flush(&mut self, out: &mut Vec<MatchCandidate>) {
        while !self.pending.is_empty() {
            self.evict_front(out);
        }
    }

    fn evict_front(&mut self, out: &mut Vec<MatchCandidate>) {
        if let Some(old) = self.pending.pop_front() {
            if !old.should_ignore {
                out.push(old);
            }
        }
    }
}
