use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rank(f64);

impl Eq for Rank {}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// 容量为 K 的小根堆，仅用于进度日志中的 "当前第 K 名" 下限。
///
/// Final truncation sorts the full deduplicated list; this heap never
/// decides which candidates are reported.
const HEAP_PREALLOC: usize = 1024;

pub struct TopKSelector {
    k: usize,
    heap: BinaryHeap<Reverse<Rank>>,
}

impl TopKSelector {
    pub fn new(k: usize) -> Self {
        let k = k.max(1);
        Self { k, heap: BinaryHeap::with_capacity(k.saturating_add(1).min(HEAP_PREALLOC)) }
    }

    pub fn push(&mut self, rank: f64) {
        self.heap.push(Reverse(Rank(rank)));
        if self.heap.len() > self.k {
            self.heap.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Lowest rank still inside the top K, once K ranks have been seen.
    pub fn floor(&self) -> Option<f64> {
        if self.heap.len() < self.k {
            return None;
        }
        self.heap.peek().map(|r| r.0 .0)
    }

}
