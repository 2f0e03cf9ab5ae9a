use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use log::info;

/// 跨扫描任务共享的进度计数器，只用于日志
#[derive(Debug, Default)]
pub struct ScanProgress {
    scanned: AtomicU64,
    total: AtomicU64,
}

impl ScanProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_total(&self, n: u64) {
        self.total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn advance(&self, n: u64) {
        self.scanned.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> (u64, u64) {
        (self.scanned.load(Ordering::Relaxed), self.total.load(Ordering::Relaxed))
    }
}

/// Logs at most once per `interval` of wall-clock time.
pub struct ProgressLogger {
    interval: Duration,
    started: Instant,
    last: Option<Instant>,
}

impl ProgressLogger {
    pub fn new(interval: Duration) -> Self {
        Self { interval, started: Instant::now(), last: None }
    }

    /// 到期时输出 `msg solved/total(pct%), remain HH:MM:SS`
    pub fn tick<F: FnOnce() -> String>(&mut self, solved: u64, total: u64, msg: F) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last {
            if now.duration_since(last) < self.interval {
                return false;
            }
        }
        self.last = Some(now);
        let pct = if total > 0 { solved as f64 * 100.0 / total as f64 } else { 100.0 };
        match eta(now.duration_since(self.started), solved, total) {
            Some(remain) => info!("{} {}/{}({:.2}%), remain {}", msg(), solved, total, pct, format_hms(remain)),
            None => info!("{} {}/{}({:.2}%)", msg(), solved, total, pct),
        }
        true
    }
}

pub fn eta(elapsed: Duration, solved: u64, total: u64) -> Option<Duration> {
    if solved == 0 || total <= 1 {
        return None;
    }
    let remaining = total.saturating_sub(solved);
    Some(elapsed.mul_f64(remaining as f64 / solved as f64))
}

pub fn format_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}
