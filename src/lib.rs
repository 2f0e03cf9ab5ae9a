//! # probe-scan
//!
//! 在整条基因组上为短探针序列寻找近似匹配位置的 Rust 工具。
//!
//! 对每个 query，在正链与反向互补链上逐个偏移滑动等长窗口，用一组可加权组合的
//! 相似度算法打分，经空间去重后保留全局 top-K，并为最终候选渲染三轨比对文本。
//!
//! - **相似度算法**：编辑距离、逐位匹配、连续性、正则模式、BLAT 风格锚点搜索
//! - **候选筛选**：`candidate_distance` 邻域内只保留最优者
//! - **并发**：query 之间与两条链之间并行（rayon）
//! - **报告**：制表符分隔的文本块，供下游位置分析工具解析
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use probe_scan::config::SearchConfig;
//! use probe_scan::io::{Genome, Query};
//! use probe_scan::search::{GeneSimilarityMatch, ScanProgress};
//! use probe_scan::similarity::AlgorithmId;
//!
//! let genome = Arc::new(Genome::from_sequence("toy", b"ttttgacgtcaaccttttggttgacgtctttt"));
//! let config = SearchConfig::default()
//!     .with_weight(AlgorithmId::Direct, 1)
//!     .with_weight(AlgorithmId::TextEdit, 1);
//! let matcher = GeneSimilarityMatch::new(genome, config).unwrap();
//!
//! let query = Query::new("probe", b"GACGTCAACC");
//! for hit in matcher.find_candidates(&query, &ScanProgress::new()).unwrap() {
//!     println!("{}", hit.candidate);
//! }
//! ```
//!
//! ## 模块说明
//!
//! - [`io`]：FASTA / GenBank 基因组、query 表、区域表读取与报告输出
//! - [`similarity`]：各相似度算法及其统一接口
//! - [`search`]：单链扫描、候选窗口、top-K 与整体调度
//! - [`config`]：搜索参数与校验
//! - [`util`]：碱基归一化、反向互补、错配等价规则

pub mod config;
pub mod error;
pub mod io;
pub mod search;
pub mod similarity;
pub mod util;

pub use error::{Result, SearchError};
