use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, SearchError};
use crate::search::MatchCandidate;
use crate::similarity::{AlgorithmId, Alignment};

/// 一个最终候选及其各算法的三轨展示
#[derive(Debug, Clone)]
pub struct RenderedCandidate {
    pub candidate: MatchCandidate,
    pub alignments: Vec<(AlgorithmId, Alignment)>,
}

/// `<output_dir>/<query_file_stem>_match_result.txt`
pub fn result_path(output_dir: &Path, query_file: &Path) -> PathBuf {
    let stem = query_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "queries".to_string());
    output_dir.join(format!("{}_match_result.txt", stem))
}

/// Formats one report block:
///
/// ```text
/// (<index>)
/// ><data_name>/<start>-<end>\t<attributes>,<tracks>
///
/// ```
pub fn format_block(index: usize, data_name: &str, query_name: &str, query: &str, rendered: &RenderedCandidate) -> String {
    let c = &rendered.candidate;
    let mut attrs = format!(
        "name={},direction={},weighted_similarity={:.2}",
        query_name,
        c.direction(),
        c.weighted_similarity
    );
    for (id, v) in &c.similarity {
        let _ = write!(attrs, ",{}_similarity={:.2}", id, v);
    }
    let _ = write!(attrs, ",original={}", query);

    let tracks: Vec<String> = rendered
        .alignments
        .iter()
        .flat_map(|(id, a)| {
            [
                format!("{}_gene_format={}", id, a.query),
                format!("{}_target_format={}", id, a.target),
                format!("{}_match_format={}", id, a.matches),
            ]
        })
        .collect();

    format!("({})\n>{}/{}-{}\t{},{}\n\n", index, data_name, c.start, c.end, attrs, tracks.join(","))
}

/// All blocks for one query, numbered from 1.
pub fn format_query_report(data_name: &str, query_name: &str, query: &str, results: &[RenderedCandidate]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format_block(i + 1, data_name, query_name, query, r))
        .collect()
}

/// 报告文件是唯一的共享可变资源，每个 query 的结果整体追加一次
pub struct ReportWriter {
    path: PathBuf,
    out: Mutex<BufWriter<File>>,
}

impl ReportWriter {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| SearchError::io(dir, e))?;
        }
        let fh = File::create(&path).map_err(|e| SearchError::io(&path, e))?;
        Ok(Self { path, out: Mutex::new(BufWriter::new(fh)) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, content: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| SearchError::Internal("report writer lock poisoned".into()))?;
        out.write_all(content.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| SearchError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered() -> RenderedCandidate {
        let candidate = MatchCandidate::new(
            10,
            13,
            true,
            100,
            3.5,
            vec![(AlgorithmId::Direct, 3.0), (AlgorithmId::Consistency, 4.0)],
        );
        let mut direct = Alignment::default();
        for (q, t, m) in [(b'a', b'a', b'*'), (b'c', b'g', b'.'), (b'g', b'g', b'*'), (b't', b't', b'*')] {
            direct.push(q, t, m);
        }
        let consistency = Alignment {
            query: "acgt".into(),
            target: "aggt".into(),
            matches: "*-**".into(),
        };
        RenderedCandidate {
            candidate,
            alignments: vec![(AlgorithmId::Direct, direct), (AlgorithmId::Consistency, consistency)],
        }
    }

    #[test]
    fn block_layout_matches_downstream_parser() {
        let block = format_block(1, "NC_000913.3", "probe1", "acgt", &rendered());
        assert_eq!(
            block,
            "(1)\n>NC_000913.3/90-87\tname=probe1,direction=-,weighted_similarity=3.50,\
direct_similarity=3.00,consistency_similarity=4.00,original=acgt,\
direct_gene_format=acgt,direct_target_format=aggt,direct_match_format=*.**,\
consistency_gene_format=acgt,consistency_target_format=aggt,consistency_match_format=*-**\n\n"
        );
    }

    #[test]
    fn query_report_numbers_blocks() {
        let r = rendered();
        let text = format_query_report("g", "p", "acgt", &[r.clone(), r]);
        assert!(text.starts_with("(1)\n>g/90-87\t"));
        assert!(text.contains("\n\n(2)\n>g/90-87\t"));
    }

    #[test]
    fn result_path_uses_query_file_stem() {
        let p = result_path(Path::new("/tmp/out"), Path::new("/data/probes.tsv"));
        assert_eq!(p, PathBuf::from("/tmp/out/probes_match_result.txt"));
    }

    #[test]
    fn writer_appends_and_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::create(dir.path().join("nested").join("r.txt")).unwrap();
        writer.append("(1)\n").unwrap();
        writer.append("(2)\n").unwrap();
        assert_eq!(std::fs::read_to_string(writer.path()).unwrap(), "(1)\n(2)\n");
    }
}
