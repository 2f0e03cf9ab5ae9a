use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Result, SearchError};
use crate::util::dna;

/// 待搜索的探针，`extra` 保留表中其余列
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub name: String,
    pub sequence: Vec<u8>,
    pub extra: Vec<(String, String)>,
}

impl Query {
    pub fn new(name: impl Into<String>, sequence: &[u8]) -> Self {
        Self { name: name.into(), sequence: dna::normalize_seq(sequence), extra: Vec::new() }
    }

    pub fn sequence_str(&self) -> &str {
        std::str::from_utf8(&self.sequence).unwrap_or_default()
    }
}

pub fn read_query_table(path: impl AsRef<Path>) -> Result<Vec<Query>> {
    let path = path.as_ref();
    let fh = File::open(path).map_err(|e| SearchError::io(path, e))?;
    parse_query_table(fh, path)
}

/// Tab-separated with a header row. `name` and `gene` (or `sequence`) are
/// required; blank lines and rows starting with `#` are skipped.
pub fn parse_query_table<R: Read>(reader: R, source: &Path) -> Result<Vec<Query>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let parse_err = |line: usize, message: String| SearchError::Parse { path: source.to_path_buf(), line, message };

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| parse_err(1, e.to_string()))?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    let column = |keys: &[&str]| headers.iter().position(|h| keys.contains(&h.as_str()));
    let name_col = column(&["name"]).ok_or_else(|| parse_err(1, "missing 'name' column".into()))?;
    let seq_col =
        column(&["gene", "sequence"]).ok_or_else(|| parse_err(1, "missing 'gene' column".into()))?;

    let mut queries = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line() as usize);
            parse_err(line, e.to_string())
        })?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let name = record.get(name_col).unwrap_or_default();
        let seq = record.get(seq_col).unwrap_or_default();
        if name.is_empty() && seq.is_empty() {
            continue;
        }
        if name.is_empty() {
            return Err(parse_err(line, "query without a name".into()));
        }
        if seq.is_empty() {
            return Err(parse_err(line, format!("query '{}' has an empty sequence", name)));
        }

        let mut query = Query::new(name, seq.as_bytes());
        query.extra = headers
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != name_col && i != seq_col)
            .filter_map(|(i, h)| record.get(i).map(|v| (h.clone(), v.to_string())))
            .collect();
        queries.push(query);
    }
    Ok(queries)
}

/// Keeps only the queries whose name is listed, preserving table order.
pub fn retain_named(queries: &mut Vec<Query>, names: &[String]) {
    queries.retain(|q| names.iter().any(|n| n == &q.name));
}
