use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Result, SearchError};

pub fn read_regions(path: impl AsRef<Path>) -> Result<Vec<(usize, usize)>> {
    let path = path.as_ref();
    let fh = File::open(path).map_err(|e| SearchError::io(path, e))?;
    parse_regions(fh, path)
}

/// 读取 `left<TAB>right`（1-based，闭区间）区域表；
/// 首行若不是数字则视为表头，多余的列忽略
pub fn parse_regions<R: Read>(reader: R, source: &Path) -> Result<Vec<(usize, usize)>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut regions = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| SearchError::Parse {
            path: source.to_path_buf(),
            line: e.position().map_or(0, |p| p.line() as usize),
            message: e.to_string(),
        })?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let left = record.get(0).unwrap_or_default();
        let right = record.get(1).unwrap_or_default();
        match (left.parse::<usize>(), right.parse::<usize>()) {
            (Ok(l), Ok(r)) if l > 0 && r > 0 => regions.push((l, r)),
            _ if i == 0 => continue,
            _ => {
                return Err(SearchError::Parse {
                    path: source.to_path_buf(),
                    line,
                    message: format!("expected two positive coordinates, got '{}' '{}'", left, right),
                })
            }
        }
    }
    Ok(regions)
}
