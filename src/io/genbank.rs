use std::io::BufRead;
use std::path::Path;

use crate::error::{Result, SearchError};

/// 读取 GenBank 平面文件的 `ORIGIN` 序列段；注释特征由外部工具处理
pub fn read_genbank<R: BufRead>(reader: R, source: &Path) -> Result<Vec<u8>> {
    let mut seq = Vec::new();
    let mut in_origin = false;

    for line in reader.lines() {
        let line = line.map_err(|e| SearchError::io(source, e))?;
        if in_origin {
            if line.starts_with("//") {
                break;
            }
            // "        61 gcttttcatt ctgactgcaa"
            seq.extend(
                line.bytes()
                    .filter(u8::is_ascii_alphabetic)
                    .map(|b| b.to_ascii_lowercase()),
            );
        } else if line.starts_with("ORIGIN") {
            in_origin = true;
        }
    }

    if !in_origin {
        return Err(SearchError::Parse {
            path: source.to_path_buf(),
            line: 0,
            message: "no ORIGIN section found".into(),
        });
    }
    Ok(seq)
}
