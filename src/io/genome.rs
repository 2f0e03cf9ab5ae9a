use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

use super::fasta::FastaReader;
use super::genbank::read_genbank;
use crate::error::{Result, SearchError};
use crate::util::dna;

/// 正链与反向互补链，构造后只读，由所有扫描任务共享
#[derive(Debug, Clone)]
pub struct Genome {
    pub name: String,
    forward: Vec<u8>,
    reverse: Vec<u8>,
}

impl Genome {
    pub fn from_sequence(name: impl Into<String>, seq: &[u8]) -> Self {
        let forward = dna::normalize_seq(seq);
        let reverse = dna::revcomp(&forward);
        Self { name: name.into(), forward, reverse }
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn forward(&self) -> &[u8] {
        &self.forward
    }

    pub fn reverse(&self) -> &[u8] {
        &self.reverse
    }

    pub fn strand(&self, is_reverse: bool) -> &[u8] {
        if is_reverse {
            &self.reverse
        } else {
            &self.forward
        }
    }

    /// Loads a FASTA or GenBank file, picking the format from its first
    /// non-empty line. For FASTA, `record` selects a record by id; the first
    /// one is used otherwise. The genome is named after the file stem.
    pub fn load(path: impl AsRef<Path>, record: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "genome".to_string());
        let fh = File::open(path).map_err(|e| SearchError::io(path, e))?;
        let mut reader = BufReader::new(fh);

        let first = first_content_byte(&mut reader).map_err(|e| SearchError::io(path, e))?;
        let seq = match first {
            Some(b'>') => {
                let mut fasta = FastaReader::new(reader, path);
                let mut found = None;
                while let Some(rec) = fasta.next_record()? {
                    if record.map_or(true, |id| rec.id == id) {
                        found = Some(rec.seq);
                        break;
                    }
                }
                found.ok_or_else(|| SearchError::Parse {
                    path: path.to_path_buf(),
                    line: 0,
                    message: match record {
                        Some(id) => format!("no FASTA record named '{}'", id),
                        None => "FASTA file contains no records".to_string(),
                    },
                })?
            }
            Some(b'L') => read_genbank(reader, path)?,
            _ => {
                return Err(SearchError::Parse {
                    path: path.to_path_buf(),
                    line: 1,
                    message: "expected a FASTA ('>') or GenBank ('LOCUS') file".into(),
                })
            }
        };

        if seq.is_empty() {
            return Err(SearchError::Parse {
                path: path.to_path_buf(),
                line: 0,
                message: "genome sequence is empty".into(),
            });
        }
        let genome = Genome::from_sequence(name, &seq);
        info!("genome {} loaded: {} bp", genome.name, genome.len());
        Ok(genome)
    }
}

/// Skips leading whitespace and peeks the first content byte without consuming it.
fn first_content_byte<R: BufRead>(reader: &mut R) -> std::io::Result<Option<u8>> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => {
                let b = buf[pos];
                reader.consume(pos);
                return Ok(Some(b));
            }
            None => {
                let n = buf.len();
                reader.consume(n);
            }
        }
    }
}
