use serde::{Deserialize, Serialize};

/// 归一化为小写碱基，`u` 视为 `t`，其余字符映射为 `n`
pub fn normalize_seq(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq {
        let low = b.to_ascii_lowercase();
        let nb = match low {
            b'a' | b'c' | b'g' | b't' | b'n' => low,
            b'u' => b't',
            _ => b'n',
        };
        out.push(nb);
    }
    out
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_lowercase() {
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' | b'u' => b'a',
        _ => b'n',
    }
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq.iter().rev() {
        out.push(complement(b));
    }
    out
}

/// 碱基等价规则：`(query_base, target_base)` 对在打分时不计为错配。
///
/// The default treats a cytosine/thymine pairing as a match. This is a
/// scoring convention carried over from the probe-design workflow, so it is
/// data rather than a hard-coded rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchPolicy {
    pub equivalences: Vec<(char, char)>,
}

impl Default for MismatchPolicy {
    fn default() -> Self {
        Self { equivalences: vec![('c', 't')] }
    }
}

impl MismatchPolicy {
    /// Identity only, no extra equivalences.
    pub fn strict() -> Self {
        Self { equivalences: Vec::new() }
    }

    /// 0 when the pair counts as a match, 1 otherwise.
    #[inline]
    pub fn should_change(&self, a: u8, b: u8) -> i32 {
        if a == b {
            return 0;
        }
        for &(x, y) in &self.equivalences {
            let (x, y) = (x as u8, y as u8);
            if (a == x && b == y) || (a == y && b == x) {
                return 0;
            }
        }
        1
    }

    #[inline]
    pub fn is_match(&self, a: u8, b: u8) -> bool {
        self.should_change(a, b) == 0
    }

    /// Target bases a query base may be read as, itself first.
    pub fn widen(&self, query_base: u8) -> Vec<u8> {
        let mut out = vec![query_base];
        for &(x, y) in &self.equivalences {
            if x as u8 == query_base && !out.contains(&(y as u8)) {
                out.push(y as u8);
            }
        }
        out
    }
}
