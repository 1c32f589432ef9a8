use super::{ctg_offset, parse_pos};
use crate::error::{RenderError, Result};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Square percent-identity matrix over equal-size windows starting at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityMatrix {
    pub start: u64,
    pub window: u64,
    n: usize,
    values: Vec<f64>,
}

impl IdentityMatrix {
    /// All cells start out missing (`NaN`).
    pub fn new(start: u64, window: u64, n: usize) -> Self {
        IdentityMatrix {
            start,
            window,
            n,
            values: vec![f64::NAN; n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.n || j >= self.n {
            return None;
        }
        let v = self.values[i * self.n + j];
        (!v.is_nan()).then_some(v)
    }

    /// Set both `(i, j)` and `(j, i)`.
    pub fn set(&mut self, i: usize, j: usize, ident: f64) {
        if i < self.n && j < self.n {
            self.values[i * self.n + j] = ident;
            self.values[j * self.n + i] = ident;
        }
    }

    /// Genomic start of window `i`.
    pub fn window_start(&self, i: usize) -> u64 {
        self.start + i as u64 * self.window
    }

    pub fn extent(&self) -> Option<(u64, u64)> {
        (self.n > 0).then(|| (self.start, self.window_start(self.n)))
    }
}

struct PairRecord {
    q_st: u64,
    q_end: u64,
    r_st: u64,
    ident: f64,
}

/// Build a matrix from pairwise windows. Each record is
/// `query q_st q_end reference r_st r_end identity`; header lines are skipped.
pub fn parse_self_ident<R: BufRead>(reader: R, path: &Path, chrom: Option<&str>) -> Result<IdentityMatrix> {
    let mut pairs = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 7 {
            return Err(RenderError::parse(
                path,
                line_no,
                format!("expected 7 columns, found {}", parts.len()),
            ));
        }
        // Column names instead of a start position mean a header row.
        if line_no == 1 && parts[1].parse::<u64>().is_err() {
            continue;
        }
        if chrom.is_some_and(|c| parts[0] != c) {
            continue;
        }
        let q_off = ctg_offset(parts[0]);
        let r_off = ctg_offset(parts[3]);
        let ident = parts[6]
            .trim()
            .parse::<f64>()
            .map_err(|_| RenderError::parse(path, line_no, format!("invalid identity {:?}", parts[6])))?;
        pairs.push(PairRecord {
            q_st: parse_pos(parts[1], q_off, path, line_no, "query start")?,
            q_end: parse_pos(parts[2], q_off, path, line_no, "query end")?,
            r_st: parse_pos(parts[4], r_off, path, line_no, "reference start")?,
            ident,
        });
    }

    let Some(start) = pairs.iter().map(|p| p.q_st.min(p.r_st)).min() else {
        return Ok(IdentityMatrix::new(0, 0, 0));
    };
    let window = pairs
        .iter()
        .map(|p| p.q_end.saturating_sub(p.q_st))
        .filter(|&w| w > 0)
        .min()
        .ok_or_else(|| RenderError::parse(path, 0, "all windows are empty"))?;

    let idx = |pos: u64| ((pos - start) / window) as usize;
    let n = pairs
        .iter()
        .map(|p| idx(p.q_st).max(idx(p.r_st)) + 1)
        .max()
        .unwrap_or(0);

    let mut matrix = IdentityMatrix::new(start, window, n);
    for p in &pairs {
        matrix.set(idx(p.q_st), idx(p.r_st), p.ident);
    }
    Ok(matrix)
}

pub fn read_self_ident(path: &Path, chrom: Option<&str>) -> Result<IdentityMatrix> {
    let file = File::open(path)?;
    let matrix = parse_self_ident(BufReader::new(file), path, chrom)?;
    debug!("Read {}x{} identity matrix from {:?}", matrix.len(), matrix.len(), path);
    Ok(matrix)
}
