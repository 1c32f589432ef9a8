//! BED-family readers.
//!
//! All readers share the BED9 line format (`chrom start end name score strand
//! thickStart thickEnd itemRgb`, tab separated, no header). Only the first
//! three columns are required.

mod hor;
mod ident;
mod label;

pub use hor::{prepare_hor, read_bed_hor};
pub use ident::{read_self_ident, IdentityMatrix};
pub use label::{category_order, read_bed_label};

use crate::color::Rgba;
use crate::error::{RenderError, Result};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl Strand {
    fn parse(s: &str) -> Strand {
        match s {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BedRecord {
    pub chrom: String,
    pub chrom_st: u64,
    pub chrom_end: u64,
    pub name: String,
    pub score: Option<f64>,
    pub strand: Strand,
    pub thick_st: u64,
    pub thick_end: u64,
    pub item_rgb: Rgba,
    /// Monomers per HOR unit, set by the HOR reader.
    pub mer: Option<u8>,
    /// Occurrences of this record's name, set by the HOR reader.
    pub hor_count: Option<usize>,
    /// Display color resolved by a reader.
    pub color: Option<Rgba>,
}

impl BedRecord {
    pub fn new<C: Into<String>, N: Into<String>>(chrom: C, chrom_st: u64, chrom_end: u64, name: N) -> Self {
        BedRecord {
            chrom: chrom.into(),
            chrom_st,
            chrom_end,
            name: name.into(),
            score: None,
            strand: Strand::Unknown,
            thick_st: chrom_st,
            thick_end: chrom_end,
            item_rgb: Rgba::BLACK,
            mer: None,
            hor_count: None,
            color: None,
        }
    }

    pub fn length(&self) -> u64 {
        self.chrom_end.saturating_sub(self.chrom_st)
    }

    /// The `name` column read as a number, for value and bar tracks.
    pub fn value(&self) -> Option<f64> {
        self.name.trim().parse::<f64>().ok()
    }
}

/// Start offset encoded in a contig name like `chr1:1000-2000`.
pub fn ctg_offset(chrom: &str) -> u64 {
    chrom
        .rsplit_once(':')
        .and_then(|(_, range)| range.split_once('-'))
        .and_then(|(st, end)| {
            let st = st.parse::<u64>().ok()?;
            end.parse::<u64>().ok()?;
            Some(st)
        })
        .unwrap_or(0)
}

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

/// Parse a coordinate and shift it by the contig offset.
pub(crate) fn parse_pos(field: &str, offset: u64, path: &Path, line_no: usize, what: &str) -> Result<u64> {
    let pos = field
        .trim()
        .parse::<u64>()
        .map_err(|_| RenderError::parse(path, line_no, format!("invalid {what} {field:?}")))?;
    pos.checked_add(offset)
        .ok_or_else(|| RenderError::parse(path, line_no, format!("{what} {pos} + offset {offset} overflows")))
}

fn parse_line(line: &str, path: &Path, line_no: usize) -> Result<BedRecord> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 3 {
        return Err(RenderError::parse(
            path,
            line_no,
            format!("expected at least 3 columns, found {}", parts.len()),
        ));
    }
    let offset = ctg_offset(parts[0]);
    let st = parse_pos(parts[1], offset, path, line_no, "start")?;
    let end = parse_pos(parts[2], offset, path, line_no, "end")?;
    if end < st {
        return Err(RenderError::parse(path, line_no, format!("end {end} before start {st}")));
    }

    let mut rec = BedRecord::new(parts[0], st, end, parts.get(3).copied().unwrap_or("-"));
    rec.score = parts.get(4).and_then(|s| s.trim().parse::<f64>().ok());
    rec.strand = parts.get(5).map(|s| Strand::parse(s.trim())).unwrap_or_default();
    if let Some(ts) = parts.get(6) {
        rec.thick_st = parse_pos(ts, offset, path, line_no, "thickStart")?;
    }
    if let Some(te) = parts.get(7) {
        rec.thick_end = parse_pos(te, offset, path, line_no, "thickEnd")?;
    }
    rec.item_rgb = parts
        .get(8)
        .and_then(|rgb| Rgba::parse(rgb))
        .unwrap_or(Rgba::BLACK);
    Ok(rec)
}

/// Parse BED9 lines from any reader. `path` is only used in error messages.
pub fn parse_bed9<R: BufRead>(reader: R, path: &Path, chrom: Option<&str>) -> Result<Vec<BedRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if is_comment(line) {
            continue;
        }
        let rec = parse_line(line, path, i + 1)?;
        if chrom.map_or(true, |c| rec.chrom == c) {
            records.push(rec);
        }
    }
    records.sort_by_key(|r| r.chrom_st);
    Ok(records)
}

pub fn read_bed9(path: &Path, chrom: Option<&str>) -> Result<Vec<BedRecord>> {
    let file = File::open(path)?;
    let records = parse_bed9(BufReader::new(file), path, chrom)?;
    debug!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

/// Distinct chromosome names in order of first appearance.
pub fn chroms(records: &[BedRecord]) -> Vec<String> {
    let mut seen = rustc_hash::FxHashSet::default();
    records
        .iter()
        .filter(|r| seen.insert(r.chrom.as_str()))
        .map(|r| r.chrom.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(src: &str, chrom: Option<&str>) -> Result<Vec<BedRecord>> {
        parse_bed9(Cursor::new(src), Path::new("test.bed"), chrom)
    }

    #[test]
    fn missing_columns_get_defaults() {
        let recs = parse("chr1\t200\t300\nchr1\t0\t100\tS1C1H1L\t0\t-\t0\t100\t255,0,0\n", None).unwrap();
        assert_eq!(recs.len(), 2);
        // Sorted by start.
        assert_eq!(recs[0].name, "S1C1H1L");
        assert_eq!(recs[0].strand, Strand::Reverse);
        assert_eq!(recs[0].item_rgb, Rgba::rgb(255, 0, 0));
        assert_eq!(recs[1].name, "-");
        assert_eq!(recs[1].item_rgb, Rgba::BLACK);
        assert_eq!(recs[1].thick_end, 300);
    }

    #[test]
    fn contig_coordinates_shift_positions() {
        assert_eq!(ctg_offset("chr1:1000-2000"), 1000);
        assert_eq!(ctg_offset("chr1"), 0);
        assert_eq!(ctg_offset("HG00096#1#h1tg000001l:abc-10"), 0);

        let recs = parse("chr1:1000-2000\t10\t20\tx\n", None).unwrap();
        assert_eq!((recs[0].chrom_st, recs[0].chrom_end), (1010, 1020));
        assert_eq!(recs[0].chrom, "chr1:1000-2000");
    }

    #[test]
    fn offset_overflow_is_a_parse_error() {
        let src = format!("chr1:{}-{}\t10\t20\tx\n", u64::MAX - 5, u64::MAX);
        let err = parse(&src, None).unwrap_err();
        assert!(matches!(err, RenderError::Parse { line: 1, .. }));
    }

    #[test]
    fn filters_by_chrom_and_skips_headers() {
        let src = "track name=x\n# comment\nchr1\t0\t10\nchr2\t0\t10\nchr1\t5\t10\n";
        let recs = parse(src, Some("chr1")).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(chroms(&parse(src, None).unwrap()), vec!["chr1", "chr2"]);
    }

    #[test]
    fn malformed_lines_report_position() {
        let err = parse("chr1\t0\t10\nchr1\tabc\t10\n", None).unwrap_err();
        match err {
            RenderError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(parse("chr1\t10\n", None).is_err());
        assert!(parse("chr1\t10\t5\n", None).is_err());
    }

    #[test]
    fn numeric_names_are_values() {
        let recs = parse("chr1\t0\t10\t0.75\nchr1\t10\t20\tgene\n", None).unwrap();
        assert_eq!(recs[0].value(), Some(0.75));
        assert_eq!(recs[1].value(), None);
    }
}
