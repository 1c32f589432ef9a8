use super::{draw_uniq_entry_legend, format_ax, intervals};
use crate::bed::{BedRecord, Strand};
use crate::color::{monomer_color, Rgba};
use crate::error::Result;
use crate::surface::{Spine, Surface};
use crate::track::{HorOptions, HorOrtOptions, Track};

fn hor_color(rec: &BedRecord) -> Rgba {
    rec.color
        .unwrap_or_else(|| rec.mer.map(monomer_color).unwrap_or(rec.item_rgb))
}

/// One full-height block per HOR, colored by monomer count.
pub fn draw_hor(
    surface: &mut Surface,
    track: &Track,
    zorder: usize,
    legend: Option<&mut Surface>,
    _opts: &HorOptions,
) -> Result<()> {
    let table = intervals(track)?;
    format_ax(surface, &track.options, true, &[Spine::Left, Spine::Right, Spine::Top]);

    let z = zorder as f64;
    for rec in &table.records {
        surface.add_rect(rec.chrom_st as f64, rec.chrom_end as f64, 0.0, 1.0, hor_color(rec), z);
    }
    surface.set_ylim(0.0, 1.0);

    if let Some(legend) = legend {
        let mut mers: Vec<(u8, Rgba)> = Vec::new();
        for rec in &table.records {
            let mer = rec.mer.unwrap_or(1);
            if !mers.iter().any(|(m, _)| *m == mer) {
                mers.push((mer, hor_color(rec)));
            }
        }
        mers.sort_by_key(|(m, _)| *m);
        let entries: Vec<(String, Rgba)> = mers.into_iter().map(|(m, c)| (format!("{m}-mer"), c)).collect();
        draw_uniq_entry_legend(legend, &entries, 4, z);
    }
    Ok(())
}

/// A run of adjacent HORs sharing a strand.
#[derive(Debug, Clone, PartialEq)]
struct StrandRun {
    st: u64,
    end: u64,
    strand: Strand,
}

fn strand_runs(records: &[BedRecord]) -> Vec<StrandRun> {
    let mut sorted: Vec<&BedRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.chrom_st);

    let mut runs: Vec<StrandRun> = Vec::new();
    for rec in sorted {
        let strand = match rec.strand {
            Strand::Reverse => Strand::Reverse,
            _ => Strand::Forward,
        };
        match runs.last_mut() {
            Some(run) if run.strand == strand => run.end = run.end.max(rec.chrom_end),
            _ => runs.push(StrandRun {
                st: rec.chrom_st,
                end: rec.chrom_end,
                strand,
            }),
        }
    }
    runs
}

/// Arrow polygon between `st` and `end` with its head at the strand's 3' end.
fn arrow(st: f64, end: f64, head: f64, reverse: bool) -> Vec<(f64, f64)> {
    let (body_lo, body_hi, head_lo, head_hi) = (0.35, 0.65, 0.1, 0.9);
    if reverse {
        let neck = st + head;
        vec![
            (end, body_lo),
            (neck, body_lo),
            (neck, head_lo),
            (st, 0.5),
            (neck, head_hi),
            (neck, body_hi),
            (end, body_hi),
        ]
    } else {
        let neck = end - head;
        vec![
            (st, body_lo),
            (neck, body_lo),
            (neck, head_lo),
            (end, 0.5),
            (neck, head_hi),
            (neck, body_hi),
            (st, body_hi),
        ]
    }
}

/// HOR orientation: one arrow per same-strand run.
///
/// Arrow heads are `scale` thousandths of the shown range long, never more
/// than half the run.
pub fn draw_hor_ort(
    surface: &mut Surface,
    track: &Track,
    zorder: usize,
    _legend: Option<&mut Surface>,
    opts: &HorOrtOptions,
) -> Result<()> {
    let table = intervals(track)?;
    format_ax(surface, &track.options, true, &[Spine::Left, Spine::Right, Spine::Top]);

    let (x0, x1) = surface.xlim();
    let head_len = (x1 - x0).abs() * opts.scale / 1000.0;
    let z = zorder as f64;
    for run in strand_runs(&table.records) {
        let (st, end) = (run.st as f64, run.end as f64);
        let head = head_len.min((end - st) / 2.0);
        let reverse = run.strand == Strand::Reverse;
        let color = if reverse { opts.rev_color } else { opts.fwd_color };
        surface.add_polygon(arrow(st, end, head, reverse), color, z);
    }
    surface.set_ylim(0.0, 1.0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Shape;
    use crate::track::{IntervalTable, TrackData, TrackPosition, TrackVariant};

    fn stranded(st: u64, end: u64, strand: Strand) -> BedRecord {
        let mut r = BedRecord::new("chr1", st, end, "S1C1H1L");
        r.strand = strand;
        r
    }

    #[test]
    fn adjacent_same_strand_hors_merge() {
        let recs = vec![
            stranded(200, 300, Strand::Reverse),
            stranded(0, 100, Strand::Forward),
            stranded(100, 200, Strand::Forward),
            stranded(300, 400, Strand::Reverse),
            stranded(400, 500, Strand::Unknown),
        ];
        let runs = strand_runs(&recs);
        assert_eq!(
            runs,
            vec![
                StrandRun { st: 0, end: 200, strand: Strand::Forward },
                StrandRun { st: 200, end: 400, strand: Strand::Reverse },
                StrandRun { st: 400, end: 500, strand: Strand::Forward },
            ]
        );
    }

    #[test]
    fn arrows_point_along_strand() {
        let fwd = arrow(0.0, 100.0, 10.0, false);
        assert_eq!(fwd[3], (100.0, 0.5));
        let rev = arrow(0.0, 100.0, 10.0, true);
        assert_eq!(rev[3], (0.0, 0.5));
    }

    #[test]
    fn ort_uses_strand_colors() {
        let opts = HorOrtOptions::default();
        let table = IntervalTable::new(vec![stranded(0, 100, Strand::Forward), stranded(100, 200, Strand::Reverse)]);
        let track = Track::new(
            "ort",
            TrackPosition::Normal,
            TrackVariant::HorOrt(opts.clone()),
            TrackData::Intervals(table),
        );
        let mut s = Surface::new();
        s.set_xlim(0.0, 200.0);
        draw_hor_ort(&mut s, &track, 1, None, &opts).unwrap();
        let fills: Vec<Rgba> = s
            .items()
            .iter()
            .filter_map(|i| match &i.shape {
                Shape::Polygon { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![opts.fwd_color, opts.rev_color]);
        assert_eq!(s.xlim(), (0.0, 200.0));
    }

    #[test]
    fn hor_legend_lists_mers_in_order() {
        let mut a = BedRecord::new("chr1", 0, 100, "aL");
        a.mer = Some(12);
        let mut b = BedRecord::new("chr1", 100, 200, "bL");
        b.mer = Some(2);
        let track = Track::new(
            "hor",
            TrackPosition::Normal,
            TrackVariant::Hor(HorOptions::default()),
            TrackData::Intervals(IntervalTable::new(vec![a, b])),
        );
        let mut s = Surface::new();
        let mut legend = Surface::new();
        draw_hor(&mut s, &track, 0, Some(&mut legend), &HorOptions::default()).unwrap();
        let labels: Vec<&str> = legend
            .items()
            .iter()
            .filter_map(|i| match &i.shape {
                Shape::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["2-mer", "12-mer"]);
        assert!(!s.style.yticks && !s.style.spines.left);
    }
}
