//! One chromosome's figure: dispatch tracks into the grid, finish the legend
//! column and write the image.

use crate::config::PlotSettings;
use crate::draw::{draw_bars, draw_hor, draw_hor_ort, draw_label, draw_self_ident, draw_values};
use crate::error::Result;
use crate::figure::Figure;
use crate::layout::{allocate, Grid};
use crate::surface::{Spine, ALL_SPINES};
use crate::track::{Track, TrackKind, TrackPosition, TrackVariant};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Row label as displayed: non-ASCII characters are dropped, then
/// backslash escapes are decoded (`\n`, `\t`, `\r`, `\\`, `\'`, `\"`,
/// `\xNN`, `\uNNNN`, `\UNNNNNNNN`). Malformed escapes are kept verbatim.
pub fn display_label(name: &str) -> String {
    let chars: Vec<char> = name.chars().filter(char::is_ascii).collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' || i == chars.len() {
            out.push(c);
            continue;
        }
        let simple = match chars[i] {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            _ => None,
        };
        if let Some(decoded) = simple {
            out.push(decoded);
            i += 1;
            continue;
        }
        let digits = match chars[i] {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => 0,
        };
        let hex: Option<String> = chars.get(i + 1..i + 1 + digits).map(|d| d.iter().collect());
        match hex
            .filter(|_| digits > 0)
            .and_then(|h| u32::from_str_radix(&h, 16).ok())
            .and_then(char::from_u32)
        {
            Some(decoded) => {
                out.push(decoded);
                i += 1 + digits;
            }
            None => out.push('\\'),
        }
    }
    out
}

fn escape_label(label: &str) -> String {
    label.escape_default().to_string()
}

/// What happened to one track during dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Drawn {
        row: usize,
        col: usize,
        zorder: usize,
        /// Label shown on the row, if titling is on.
        label: Option<String>,
    },
    /// The track's cell is not in the grid; nothing was drawn.
    Skipped { row: Option<usize>, col: usize, label: String },
}

/// How a row's legend surface is finished after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendFinish {
    /// Only the top and right spines go; a colorbar keeps its frame.
    Colorbar,
    /// Grid, ticks and all four spines go.
    Strip,
}

impl LegendFinish {
    fn for_track(track: &Track, has_legend: bool) -> LegendFinish {
        match (track.kind(), has_legend) {
            (TrackKind::SelfIdent, true) => LegendFinish::Colorbar,
            _ => LegendFinish::Strip,
        }
    }

    /// Stripping is cumulative over the tracks of a row.
    fn merge(self, other: LegendFinish) -> LegendFinish {
        if self == LegendFinish::Strip || other == LegendFinish::Strip {
            LegendFinish::Strip
        } else {
            LegendFinish::Colorbar
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<DispatchOutcome>,
    row_finish: Vec<Option<LegendFinish>>,
}

impl DispatchReport {
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DispatchOutcome::Skipped { .. }))
            .count()
    }

    /// Legend finish for `row`. Rows nothing was drawn into are stripped.
    pub fn legend_finish(&self, row: usize) -> LegendFinish {
        self.row_finish
            .get(row)
            .copied()
            .flatten()
            .unwrap_or(LegendFinish::Strip)
    }
}

/// Draw every track into its row, in input order. The input index is the
/// track's z-order, so later tracks layer above earlier ones.
///
/// A track whose cell is missing from the grid is skipped with a warning.
/// Errors from the draw routines abort the whole dispatch.
pub fn dispatch(grid: &mut Grid, tracks: &[Track], chrom: &str, range: (u64, u64)) -> Result<DispatchReport> {
    let (min_st, max_end) = range;
    let col = grid.track_col();
    let mut report = DispatchReport {
        outcomes: Vec::with_capacity(tracks.len()),
        row_finish: vec![None; grid.nrows()],
    };
    let mut labels: Vec<String> = Vec::with_capacity(tracks.len());

    for (zorder, track) in tracks.iter().enumerate() {
        let name = display_label(&track.name);
        let row = grid.row_for_track(zorder);
        let Some((surface, legend)) = row.and_then(|r| grid.row_mut(r)) else {
            warn!(
                "Cannot get track ({}, {}) for {} with {} position.",
                row.map_or_else(|| "?".to_string(), |r| r.to_string()),
                col,
                escape_label(&name),
                track.position
            );
            report.outcomes.push(DispatchOutcome::Skipped { row, col, label: name });
            continue;
        };
        let row = row.unwrap_or_default();

        surface.set_xlim(min_st as f64, max_end as f64);
        let legend = if track.options.legend { legend } else { None };
        let has_legend = legend.is_some();

        debug!("Drawing {} ({:?}) into ({}, {}) at z {}", escape_label(&name), track.kind(), row, col, zorder);
        match &track.variant {
            TrackVariant::Bar(opts) => draw_bars(surface, track, zorder, legend, opts)?,
            TrackVariant::Hor(opts) => draw_hor(surface, track, zorder, legend, opts)?,
            TrackVariant::HorOrt(opts) => draw_hor_ort(surface, track, zorder, legend, opts)?,
            TrackVariant::Label(opts) => draw_label(surface, track, zorder, legend, opts)?,
            TrackVariant::SelfIdent(opts) => draw_self_ident(surface, track, zorder, legend, opts)?,
            TrackVariant::Value(opts) => draw_values(surface, track, zorder, legend, opts)?,
        }

        let label = match (track.position, labels.last()) {
            (TrackPosition::Overlap, Some(prev)) => format!("{prev}\n{name}"),
            _ => name,
        };
        labels.push(label.clone());

        let shown = if track.options.chrom_as_title { chrom.to_string() } else { label };
        // An untitled track leaves whatever label the row already has.
        let shown = track.options.title.then(|| {
            surface.set_ylabel(shown.clone());
            shown
        });

        if let Some(slot) = report.row_finish.get_mut(row) {
            let finish = LegendFinish::for_track(track, has_legend);
            *slot = Some(slot.map_or(finish, |prev| prev.merge(finish)));
        }
        report.outcomes.push(DispatchOutcome::Drawn {
            row,
            col,
            zorder,
            label: shown,
        });
    }
    Ok(report)
}

/// Strip axis chrome from the legend column. A row whose only legend
/// users are self-identity tracks keeps the bottom and left spines around
/// its colorbar.
pub fn finalize_legends(grid: &mut Grid, report: &DispatchReport) {
    let Some(legend_col) = grid.legend_col() else {
        return;
    };
    for row in 0..grid.nrows() {
        let Some(legend) = grid.get_mut(row, legend_col) else {
            continue;
        };
        match report.legend_finish(row) {
            LegendFinish::Colorbar => legend.minimalize(true, false, false, &[Spine::Right, Spine::Top]),
            LegendFinish::Strip => legend.minimalize(true, true, true, &ALL_SPINES),
        }
    }
}

/// A written figure and where it went.
#[derive(Debug)]
pub struct Rendered {
    pub figure: Figure,
    pub path: PathBuf,
}

impl Rendered {
    pub fn grid(&self) -> &Grid {
        self.figure.grid()
    }
}

/// Lay out the populated figure and write it to `path`.
pub fn compose(mut figure: Figure, path: &Path) -> Result<Rendered> {
    figure.layout();
    figure.save(path)?;
    Ok(Rendered {
        figure,
        path: path.to_path_buf(),
    })
}

/// Render one chromosome to `{outdir}/{chrom}.{ext}`.
pub fn plot_one_cen(
    tracks: &[Track],
    outdir: &Path,
    chrom: &str,
    settings: &PlotSettings,
    range: (u64, u64),
) -> Result<Rendered> {
    info!("Plotting {}...", chrom);
    let mut grid = allocate(tracks, settings.legend_pos)?;
    let report = dispatch(&mut grid, tracks, chrom, range)?;
    if report.skipped() > 0 {
        debug!("{} of {} tracks skipped for {}", report.skipped(), tracks.len(), chrom);
    }
    finalize_legends(&mut grid, &report);

    let path = outdir.join(format!("{}.{}", chrom, settings.format.extension()));
    compose(Figure::new(grid, settings), &path)
}
