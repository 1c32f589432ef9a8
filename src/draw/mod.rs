//! Per-variant draw routines and the helpers they share.
//!
//! Every routine owns its panel's primitives, axis cosmetics and optional
//! legend. None of them touches the x range; the dispatcher sets it.

mod bar;
mod hor;
mod label;
mod self_ident;
mod values;

pub use bar::draw_bars;
pub use hor::{draw_hor, draw_hor_ort};
pub use label::draw_label;
pub use self_ident::draw_self_ident;
pub use values::draw_values;

use crate::canvas::HAlign;
use crate::color::Rgba;
use crate::error::{RenderError, Result};
use crate::surface::{Spine, Surface};
use crate::track::{CommonOptions, IntervalTable, Track, TrackData};

pub(crate) fn intervals(track: &Track) -> Result<&IntervalTable> {
    match &track.data {
        TrackData::Intervals(table) => Ok(table),
        TrackData::Identity(_) => Err(RenderError::draw(&track.name, "expected interval records")),
    }
}

/// Apply the shared cosmetics: font size, x tick visibility, hidden y axis and spines.
pub(crate) fn format_ax(surface: &mut Surface, opts: &CommonOptions, hide_y: bool, spines: &[Spine]) {
    if let Some(size) = opts.fontsize {
        surface.style.fontsize = size;
    }
    surface.minimalize(true, opts.hide_x, hide_y, spines);
}

/// Fill a legend surface with one colored square and label per entry,
/// laid out row-major over `ncols` columns.
pub fn draw_uniq_entry_legend(legend: &mut Surface, entries: &[(String, Rgba)], ncols: usize, zorder: f64) {
    legend.set_xlim(0.0, 1.0);
    legend.set_ylim(0.0, 1.0);
    if entries.is_empty() {
        return;
    }
    let ncols = ncols.clamp(1, entries.len());
    let nrows = entries.len().div_ceil(ncols);
    let col_w = 1.0 / ncols as f64;
    let row_h = 1.0 / nrows as f64;
    let swatch = (row_h * 0.6).min(col_w * 0.15);

    for (i, (label, color)) in entries.iter().enumerate() {
        let col = i % ncols;
        let row = i / ncols;
        let x = col as f64 * col_w + col_w * 0.05;
        let y = 1.0 - (row as f64 + 0.5) * row_h;
        legend.add_rect(x, x + swatch, y - swatch / 2.0, y + swatch / 2.0, *color, zorder);
        legend.add_text(x + swatch * 1.5, y, label.clone(), Rgba::BLACK, HAlign::Left, zorder);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::bed::BedRecord;
    use crate::track::{IntervalTable, Track, TrackData, TrackPosition, TrackVariant};

    pub fn interval_track(name: &str, variant: TrackVariant, recs: &[(u64, u64, &str)]) -> Track {
        let records = recs
            .iter()
            .map(|&(st, end, n)| BedRecord::new("chr1", st, end, n))
            .collect();
        Track::new(name, TrackPosition::Normal, variant, TrackData::Intervals(IntervalTable::new(records)))
    }
}
