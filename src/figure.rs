//! Figure layout and output: places the grid's surfaces on the page and writes PNG or SVG.

use crate::canvas::{Canvas, PixelRect, RasterCanvas, SvgCanvas};
use crate::color::Rgba;
use crate::config::{OutputFormat, PlotSettings};
use crate::error::{RenderError, Result};
use crate::font;
use crate::layout::Grid;
use crate::track::LegendPosition;
use log::{debug, info};
use std::path::Path;

const POINTS_PER_INCH: f64 = 72.0;

/// A grid of surfaces plus the page it is drawn on.
#[derive(Debug, Clone)]
pub struct Figure {
    grid: Grid,
    width_px: u32,
    height_px: u32,
    dpi: u32,
    transparent: bool,
    hspace: f64,
    legend_ratio: f64,
}

impl Figure {
    pub fn new(grid: Grid, settings: &PlotSettings) -> Self {
        let (w, h) = settings.dim;
        let dpi = settings.dpi.max(1);
        Figure {
            grid,
            width_px: ((w * dpi as f64).round() as u32).max(1),
            height_px: ((h * dpi as f64).round() as u32).max(1),
            dpi,
            transparent: settings.transparent,
            hspace: settings.axis_h_pad.max(0.0),
            legend_ratio: settings.legend_ratio,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size_px(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    /// Vertical gap between rows, as a fraction of the row height.
    pub fn set_hspace(&mut self, hspace: f64) {
        self.hspace = hspace.max(0.0);
    }

    fn px_per_pt(&self) -> f64 {
        self.dpi as f64 / POINTS_PER_INCH
    }

    /// Pixel size of one glyph at the largest font any surface uses.
    fn char_px(&self) -> f64 {
        let pt = self
            .grid
            .surfaces()
            .map(|(_, _, s)| s.style.fontsize)
            .fold(0.0f64, f64::max);
        font::char_size_for(pt * self.px_per_pt()) as f64
    }

    /// Assign every surface its pixel rect. Row labels get a left gutter
    /// sized to the longest label line.
    pub fn layout(&mut self) {
        let (nrows, ncols) = self.grid.shape();
        if nrows == 0 {
            return;
        }
        let char_px = self.char_px();
        let label_chars = self
            .grid
            .surfaces()
            .filter_map(|(_, _, s)| s.ylabel())
            .flat_map(|l| l.split('\n'))
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);

        let (w, h) = (self.width_px as f64, self.height_px as f64);
        let gutter = (label_chars as f64 + 6.0) * char_px;
        let top = char_px;
        let bottom = char_px * 2.5;
        let right = char_px;

        let usable_w = (w - gutter - right).max(1.0);
        let legend_w = if ncols == 2 { usable_w * self.legend_ratio } else { 0.0 };
        let track_w = (usable_w - legend_w).max(1.0);

        let legend_left = self.grid.legend_pos() == LegendPosition::Left;
        let (track_x, legend_x) = if legend_left {
            (legend_w + gutter, 0.0)
        } else {
            (gutter, gutter + track_w + right)
        };
        let track_w = if legend_left { track_w } else { (track_w - right).max(1.0) };

        let usable_h = (h - top - bottom).max(1.0);
        let n = nrows as f64;
        let row_h = usable_h / (n + self.hspace * (n - 1.0));
        let gap = row_h * self.hspace;

        let track_col = self.grid.track_col();
        for (row, col, surface) in self.grid.surfaces_mut() {
            let y = top + row as f64 * (row_h + gap);
            surface.rect = if col == track_col {
                PixelRect { x: track_x, y, w: track_w, h: row_h }
            } else {
                PixelRect { x: legend_x, y, w: legend_w, h: row_h }
            };
        }
        debug!(
            "Laid out {}x{} grid on {}x{} px (row height {:.1}, gap {:.1})",
            nrows, ncols, self.width_px, self.height_px, row_h, gap
        );
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        let px_per_pt = self.px_per_pt();
        for (_, _, surface) in self.grid.surfaces() {
            surface.render(canvas, px_per_pt);
        }
    }

    fn background(&self) -> Option<Rgba> {
        (!self.transparent).then_some(Rgba::WHITE)
    }

    pub fn render_raster(&self) -> RasterCanvas {
        let mut canvas = RasterCanvas::new(self.width_px, self.height_px, self.background());
        self.draw(&mut canvas);
        canvas
    }

    pub fn render_svg(&self) -> String {
        let mut canvas = SvgCanvas::new(self.width_px as f64, self.height_px as f64, self.background());
        self.draw(&mut canvas);
        canvas.finish()
    }

    /// Write the figure; the format comes from the file extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let format = OutputFormat::from_path(path).ok_or_else(|| RenderError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        info!("Saving to {:?}...", path);
        match format {
            OutputFormat::Svg => std::fs::write(path, self.render_svg())?,
            OutputFormat::Png => {
                let canvas = self.render_raster();
                let (w, h) = (canvas.width(), canvas.height());
                let img = image::RgbaImage::from_raw(w, h, canvas.into_raw()).ok_or_else(|| {
                    RenderError::config(format!("pixel buffer does not match {w}x{h} image"))
                })?;
                img.save_with_format(path, image::ImageFormat::Png)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{IntervalTable, Track, TrackData, TrackKind, TrackPosition, TrackVariant};

    fn figure(legend_pos: LegendPosition, rows: usize) -> Figure {
        let tracks: Vec<Track> = (0..rows)
            .map(|i| {
                Track::new(
                    format!("t{i}"),
                    TrackPosition::Normal,
                    TrackVariant::with_defaults(TrackKind::Label),
                    TrackData::Intervals(IntervalTable::default()),
                )
            })
            .collect();
        let grid = crate::layout::allocate(&tracks, legend_pos).unwrap();
        let settings = PlotSettings {
            dim: (4.0, 2.0),
            dpi: 50,
            ..PlotSettings::default()
        };
        Figure::new(grid, &settings)
    }

    #[test]
    fn size_follows_dim_and_dpi() {
        assert_eq!(figure(LegendPosition::None, 1).size_px(), (200, 100));
    }

    #[test]
    fn rows_are_stacked_with_gaps() {
        let mut fig = figure(LegendPosition::Right, 3);
        fig.set_hspace(0.5);
        fig.layout();
        let r0 = fig.grid().get(0, 0).unwrap().rect();
        let r1 = fig.grid().get(1, 0).unwrap().rect();
        let l0 = fig.grid().get(0, 1).unwrap().rect();
        assert!((r1.y - r0.bottom() - r0.h * 0.5).abs() < 1e-9);
        assert!(l0.x > r0.right());
        assert_eq!(l0.y, r0.y);
    }

    #[test]
    fn left_legend_sits_before_track_column() {
        let mut fig = figure(LegendPosition::Left, 1);
        fig.layout();
        let track = fig.grid().get(0, 1).unwrap().rect();
        let legend = fig.grid().get(0, 0).unwrap().rect();
        assert!(legend.right() <= track.x);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let mut fig = figure(LegendPosition::None, 1);
        fig.layout();
        let err = fig.save(Path::new("out.pdf")).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat { .. }));
    }
}
