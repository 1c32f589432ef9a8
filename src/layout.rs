//! Panel-grid allocation: one row per non-overlapping track, plus an optional legend column.

use crate::error::{RenderError, Result};
use crate::surface::Surface;
use crate::track::{LegendPosition, Track, TrackPosition};
use log::debug;
use rustc_hash::FxHashMap;

/// Row-major grid of drawing surfaces.
#[derive(Debug, Clone)]
pub struct Grid {
    nrows: usize,
    ncols: usize,
    cells: Vec<Surface>,
    /// Row of each input track, by input index.
    track_rows: Vec<usize>,
    name_rows: FxHashMap<String, usize>,
    legend_pos: LegendPosition,
}

impl Grid {
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn legend_pos(&self) -> LegendPosition {
        self.legend_pos
    }

    /// Column holding track panels. Fixed for the whole figure.
    pub fn track_col(&self) -> usize {
        match self.legend_pos {
            LegendPosition::Left => 1,
            LegendPosition::Right | LegendPosition::None => 0,
        }
    }

    /// Column holding legend panels, if the figure has one.
    pub fn legend_col(&self) -> Option<usize> {
        match self.legend_pos {
            LegendPosition::Left => Some(0),
            LegendPosition::Right => Some(1),
            LegendPosition::None => None,
        }
    }

    /// Row a track name maps to. With repeated names the last track wins.
    pub fn row_of(&self, name: &str) -> Option<usize> {
        self.name_rows.get(name).copied()
    }

    /// Row of the `index`-th track of the allocated list.
    pub fn row_for_track(&self, index: usize) -> Option<usize> {
        self.track_rows.get(index).copied()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Surface> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.cells.get(row * self.ncols + col)
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Surface> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.cells.get_mut(row * self.ncols + col)
    }

    /// The track surface and, when present, the legend surface of `row`.
    pub fn row_mut(&mut self, row: usize) -> Option<(&mut Surface, Option<&mut Surface>)> {
        if row >= self.nrows {
            return None;
        }
        let track_col = self.track_col();
        let cells = &mut self.cells[row * self.ncols..(row + 1) * self.ncols];
        match cells {
            [only] => Some((only, None)),
            [first, second] => {
                if track_col == 0 {
                    Some((first, Some(second)))
                } else {
                    Some((second, Some(first)))
                }
            }
            _ => None,
        }
    }

    pub fn surfaces(&self) -> impl Iterator<Item = (usize, usize, &Surface)> {
        let ncols = self.ncols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, s)| (i / ncols, i % ncols, s))
    }

    pub(crate) fn surfaces_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut Surface)> {
        let ncols = self.ncols;
        self.cells
            .iter_mut()
            .enumerate()
            .map(move |(i, s)| (i / ncols, i % ncols, s))
    }
}

/// Assign rows to tracks and build the surface grid.
///
/// Normal tracks take the next row; Overlap tracks reuse the row of the
/// track before them. An Overlap track with nothing before it is an error.
pub fn allocate(tracks: &[Track], legend_pos: LegendPosition) -> Result<Grid> {
    let mut track_rows = Vec::with_capacity(tracks.len());
    let mut name_rows = FxHashMap::default();
    let mut nrows = 0usize;

    for track in tracks {
        let row = match track.position {
            TrackPosition::Normal => {
                nrows += 1;
                nrows - 1
            }
            TrackPosition::Overlap => match track_rows.last() {
                Some(&prev) => prev,
                None => {
                    return Err(RenderError::config(format!(
                        "track {:?} overlaps nothing: the first track cannot have Overlap position",
                        track.name
                    )))
                }
            },
        };
        track_rows.push(row);
        name_rows.insert(track.name.clone(), row);
    }

    let ncols = if legend_pos == LegendPosition::None { 1 } else { 2 };
    debug!("Allocated {} rows x {} columns for {} tracks", nrows, ncols, tracks.len());

    Ok(Grid {
        nrows,
        ncols,
        cells: vec![Surface::new(); nrows * ncols],
        track_rows,
        name_rows,
        legend_pos,
    })
}
