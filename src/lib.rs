//! Multi-track centromere maps: stacked genomic panels sharing one x axis.
//!
//! Tracks are read from BED-family files, placed on a panel grid (one row per
//! non-overlapping track, plus an optional legend column), drawn by their
//! variant's routine and written as PNG or SVG.

pub mod bed;
pub mod canvas;
pub mod cen;
pub mod color;
pub mod config;
pub mod draw;
pub mod error;
pub mod figure;
pub mod font;
pub mod layout;
pub mod surface;
pub mod track;

pub use cen::{compose, dispatch, display_label, finalize_legends, plot_one_cen, DispatchOutcome, DispatchReport, LegendFinish, Rendered};
pub use config::{shared_range, Config, OutputFormat, PlotSettings, TrackSpec};
pub use error::{RenderError, Result};
pub use figure::Figure;
pub use layout::{allocate, Grid};
pub use track::{CommonOptions, LegendPosition, Track, TrackData, TrackKind, TrackPosition, TrackVariant};
