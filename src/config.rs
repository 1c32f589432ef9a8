//! TOML track configuration.
//!
//! ```toml
//! [settings]
//! format = "png"
//! dim = [16.0, 8.0]
//! legend_pos = "right"
//!
//! [[tracks]]
//! title = "HOR"
//! position = "normal"
//! type = "hor"
//! path = "hor.bed"
//! options = { legend = true, mer_filter = 4 }
//! ```

use crate::bed::{chroms, read_bed9, read_bed_hor, read_bed_label, read_self_ident};
use crate::error::{RenderError, Result};
use crate::track::{CommonOptions, IntervalTable, LegendPosition, Track, TrackData, TrackKind, TrackPosition, TrackVariant};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }

    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Option<OutputFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "svg" => Some(OutputFormat::Svg),
            _ => None,
        }
    }
}

/// Figure-wide settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    pub format: OutputFormat,
    pub transparent: bool,
    /// Figure width and height in inches.
    pub dim: (f64, f64),
    pub dpi: u32,
    pub legend_pos: LegendPosition,
    /// Space between rows as a fraction of the row height.
    pub axis_h_pad: f64,
    /// Width of the legend column as a fraction of the figure width.
    pub legend_ratio: f64,
}

impl Default for PlotSettings {
    fn default() -> Self {
        PlotSettings {
            format: OutputFormat::Png,
            transparent: true,
            dim: (16.0, 8.0),
            dpi: 600,
            legend_pos: LegendPosition::Right,
            axis_h_pad: 0.1,
            legend_ratio: 0.2,
        }
    }
}

impl PlotSettings {
    fn validate(&self) -> Result<()> {
        let (w, h) = self.dim;
        if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
            return Err(RenderError::config(format!("dim must be positive, got {:?}", self.dim)));
        }
        if self.dpi == 0 {
            return Err(RenderError::config("dpi must be positive"));
        }
        if !(0.0..1.0).contains(&self.legend_ratio) {
            return Err(RenderError::config("legend_ratio must be in [0, 1)"));
        }
        if self.axis_h_pad < 0.0 {
            return Err(RenderError::config("axis_h_pad cannot be negative"));
        }
        Ok(())
    }
}

fn default_position() -> TrackPosition {
    TrackPosition::Normal
}

#[derive(Debug, Clone, Deserialize)]
struct RawTrack {
    title: Option<String>,
    #[serde(default = "default_position")]
    position: TrackPosition,
    #[serde(rename = "type")]
    kind: String,
    path: PathBuf,
    #[serde(default)]
    options: toml::Table,
}

#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    #[serde(default)]
    settings: PlotSettings,
    #[serde(default)]
    tracks: Vec<RawTrack>,
}

/// One `[[tracks]]` entry with its options already typed.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSpec {
    pub name: String,
    pub position: TrackPosition,
    pub variant: TrackVariant,
    pub options: CommonOptions,
    pub path: PathBuf,
}

impl TrackSpec {
    /// Read this track's data for one chromosome.
    pub fn load(&self, chrom: &str) -> Result<Track> {
        let chrom = Some(chrom);
        let data = match &self.variant {
            TrackVariant::Hor(opts) => {
                TrackData::Intervals(IntervalTable::new(read_bed_hor(&self.path, chrom, &opts.read)?))
            }
            TrackVariant::HorOrt(opts) => {
                TrackData::Intervals(IntervalTable::new(read_bed_hor(&self.path, chrom, &opts.read)?))
            }
            TrackVariant::Label(_) => TrackData::Intervals(read_bed_label(&self.path, chrom)?),
            TrackVariant::Bar(_) | TrackVariant::Value(_) => {
                TrackData::Intervals(IntervalTable::new(read_bed9(&self.path, chrom)?))
            }
            TrackVariant::SelfIdent(_) => TrackData::Identity(read_self_ident(&self.path, chrom)?),
        };
        Ok(Track {
            name: self.name.clone(),
            position: self.position,
            variant: self.variant.clone(),
            options: self.options.clone(),
            data,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub settings: PlotSettings,
    pub tracks: Vec<TrackSpec>,
}

impl Config {
    /// Parse a config. Relative track paths are resolved against `base_dir`.
    pub fn parse(src: &str, base_dir: &Path) -> Result<Config> {
        let raw: RawConfig = toml::from_str(src)?;
        raw.settings.validate()?;

        let mut tracks = Vec::with_capacity(raw.tracks.len());
        for t in raw.tracks {
            let kind: TrackKind = t.kind.parse()?;
            let variant = TrackVariant::from_table(kind, &t.options)?;
            let options: CommonOptions = toml::Value::Table(t.options.clone()).try_into()?;
            let path = if t.path.is_absolute() {
                t.path
            } else {
                base_dir.join(t.path)
            };
            let name = match t.title {
                Some(title) => title,
                None => path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            };
            tracks.push(TrackSpec {
                name,
                position: t.position,
                variant,
                options,
                path,
            });
        }
        if let Some(first) = tracks.first() {
            if first.position == TrackPosition::Overlap {
                return Err(RenderError::config(format!(
                    "first track {:?} cannot have Overlap position",
                    first.name
                )));
            }
        }
        debug!("Parsed {} track definitions", tracks.len());
        Ok(Config {
            settings: raw.settings,
            tracks,
        })
    }

    pub fn from_path(path: &Path) -> Result<Config> {
        let src = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Config::parse(&src, base)
    }

    /// Every chromosome found in the interval tracks, in first-seen order.
    pub fn chroms(&self) -> Result<Vec<String>> {
        let mut all: Vec<String> = Vec::new();
        for spec in &self.tracks {
            if matches!(spec.variant, TrackVariant::SelfIdent(_)) {
                continue;
            }
            for chrom in chroms(&read_bed9(&spec.path, None)?) {
                if !all.contains(&chrom) {
                    all.push(chrom);
                }
            }
        }
        Ok(all)
    }

    pub fn load_tracks(&self, chrom: &str) -> Result<Vec<Track>> {
        self.tracks.iter().map(|spec| spec.load(chrom)).collect()
    }
}

/// Smallest start and largest end over all tracks with data.
pub fn shared_range(tracks: &[Track]) -> Option<(u64, u64)> {
    tracks
        .iter()
        .filter_map(Track::extent)
        .reduce(|(st, end), (s, e)| (st.min(s), end.max(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[settings]
format = "svg"
dim = [10.0, 4.0]
legend_pos = "left"

[[tracks]]
title = "HOR"
type = "hor"
path = "hor.bed"
options = { legend = true, mer_filter = 4, unknown_key = 1 }

[[tracks]]
position = "overlap"
type = "hor_ort"
path = "/data/ort.bed"
options = { title = false, scale = 20 }
"#;

    #[test]
    fn parses_settings_and_typed_track_options() {
        let cfg = Config::parse(CONFIG, Path::new("/cfg")).unwrap();
        assert_eq!(cfg.settings.format, OutputFormat::Svg);
        assert_eq!(cfg.settings.dim, (10.0, 4.0));
        assert_eq!(cfg.settings.legend_pos, LegendPosition::Left);
        assert_eq!(cfg.settings.dpi, 600);

        assert_eq!(cfg.tracks.len(), 2);
        let hor = &cfg.tracks[0];
        assert_eq!(hor.name, "HOR");
        assert_eq!(hor.path, Path::new("/cfg/hor.bed"));
        assert!(hor.options.legend);
        match &hor.variant {
            TrackVariant::Hor(opts) => assert_eq!(opts.read.mer_filter, 4),
            other => panic!("unexpected variant {other:?}"),
        }

        let ort = &cfg.tracks[1];
        assert_eq!(ort.name, "ort");
        assert_eq!(ort.position, TrackPosition::Overlap);
        assert!(!ort.options.title);
        assert_eq!(ort.path, Path::new("/data/ort.bed"));
    }

    #[test]
    fn rejects_bad_positions_types_and_settings() {
        let bad_pos = "[[tracks]]\nposition = \"sideways\"\ntype = \"hor\"\npath = \"x\"\n";
        assert!(matches!(Config::parse(bad_pos, Path::new(".")), Err(RenderError::Toml(_))));

        let bad_type = "[[tracks]]\ntype = \"pie\"\npath = \"x\"\n";
        assert!(matches!(Config::parse(bad_type, Path::new(".")), Err(RenderError::Config { .. })));

        let first_overlap = "[[tracks]]\nposition = \"overlap\"\ntype = \"label\"\npath = \"x\"\n";
        assert!(matches!(Config::parse(first_overlap, Path::new(".")), Err(RenderError::Config { .. })));

        let bad_dim = "[settings]\ndim = [0.0, 4.0]\n";
        assert!(matches!(Config::parse(bad_dim, Path::new(".")), Err(RenderError::Config { .. })));
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/chr1.PNG")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("chr1.svg")), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::from_path(Path::new("chr1.pdf")), None);
        assert_eq!(OutputFormat::from_path(Path::new("chr1")), None);
    }
}
