//! Track descriptors: data, draw variant with typed options, and stacking position.

use crate::bed::{BedRecord, IdentityMatrix};
use crate::color::Rgba;
use crate::error::{RenderError, Result};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Whether a track takes a new row or draws over the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackPosition {
    #[serde(alias = "relative")]
    Normal,
    Overlap,
}

impl fmt::Display for TrackPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackPosition::Normal => write!(f, "Normal"),
            TrackPosition::Overlap => write!(f, "Overlap"),
        }
    }
}

/// Side of the figure the legend column sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Left,
    #[default]
    Right,
    None,
}

/// Tag of a draw variant, without its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Bar,
    Hor,
    HorOrt,
    Label,
    SelfIdent,
    Value,
}

impl FromStr for TrackKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        let norm: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match norm.as_str() {
            "bar" | "ideogram" => Ok(TrackKind::Bar),
            "hor" => Ok(TrackKind::Hor),
            "horort" => Ok(TrackKind::HorOrt),
            "label" => Ok(TrackKind::Label),
            "selfident" => Ok(TrackKind::SelfIdent),
            "value" => Ok(TrackKind::Value),
            _ => Err(RenderError::config(format!("unknown track type {s:?}"))),
        }
    }
}

fn de_color<'de, D>(deserializer: D) -> std::result::Result<Option<Rgba>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => Rgba::parse(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color {s:?}"))),
    }
}

fn de_fwd_color<'de, D>(deserializer: D) -> std::result::Result<Rgba, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_color(deserializer)?.unwrap_or(DEFAULT_FWD_COLOR))
}

fn de_rev_color<'de, D>(deserializer: D) -> std::result::Result<Rgba, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_color(deserializer)?.unwrap_or(DEFAULT_REV_COLOR))
}

const DEFAULT_FWD_COLOR: Rgba = Rgba::BLACK;
const DEFAULT_REV_COLOR: Rgba = Rgba::rgb(255, 0, 0);

fn default_alpha() -> f64 {
    1.0
}

/// Options understood by every variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommonOptions {
    /// Label the row with the track name.
    pub title: bool,
    /// Use the chromosome name as the row label instead of the track name.
    pub chrom_as_title: bool,
    /// Fill the row's legend surface, when the figure has one.
    pub legend: bool,
    pub hide_x: bool,
    pub fontsize: Option<f64>,
}

impl Default for CommonOptions {
    fn default() -> Self {
        CommonOptions {
            title: true,
            chrom_as_title: false,
            legend: false,
            hide_x: false,
            fontsize: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorSortBy {
    #[default]
    Mer,
    HorCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Filtering and coloring applied while reading HOR BED files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HorReadOptions {
    /// Keep only live HORs (`L` in the name).
    pub live_only: bool,
    /// Minimum number of monomers.
    pub mer_filter: u8,
    /// Minimum number of occurrences of a HOR name.
    pub hor_filter: Option<usize>,
    pub sort_by: HorSortBy,
    pub sort_order: SortOrder,
    /// Keep the file's itemRgb instead of the monomer palette.
    pub use_item_rgb: bool,
}

impl Default for HorReadOptions {
    fn default() -> Self {
        HorReadOptions {
            live_only: true,
            mer_filter: 2,
            hor_filter: None,
            sort_by: HorSortBy::Mer,
            sort_order: SortOrder::Descending,
            use_item_rgb: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BarOptions {
    #[serde(deserialize_with = "de_color")]
    pub color: Option<Rgba>,
    pub alpha: f64,
}

impl Default for BarOptions {
    fn default() -> Self {
        BarOptions {
            color: None,
            alpha: default_alpha(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HorOptions {
    #[serde(flatten)]
    pub read: HorReadOptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HorOrtOptions {
    /// Arrow head length as a fraction of the run length, in percent.
    pub scale: f64,
    #[serde(deserialize_with = "de_fwd_color")]
    pub fwd_color: Rgba,
    #[serde(deserialize_with = "de_rev_color")]
    pub rev_color: Rgba,
    #[serde(flatten)]
    pub read: HorReadOptions,
}

impl Default for HorOrtOptions {
    fn default() -> Self {
        HorOrtOptions {
            scale: 50.0,
            fwd_color: DEFAULT_FWD_COLOR,
            rev_color: DEFAULT_REV_COLOR,
            read: HorReadOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    #[serde(deserialize_with = "de_color")]
    pub color: Option<Rgba>,
    pub alpha: f64,
}

impl Default for LabelOptions {
    fn default() -> Self {
        LabelOptions {
            color: None,
            alpha: default_alpha(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelfIdentOptions {
    /// Point the triangle downwards.
    pub flip_y: bool,
}

impl Default for SelfIdentOptions {
    fn default() -> Self {
        SelfIdentOptions { flip_y: true }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValueOptions {
    #[serde(deserialize_with = "de_color")]
    pub color: Option<Rgba>,
    pub alpha: f64,
    /// Shade the area under the curve.
    pub fill: bool,
}

impl Default for ValueOptions {
    fn default() -> Self {
        ValueOptions {
            color: None,
            alpha: default_alpha(),
            fill: true,
        }
    }
}

/// Draw variant of a track, carrying the options only that variant reads.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackVariant {
    Bar(BarOptions),
    Hor(HorOptions),
    HorOrt(HorOrtOptions),
    Label(LabelOptions),
    SelfIdent(SelfIdentOptions),
    Value(ValueOptions),
}

impl TrackVariant {
    pub fn kind(&self) -> TrackKind {
        match self {
            TrackVariant::Bar(_) => TrackKind::Bar,
            TrackVariant::Hor(_) => TrackKind::Hor,
            TrackVariant::HorOrt(_) => TrackKind::HorOrt,
            TrackVariant::Label(_) => TrackKind::Label,
            TrackVariant::SelfIdent(_) => TrackKind::SelfIdent,
            TrackVariant::Value(_) => TrackKind::Value,
        }
    }

    pub fn with_defaults(kind: TrackKind) -> Self {
        match kind {
            TrackKind::Bar => TrackVariant::Bar(BarOptions::default()),
            TrackKind::Hor => TrackVariant::Hor(HorOptions::default()),
            TrackKind::HorOrt => TrackVariant::HorOrt(HorOrtOptions::default()),
            TrackKind::Label => TrackVariant::Label(LabelOptions::default()),
            TrackKind::SelfIdent => TrackVariant::SelfIdent(SelfIdentOptions::default()),
            TrackKind::Value => TrackVariant::Value(ValueOptions::default()),
        }
    }

    /// Build the variant's options from a config table. Unknown keys are ignored.
    pub fn from_table(kind: TrackKind, table: &toml::Table) -> Result<Self> {
        let value = toml::Value::Table(table.clone());
        Ok(match kind {
            TrackKind::Bar => TrackVariant::Bar(value.try_into()?),
            TrackKind::Hor => TrackVariant::Hor(value.try_into()?),
            TrackKind::HorOrt => TrackVariant::HorOrt(value.try_into()?),
            TrackKind::Label => TrackVariant::Label(value.try_into()?),
            TrackKind::SelfIdent => TrackVariant::SelfIdent(value.try_into()?),
            TrackKind::Value => TrackVariant::Value(value.try_into()?),
        })
    }
}

/// Records of an interval track, plus the category order used for drawing and legends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalTable {
    pub records: Vec<BedRecord>,
    pub categories: Vec<String>,
}

impl IntervalTable {
    pub fn new(records: Vec<BedRecord>) -> Self {
        IntervalTable {
            records,
            categories: Vec::new(),
        }
    }

    pub fn max_end(&self) -> Option<u64> {
        self.records.iter().map(|r| r.chrom_end).max()
    }

    pub fn min_st(&self) -> Option<u64> {
        self.records.iter().map(|r| r.chrom_st).min()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackData {
    Intervals(IntervalTable),
    Identity(IdentityMatrix),
}

/// One horizontal panel's worth of data. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,
    pub position: TrackPosition,
    pub variant: TrackVariant,
    pub options: CommonOptions,
    pub data: TrackData,
}

impl Track {
    pub fn new<S: Into<String>>(name: S, position: TrackPosition, variant: TrackVariant, data: TrackData) -> Self {
        Track {
            name: name.into(),
            position,
            variant,
            options: CommonOptions::default(),
            data,
        }
    }

    pub fn with_options(mut self, options: CommonOptions) -> Self {
        self.options = options;
        self
    }

    pub fn kind(&self) -> TrackKind {
        self.variant.kind()
    }

    /// Genomic span covered by this track's data.
    pub fn extent(&self) -> Option<(u64, u64)> {
        match &self.data {
            TrackData::Intervals(t) => Some((t.min_st()?, t.max_end()?)),
            TrackData::Identity(m) => m.extent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> toml::Table {
        src.parse().unwrap()
    }

    #[test]
    fn track_kind_names_are_forgiving() {
        assert_eq!("HOR".parse::<TrackKind>().unwrap(), TrackKind::Hor);
        assert_eq!("hor_ort".parse::<TrackKind>().unwrap(), TrackKind::HorOrt);
        assert_eq!("self-ident".parse::<TrackKind>().unwrap(), TrackKind::SelfIdent);
        assert!(matches!("heatmap".parse::<TrackKind>(), Err(RenderError::Config { .. })));
    }

    #[test]
    fn options_use_defaults_and_ignore_unknown_keys() {
        let v = TrackVariant::from_table(TrackKind::Label, &table("alpha = 0.5\nunknown = 3")).unwrap();
        assert_eq!(
            v,
            TrackVariant::Label(LabelOptions {
                color: None,
                alpha: 0.5
            })
        );

        let v = TrackVariant::from_table(TrackKind::HorOrt, &table("rev_color = \"#0000ff\"\nmer_filter = 4")).unwrap();
        let TrackVariant::HorOrt(opts) = v else {
            panic!("wrong variant");
        };
        assert_eq!(opts.fwd_color, Rgba::BLACK);
        assert_eq!(opts.rev_color, Rgba::rgb(0, 0, 255));
        assert_eq!(opts.read.mer_filter, 4);
        assert!(opts.read.live_only);
    }

    #[test]
    fn bad_option_values_fail_at_construction() {
        assert!(TrackVariant::from_table(TrackKind::Value, &table("color = \"nope\"")).is_err());
        assert!(TrackVariant::from_table(TrackKind::SelfIdent, &table("flip_y = 3")).is_err());
    }

    #[test]
    fn common_options_default_to_titled_without_legend() {
        let opts: CommonOptions = toml::Value::Table(table("legend = true")).try_into().unwrap();
        assert!(opts.title);
        assert!(opts.legend);
        assert!(!opts.chrom_as_title);
    }
}
