use super::{draw_uniq_entry_legend, format_ax, intervals};
use crate::color::Rgba;
use crate::error::{RenderError, Result};
use crate::surface::{Spine, Surface};
use crate::track::{BarOptions, Track};

/// Bars from start to end, as tall as the record's numeric name.
///
/// A track whose names are all non-numeric (an ideogram) is drawn with
/// full-height bars instead.
pub fn draw_bars(
    surface: &mut Surface,
    track: &Track,
    zorder: usize,
    legend: Option<&mut Surface>,
    opts: &BarOptions,
) -> Result<()> {
    let table = intervals(track)?;
    format_ax(surface, &track.options, false, &[Spine::Right, Spine::Top]);

    let values: Vec<Option<f64>> = table.records.iter().map(|r| r.value()).collect();
    let numeric = values.iter().filter(|v| v.is_some()).count();
    if numeric != 0 && numeric != values.len() {
        let bad = table
            .records
            .iter()
            .zip(&values)
            .find(|(_, v)| v.is_none())
            .map(|(r, _)| r.name.as_str())
            .unwrap_or_default();
        return Err(RenderError::draw(&track.name, format!("non-numeric bar height {bad:?}")));
    }

    let z = zorder as f64;
    let mut max_height: f64 = 0.0;
    for (rec, value) in table.records.iter().zip(&values) {
        let height = value.unwrap_or(1.0);
        max_height = max_height.max(height);
        let color = opts.color.unwrap_or(rec.item_rgb).with_alpha(opts.alpha);
        surface.add_rect(rec.chrom_st as f64, rec.chrom_end as f64, 0.0, height, color, z);
    }
    if numeric == 0 {
        surface.minimalize(false, false, true, &[Spine::Left]);
    }
    surface.set_ylim(0.0, if max_height > 0.0 { max_height } else { 1.0 });

    if let Some(max_end) = table.max_end() {
        surface.style.bottom_bounds = Some((0.0, max_end as f64));
    }

    if let Some(legend) = legend {
        let mut entries: Vec<(String, Rgba)> = Vec::new();
        for rec in &table.records {
            if !entries.iter().any(|(n, _)| *n == rec.name) {
                entries.push((rec.name.clone(), opts.color.unwrap_or(rec.item_rgb)));
            }
        }
        draw_uniq_entry_legend(legend, &entries, 3, z);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::test_support::interval_track;
    use crate::surface::Shape;
    use crate::track::TrackVariant;

    #[test]
    fn heights_follow_values() {
        let track = interval_track("gc", TrackVariant::Bar(BarOptions::default()), &[(0, 10, "2"), (10, 20, "4")]);
        let mut s = Surface::new();
        draw_bars(&mut s, &track, 3, None, &BarOptions::default()).unwrap();
        assert_eq!(s.items().len(), 2);
        assert!(s.items().iter().all(|i| i.zorder == 3.0));
        assert_eq!(s.ylim(), (0.0, 4.0));
        assert!(!s.style.spines.top && !s.style.spines.right);
        assert_eq!(s.style.bottom_bounds, Some((0.0, 20.0)));
    }

    #[test]
    fn ideogram_bars_are_full_height() {
        let track = interval_track("ideogram", TrackVariant::Bar(BarOptions::default()), &[(0, 10, "p11"), (10, 20, "q11")]);
        let mut s = Surface::new();
        let mut legend = Surface::new();
        draw_bars(&mut s, &track, 0, Some(&mut legend), &BarOptions::default()).unwrap();
        assert!(s.items().iter().all(|i| matches!(i.shape, Shape::Rect { y1, .. } if y1 == 1.0)));
        assert!(!s.style.yticks);
        assert_eq!(legend.items().len(), 4);
    }

    #[test]
    fn mixed_heights_fail() {
        let track = interval_track("gc", TrackVariant::Bar(BarOptions::default()), &[(0, 10, "2"), (10, 20, "x")]);
        let err = draw_bars(&mut Surface::new(), &track, 0, None, &BarOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::Draw { .. }));
    }
}
