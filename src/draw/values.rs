use super::{format_ax, intervals};
use crate::color::Rgba;
use crate::error::{RenderError, Result};
use crate::surface::{Spine, Surface};
use crate::track::{Track, ValueOptions};

const DEF_COLOR: Rgba = Rgba::BLACK;

/// Step curve of per-interval values, optionally shaded down to zero.
pub fn draw_values(
    surface: &mut Surface,
    track: &Track,
    zorder: usize,
    _legend: Option<&mut Surface>,
    opts: &ValueOptions,
) -> Result<()> {
    let table = intervals(track)?;
    format_ax(surface, &track.options, false, &[Spine::Right, Spine::Top]);

    let mut records: Vec<_> = table.records.iter().collect();
    records.sort_by_key(|r| r.chrom_st);

    let mut points: Vec<(f64, f64)> = Vec::with_capacity(records.len() * 2);
    for rec in records {
        let value = rec.value().ok_or_else(|| {
            RenderError::draw(
                &track.name,
                format!("non-numeric value {:?} at {}-{}", rec.name, rec.chrom_st, rec.chrom_end),
            )
        })?;
        points.push((rec.chrom_st as f64, value));
        points.push((rec.chrom_end as f64, value));
    }

    let z = zorder as f64;
    let color = opts.color.unwrap_or(DEF_COLOR);
    let lo = points.iter().map(|p| p.1).fold(0.0f64, f64::min);
    let hi = points.iter().map(|p| p.1).fold(0.0f64, f64::max);

    if let (Some(&(first_x, _)), Some(&(last_x, _))) = (points.first(), points.last()) {
        if opts.fill {
            let mut area = Vec::with_capacity(points.len() + 2);
            area.push((first_x, 0.0));
            area.extend_from_slice(&points);
            area.push((last_x, 0.0));
            surface.add_polygon(area, color.with_alpha(opts.alpha * 0.5), z);
        }
        surface.add_line(points, color.with_alpha(opts.alpha), 1.0, z);
    }
    surface.set_ylim(lo, if hi > lo { hi } else { lo + 1.0 });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::test_support::interval_track;
    use crate::surface::Shape;
    use crate::track::TrackVariant;

    #[test]
    fn curve_steps_through_values() {
        let opts = ValueOptions::default();
        let track = interval_track("gc", TrackVariant::Value(opts.clone()), &[(10, 20, "0.5"), (0, 10, "0.25")]);
        let mut s = Surface::new();
        draw_values(&mut s, &track, 4, None, &opts).unwrap();
        assert_eq!(s.items().len(), 2);
        match &s.items()[1].shape {
            Shape::Line { points, .. } => {
                assert_eq!(points, &vec![(0.0, 0.25), (10.0, 0.25), (10.0, 0.5), (20.0, 0.5)])
            }
            other => panic!("unexpected shape {other:?}"),
        }
        assert_eq!(s.ylim(), (0.0, 0.5));
    }

    #[test]
    fn no_fill_draws_only_the_line() {
        let opts = ValueOptions {
            fill: false,
            ..ValueOptions::default()
        };
        let track = interval_track("gc", TrackVariant::Value(opts.clone()), &[(0, 10, "3")]);
        let mut s = Surface::new();
        draw_values(&mut s, &track, 0, None, &opts).unwrap();
        assert_eq!(s.items().len(), 1);
    }

    #[test]
    fn non_numeric_values_are_draw_errors() {
        let opts = ValueOptions::default();
        let track = interval_track("gc", TrackVariant::Value(opts.clone()), &[(0, 10, "high")]);
        let err = draw_values(&mut Surface::new(), &track, 0, None, &opts).unwrap_err();
        assert!(matches!(err, RenderError::Draw { ref track, .. } if track == "gc"));
    }
}
