use super::format_ax;
use crate::bed::IdentityMatrix;
use crate::canvas::HAlign;
use crate::color::{identity_class_color, identity_class_label, identity_color, Rgba, IDENTITY_CUTS};
use crate::error::{RenderError, Result};
use crate::surface::{Spine, Surface};
use crate::track::{SelfIdentOptions, Track, TrackData};

/// Rotated cell `(i, j)` of the matrix: a diamond centered over the midpoint
/// of the two windows, raised by half their distance.
fn diamond(m: &IdentityMatrix, i: usize, j: usize, sign: f64) -> Vec<(f64, f64)> {
    let w = m.window as f64;
    let a = m.window_start(i) as f64;
    let b = m.window_start(j) as f64;
    let x = (a + b) / 2.0;
    let y = (b - a) / 2.0;
    vec![
        (x, sign * y),
        (x + w / 2.0, sign * (y - w / 2.0)),
        (x + w, sign * y),
        (x + w / 2.0, sign * (y + w / 2.0)),
    ]
}

/// Colorbar of the identity classes, bottom (lowest) to top.
fn draw_colorbar(legend: &mut Surface, zorder: f64) {
    let classes = IDENTITY_CUTS.len() + 1;
    let h = 1.0 / classes as f64;
    legend.set_xlim(0.0, 1.0);
    legend.set_ylim(0.0, 1.0);
    for class in 0..classes {
        let y0 = class as f64 * h;
        legend.add_rect(0.0, 0.15, y0, y0 + h, identity_class_color(class), zorder);
        legend.add_text(0.2, y0 + h / 2.0, identity_class_label(class), Rgba::BLACK, HAlign::Left, zorder);
    }
}

/// Self-identity heatmap drawn as the upper triangle of the matrix.
pub fn draw_self_ident(
    surface: &mut Surface,
    track: &Track,
    zorder: usize,
    legend: Option<&mut Surface>,
    opts: &SelfIdentOptions,
) -> Result<()> {
    let TrackData::Identity(matrix) = &track.data else {
        return Err(RenderError::draw(&track.name, "expected an identity matrix"));
    };
    format_ax(surface, &track.options, true, &[Spine::Left, Spine::Right, Spine::Top]);

    let z = zorder as f64;
    let sign = if opts.flip_y { -1.0 } else { 1.0 };
    for i in 0..matrix.len() {
        for j in i..matrix.len() {
            if let Some(ident) = matrix.get(i, j) {
                surface.add_polygon(diamond(matrix, i, j, sign), identity_color(ident), z);
            }
        }
    }

    let height = matrix.window as f64 * matrix.len() as f64 / 2.0;
    let height = if height > 0.0 { height } else { 1.0 };
    if opts.flip_y {
        surface.set_ylim(-height, 0.0);
        // The triangle's base sits on top when flipped.
        surface.style.spines.bottom = false;
        surface.style.spines.top = true;
    } else {
        surface.set_ylim(0.0, height);
    }

    if let Some(legend) = legend {
        draw_colorbar(legend, z);
    }
    Ok(())
}
