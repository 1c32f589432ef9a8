use super::{draw_uniq_entry_legend, format_ax, intervals};
use crate::bed::{category_order, BedRecord};
use crate::color::{name_color, Rgba};
use crate::error::Result;
use crate::surface::{Spine, Surface};
use crate::track::{LabelOptions, Track};

fn label_color(rec: &BedRecord, opts: &LabelOptions) -> Rgba {
    opts.color
        .or(rec.color)
        .unwrap_or_else(|| if rec.item_rgb != Rgba::BLACK { rec.item_rgb } else { name_color(&rec.name) })
}

/// Categorical annotation blocks, drawn category by category.
pub fn draw_label(
    surface: &mut Surface,
    track: &Track,
    zorder: usize,
    legend: Option<&mut Surface>,
    opts: &LabelOptions,
) -> Result<()> {
    let table = intervals(track)?;
    format_ax(surface, &track.options, true, &[Spine::Left, Spine::Right, Spine::Top]);

    let categories = if table.categories.is_empty() {
        category_order(&table.records)
    } else {
        table.categories.clone()
    };

    let z = zorder as f64;
    let mut entries: Vec<(String, Rgba)> = Vec::with_capacity(categories.len());
    for category in &categories {
        let mut first = true;
        for rec in table.records.iter().filter(|r| &r.name == category) {
            let color = label_color(rec, opts);
            if first {
                entries.push((category.clone(), color));
                first = false;
            }
            surface.add_rect(
                rec.chrom_st as f64,
                rec.chrom_end as f64,
                0.0,
                1.0,
                color.with_alpha(opts.alpha),
                z,
            );
        }
    }
    surface.set_ylim(0.0, 1.0);

    if let Some(legend) = legend {
        draw_uniq_entry_legend(legend, &entries, 3, z);
    }
    Ok(())
}
