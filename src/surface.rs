//! A single panel of the figure: data-space primitives plus axis chrome.

use crate::canvas::{Canvas, HAlign, PixelRect, VAlign};
use crate::color::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spine {
    Left,
    Right,
    Top,
    Bottom,
}

pub const ALL_SPINES: [Spine; 4] = [Spine::Right, Spine::Left, Spine::Top, Spine::Bottom];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spines {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Spines {
    pub fn get(&self, spine: Spine) -> bool {
        match spine {
            Spine::Left => self.left,
            Spine::Right => self.right,
            Spine::Top => self.top,
            Spine::Bottom => self.bottom,
        }
    }

    pub fn set(&mut self, spine: Spine, visible: bool) {
        match spine {
            Spine::Left => self.left = visible,
            Spine::Right => self.right = visible,
            Spine::Top => self.top = visible,
            Spine::Bottom => self.bottom = visible,
        }
    }

    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Axis decoration of a surface. New surfaces start with every spine and tick shown.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisStyle {
    pub spines: Spines,
    pub xticks: bool,
    pub yticks: bool,
    pub xticklabels: bool,
    pub yticklabels: bool,
    pub grid: bool,
    /// Data-space extent the bottom spine is limited to.
    pub bottom_bounds: Option<(f64, f64)>,
    pub fontsize: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        AxisStyle {
            spines: Spines {
                left: true,
                right: true,
                top: true,
                bottom: true,
            },
            xticks: true,
            yticks: true,
            xticklabels: true,
            yticklabels: true,
            grid: false,
            bottom_bounds: None,
            fontsize: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        fill: Rgba,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        fill: Rgba,
    },
    Line {
        points: Vec<(f64, f64)>,
        stroke: Rgba,
        width: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: Rgba,
        align: HAlign,
    },
}

impl Shape {
    fn points(&self) -> Vec<(f64, f64)> {
        match self {
            Shape::Rect { x0, x1, y0, y1, .. } => vec![(*x0, *y0), (*x1, *y1)],
            Shape::Polygon { points, .. } | Shape::Line { points, .. } => points.clone(),
            Shape::Text { x, y, .. } => vec![(*x, *y)],
        }
    }
}

/// A primitive tagged with the z-order of the track that drew it.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub zorder: f64,
    pub shape: Shape,
}

/// One drawing surface (panel) of the grid.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    xlim: Option<(f64, f64)>,
    ylim: Option<(f64, f64)>,
    ylabel: Option<String>,
    items: Vec<Item>,
    pub style: AxisStyle,
    pub(crate) rect: PixelRect,
}

/// Tick step from the 1-2-5 series giving roughly `target` ticks.
fn nice_step(span: f64, target: usize) -> f64 {
    let raw = span / target.max(1) as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * mag
}

pub fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let span = hi - lo;
    if !(span.is_finite() && span > 0.0) {
        return Vec::new();
    }
    let step = nice_step(span, target);
    let first = (lo / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut i = 0;
    loop {
        let t = first + i as f64 * step;
        if t > hi + step * 1e-9 {
            break;
        }
        ticks.push(t);
        i += 1;
    }
    ticks
}

/// Compact genomic position label: `1.5M`, `250K`, `120`.
pub fn format_position(pos: f64) -> String {
    let trim = |s: String| {
        if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s
        }
    };
    let abs = pos.abs();
    if abs >= 1e6 {
        format!("{}M", trim(format!("{:.2}", pos / 1e6)))
    } else if abs >= 1e3 {
        format!("{}K", trim(format!("{:.1}", pos / 1e3)))
    } else {
        trim(format!("{:.2}", pos))
    }
}

impl Surface {
    pub fn new() -> Self {
        Surface::default()
    }

    pub fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.xlim = Some((lo, hi));
    }

    pub fn set_ylim(&mut self, lo: f64, hi: f64) {
        self.ylim = Some((lo, hi));
    }

    fn data_extent(&self, axis: usize) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for item in &self.items {
            for p in item.shape.points() {
                let v = if axis == 0 { p.0 } else { p.1 };
                if v.is_finite() {
                    lo = lo.min(v);
                    hi = hi.max(v);
                }
            }
        }
        (lo <= hi).then_some((lo, hi))
    }

    /// Explicit x limits, else the data extent, else `(0, 1)`.
    pub fn xlim(&self) -> (f64, f64) {
        self.xlim
            .or_else(|| self.data_extent(0))
            .unwrap_or((0.0, 1.0))
    }

    /// Explicit y limits, else the data extent with zero margins, else `(0, 1)`.
    pub fn ylim(&self) -> (f64, f64) {
        self.ylim
            .or_else(|| self.data_extent(1))
            .unwrap_or((0.0, 1.0))
    }

    pub fn set_ylabel<S: Into<String>>(&mut self, label: S) {
        self.ylabel = Some(label.into());
    }

    pub fn ylabel(&self) -> Option<&str> {
        self.ylabel.as_deref()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pixel rect assigned by the figure layout.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    pub fn add_rect(&mut self, x0: f64, x1: f64, y0: f64, y1: f64, fill: Rgba, zorder: f64) {
        self.items.push(Item {
            zorder,
            shape: Shape::Rect { x0, x1, y0, y1, fill },
        });
    }

    pub fn add_polygon(&mut self, points: Vec<(f64, f64)>, fill: Rgba, zorder: f64) {
        self.items.push(Item {
            zorder,
            shape: Shape::Polygon { points, fill },
        });
    }

    pub fn add_line(&mut self, points: Vec<(f64, f64)>, stroke: Rgba, width: f64, zorder: f64) {
        self.items.push(Item {
            zorder,
            shape: Shape::Line {
                points,
                stroke,
                width,
            },
        });
    }

    pub fn add_text<S: Into<String>>(&mut self, x: f64, y: f64, text: S, color: Rgba, align: HAlign, zorder: f64) {
        self.items.push(Item {
            zorder,
            shape: Shape::Text {
                x,
                y,
                text: text.into(),
                color,
                align,
            },
        });
    }

    /// Remove the listed decorations.
    pub fn minimalize(&mut self, grid: bool, xticks: bool, yticks: bool, spines: &[Spine]) {
        if grid {
            self.style.grid = false;
        }
        if xticks {
            self.style.xticks = false;
            self.style.xticklabels = false;
        }
        if yticks {
            self.style.yticks = false;
            self.style.yticklabels = false;
        }
        for spine in spines {
            self.style.spines.set(*spine, false);
        }
    }

    fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        let (x0, x1) = self.xlim();
        let (y0, y1) = self.ylim();
        let sx = if x1 != x0 { (x - x0) / (x1 - x0) } else { 0.0 };
        let sy = if y1 != y0 { (y - y0) / (y1 - y0) } else { 0.0 };
        (
            self.rect.x + sx * self.rect.w,
            self.rect.y + self.rect.h - sy * self.rect.h,
        )
    }

    /// Draw primitives in z-order (ties keep insertion order), then axis chrome.
    ///
    /// `px_per_pt` converts font sizes and line widths to pixels.
    pub fn render(&self, canvas: &mut dyn Canvas, px_per_pt: f64) {
        let font_px = self.style.fontsize * px_per_pt;
        let clip = Some(self.rect);
        let mut order: Vec<&Item> = self.items.iter().collect();
        order.sort_by(|a, b| a.zorder.total_cmp(&b.zorder));

        for item in order {
            match &item.shape {
                Shape::Rect { x0, x1, y0, y1, fill } => {
                    let (ax, ay) = self.to_px(x0.min(*x1), y0.max(*y1));
                    let (bx, by) = self.to_px(x0.max(*x1), y0.min(*y1));
                    let rect = PixelRect {
                        x: ax.min(bx),
                        y: ay.min(by),
                        w: (bx - ax).abs(),
                        h: (by - ay).abs(),
                    };
                    canvas.fill_rect(rect, *fill, clip);
                }
                Shape::Polygon { points, fill } => {
                    let px: Vec<(f64, f64)> = points.iter().map(|&(x, y)| self.to_px(x, y)).collect();
                    canvas.fill_polygon(&px, *fill, clip);
                }
                Shape::Line { points, stroke, width } => {
                    let px: Vec<(f64, f64)> = points.iter().map(|&(x, y)| self.to_px(x, y)).collect();
                    canvas.stroke_line(&px, *stroke, width * px_per_pt, clip);
                }
                Shape::Text { x, y, text, color, align } => {
                    let (px, py) = self.to_px(*x, *y);
                    canvas.text(px, py, text, font_px, *color, *align, VAlign::Center);
                }
            }
        }
        self.render_chrome(canvas, font_px, px_per_pt);
    }

    fn render_chrome(&self, canvas: &mut dyn Canvas, font_px: f64, px_per_pt: f64) {
        let r = self.rect;
        let line_w = px_per_pt.max(1.0);
        let tick_len = font_px * 0.4;
        let spines = &self.style.spines;
        let (x0, x1) = self.xlim();
        let (y0, y1) = self.ylim();

        if self.style.grid {
            let grey = Rgba::LIGHT_GREY;
            for t in nice_ticks(x0.min(x1), x0.max(x1), 5) {
                let (px, _) = self.to_px(t, y0);
                canvas.stroke_line(&[(px, r.y), (px, r.bottom())], grey, line_w, None);
            }
        }

        if spines.left {
            canvas.stroke_line(&[(r.x, r.y), (r.x, r.bottom())], Rgba::BLACK, line_w, None);
        }
        if spines.right {
            canvas.stroke_line(&[(r.right(), r.y), (r.right(), r.bottom())], Rgba::BLACK, line_w, None);
        }
        if spines.top {
            canvas.stroke_line(&[(r.x, r.y), (r.right(), r.y)], Rgba::BLACK, line_w, None);
        }
        if spines.bottom {
            let (bx0, bx1) = match self.style.bottom_bounds {
                Some((lo, hi)) => {
                    let lo = lo.max(x0.min(x1));
                    let hi = hi.min(x0.max(x1));
                    (self.to_px(lo, y0).0, self.to_px(hi, y0).0)
                }
                None => (r.x, r.right()),
            };
            canvas.stroke_line(&[(bx0, r.bottom()), (bx1, r.bottom())], Rgba::BLACK, line_w, None);
        }

        if self.style.xticks {
            for t in nice_ticks(x0.min(x1), x0.max(x1), 5) {
                let (px, _) = self.to_px(t, y0);
                canvas.stroke_line(&[(px, r.bottom()), (px, r.bottom() + tick_len)], Rgba::BLACK, line_w, None);
                if self.style.xticklabels {
                    canvas.text(
                        px,
                        r.bottom() + tick_len,
                        &format_position(t),
                        font_px,
                        Rgba::BLACK,
                        HAlign::Center,
                        VAlign::Top,
                    );
                }
            }
        }

        if self.style.yticks {
            for t in nice_ticks(y0.min(y1), y0.max(y1), 3) {
                let (_, py) = self.to_px(x0, t);
                canvas.stroke_line(&[(r.x - tick_len, py), (r.x, py)], Rgba::BLACK, line_w, None);
                if self.style.yticklabels {
                    canvas.text(
                        r.x - tick_len * 1.5,
                        py,
                        &format_position(t),
                        font_px,
                        Rgba::BLACK,
                        HAlign::Right,
                        VAlign::Center,
                    );
                }
            }
        }

        if let Some(label) = &self.ylabel {
            let offset = if self.style.yticklabels && self.style.yticks {
                font_px * 5.0
            } else {
                font_px
            };
            canvas.text(r.x - offset, r.y + r.h / 2.0, label, font_px, Rgba::BLACK, HAlign::Right, VAlign::Center);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_follow_one_two_five_steps() {
        assert_eq!(nice_ticks(0.0, 1_000_000.0, 5), vec![0.0, 200_000.0, 400_000.0, 600_000.0, 800_000.0, 1_000_000.0]);
        assert!(nice_ticks(5.0, 5.0, 5).is_empty());
    }

    #[test]
    fn positions_are_compact() {
        assert_eq!(format_position(1_500_000.0), "1.5M");
        assert_eq!(format_position(250_000.0), "250K");
        assert_eq!(format_position(120.0), "120");
        assert_eq!(format_position(0.0), "0");
    }

    #[test]
    fn limits_fall_back_to_data_then_unit() {
        let mut s = Surface::new();
        assert_eq!(s.ylim(), (0.0, 1.0));
        s.add_rect(10.0, 20.0, 0.0, 4.0, Rgba::BLACK, 0.0);
        assert_eq!(s.xlim(), (10.0, 20.0));
        assert_eq!(s.ylim(), (0.0, 4.0));
        s.set_xlim(0.0, 100.0);
        assert_eq!(s.xlim(), (0.0, 100.0));
    }

    #[test]
    fn minimalize_only_touches_requested_parts() {
        let mut s = Surface::new();
        s.minimalize(true, false, false, &[Spine::Top, Spine::Right]);
        assert!(!s.style.grid);
        assert!(s.style.xticks);
        assert!(s.style.spines.left && s.style.spines.bottom);
        assert!(!s.style.spines.top && !s.style.spines.right);
    }
}
