//! Pixel-space drawing targets: an RGBA buffer for PNG and an SVG text builder.

use crate::color::Rgba;
use crate::font;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Axis-aligned rectangle in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl PixelRect {
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// Everything a surface needs to put itself on the page.
pub trait Canvas {
    fn fill_rect(&mut self, rect: PixelRect, color: Rgba, clip: Option<PixelRect>);
    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgba, clip: Option<PixelRect>);
    fn stroke_line(&mut self, points: &[(f64, f64)], color: Rgba, width: f64, clip: Option<PixelRect>);
    /// Draw possibly multi-line text anchored at `(x, y)`.
    fn text(&mut self, x: f64, y: f64, text: &str, size: f64, color: Rgba, h: HAlign, v: VAlign);
}

/// Straight-alpha "over" compositing of `src` onto `dst`.
fn blend(dst: &mut [u8], src: Rgba) {
    let sa = src.a as f64 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    let mix = |s: u8, d: u8| -> u8 {
        let c = (s as f64 * sa + d as f64 * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    dst[0] = mix(src.r, dst[0]);
    dst[1] = mix(src.g, dst[1]);
    dst[2] = mix(src.b, dst[2]);
    dst[3] = (out_a * 255.0).round() as u8;
}

/// RGBA8 pixel buffer.
pub struct RasterCanvas {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32, background: Option<Rgba>) -> Self {
        let mut buffer = vec![0u8; (width as usize) * (height as usize) * 4];
        if let Some(bg) = background {
            for px in buffer.chunks_exact_mut(4) {
                px.copy_from_slice(&[bg.r, bg.g, bg.b, bg.a]);
            }
        }
        RasterCanvas {
            width,
            height,
            buffer,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.buffer
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some([
            self.buffer[idx],
            self.buffer[idx + 1],
            self.buffer[idx + 2],
            self.buffer[idx + 3],
        ])
    }

    fn bounds(&self, clip: Option<PixelRect>) -> (i64, i64, i64, i64) {
        let (mut x0, mut y0, mut x1, mut y1) = (0i64, 0i64, self.width as i64, self.height as i64);
        if let Some(c) = clip {
            x0 = x0.max(c.x.floor() as i64);
            y0 = y0.max(c.y.floor() as i64);
            x1 = x1.min(c.right().ceil() as i64);
            y1 = y1.min(c.bottom().ceil() as i64);
        }
        (x0, y0, x1, y1)
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        blend(&mut self.buffer[idx..idx + 4], color);
    }
}

impl Canvas for RasterCanvas {
    fn fill_rect(&mut self, rect: PixelRect, color: Rgba, clip: Option<PixelRect>) {
        let (cx0, cy0, cx1, cy1) = self.bounds(clip);
        // Snap to pixel edges, but never let a non-empty rect vanish.
        let mut x0 = rect.x.round() as i64;
        let mut x1 = rect.right().round() as i64;
        let mut y0 = rect.y.round() as i64;
        let mut y1 = rect.bottom().round() as i64;
        if x1 <= x0 && rect.w > 0.0 {
            x1 = x0 + 1;
        }
        if y1 <= y0 && rect.h > 0.0 {
            y1 = y0 + 1;
        }
        x0 = x0.max(cx0);
        y0 = y0.max(cy0);
        x1 = x1.min(cx1);
        y1 = y1.min(cy1);
        for y in y0..y1 {
            for x in x0..x1 {
                self.put(x, y, color);
            }
        }
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgba, clip: Option<PixelRect>) {
        if points.len() < 3 {
            return;
        }
        let (cx0, cy0, cx1, cy1) = self.bounds(clip);
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let y_start = (min_y.floor() as i64).max(cy0);
        let y_end = (max_y.ceil() as i64).min(cy1);

        // Even-odd scanline fill sampled at pixel centers.
        let mut crossings: Vec<f64> = Vec::new();
        for y in y_start..y_end {
            let sy = y as f64 + 0.5;
            crossings.clear();
            for i in 0..points.len() {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % points.len()];
                if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                    crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let x0 = ((pair[0] - 0.5).ceil() as i64).max(cx0);
                let x1 = ((pair[1] - 0.5).floor() as i64 + 1).min(cx1);
                for x in x0..x1 {
                    self.put(x, y, color);
                }
            }
        }
    }

    fn stroke_line(&mut self, points: &[(f64, f64)], color: Rgba, width: f64, clip: Option<PixelRect>) {
        let (cx0, cy0, cx1, cy1) = self.bounds(clip);
        let half = (width.max(1.0) / 2.0).round().max(0.5);
        let mut last: Option<(i64, i64)> = None;
        for seg in points.windows(2) {
            let (ax, ay) = seg[0];
            let (bx, by) = seg[1];
            let steps = (bx - ax).abs().max((by - ay).abs()).ceil().max(1.0) as usize;
            for s in 0..=steps {
                let t = s as f64 / steps as f64;
                let px = (ax + (bx - ax) * t).round() as i64;
                let py = (ay + (by - ay) * t).round() as i64;
                if last == Some((px, py)) {
                    continue;
                }
                last = Some((px, py));
                let r = half as i64;
                for y in (py - r + 1).max(cy0)..(py + r).min(cy1 - 1) + 1 {
                    for x in (px - r + 1).max(cx0)..(px + r).min(cx1 - 1) + 1 {
                        self.put(x, y, color);
                    }
                }
            }
        }
    }

    fn text(&mut self, x: f64, y: f64, text: &str, size: f64, color: Rgba, h: HAlign, v: VAlign) {
        let char_size = font::char_size_for(size);
        let lines: Vec<&str> = text.split('\n').collect();
        let block_h = (lines.len() as u32 * char_size) as f64;
        let top = match v {
            VAlign::Top => y,
            VAlign::Center => y - block_h / 2.0,
            VAlign::Bottom => y - block_h,
        };
        for (i, line) in lines.iter().enumerate() {
            let w = font::text_width(line, char_size) as f64;
            let left = match h {
                HAlign::Left => x,
                HAlign::Center => x - w / 2.0,
                HAlign::Right => x - w,
            };
            let line_y = top + (i as u32 * char_size) as f64;
            let mut pixels = Vec::new();
            font::write_text(
                left.round() as i64,
                line_y.round() as i64,
                line,
                char_size,
                color,
                |px, py, c| pixels.push((px, py, c)),
            );
            for (px, py, c) in pixels {
                self.put(px, py, c);
            }
        }
    }
}

/// Escape special XML characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// SVG document built up as text.
pub struct SvgCanvas {
    width: f64,
    height: f64,
    body: String,
    clip_ids: Vec<PixelRect>,
}

impl SvgCanvas {
    pub fn new(width: f64, height: f64, background: Option<Rgba>) -> Self {
        let mut body = String::new();
        if let Some(bg) = background {
            body.push_str(&format!(
                r#"<rect width="100%" height="100%" fill="{}"/>"#,
                bg.to_hex()
            ));
            body.push('\n');
        }
        SvgCanvas {
            width,
            height,
            body,
            clip_ids: Vec::new(),
        }
    }

    /// Reuse one `<clipPath>` per distinct rect so ids stay deterministic.
    fn clip_attr(&mut self, clip: Option<PixelRect>) -> String {
        match clip {
            None => String::new(),
            Some(rect) => {
                let id = match self.clip_ids.iter().position(|r| *r == rect) {
                    Some(i) => i,
                    None => {
                        self.clip_ids.push(rect);
                        self.clip_ids.len() - 1
                    }
                };
                format!(r#" clip-path="url(#clip{id})""#)
            }
        }
    }

    fn fill_attrs(color: Rgba) -> String {
        if color.a == 255 {
            format!(r#"fill="{}""#, color.to_hex())
        } else {
            format!(
                r#"fill="{}" fill-opacity="{:.3}""#,
                color.to_hex(),
                color.opacity()
            )
        }
    }

    pub fn finish(self) -> String {
        let mut svg = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<style>
  text {{ font-family: 'DejaVu Sans Mono', 'Courier New', monospace; }}
</style>
"#,
            w = self.width,
            h = self.height
        );
        if !self.clip_ids.is_empty() {
            svg.push_str("<defs>\n");
            for (i, r) in self.clip_ids.iter().enumerate() {
                svg.push_str(&format!(
                    r#"<clipPath id="clip{i}"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"/></clipPath>"#,
                    r.x, r.y, r.w, r.h
                ));
                svg.push('\n');
            }
            svg.push_str("</defs>\n");
        }
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }
}

impl Canvas for SvgCanvas {
    fn fill_rect(&mut self, rect: PixelRect, color: Rgba, clip: Option<PixelRect>) {
        let clip = self.clip_attr(clip);
        self.body.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {}{}/>"#,
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            Self::fill_attrs(color),
            clip
        ));
        self.body.push('\n');
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgba, clip: Option<PixelRect>) {
        if points.len() < 3 {
            return;
        }
        let clip = self.clip_attr(clip);
        let pts: Vec<String> = points.iter().map(|(x, y)| format!("{x:.2},{y:.2}")).collect();
        self.body.push_str(&format!(
            r#"<polygon points="{}" {}{}/>"#,
            pts.join(" "),
            Self::fill_attrs(color),
            clip
        ));
        self.body.push('\n');
    }

    fn stroke_line(&mut self, points: &[(f64, f64)], color: Rgba, width: f64, clip: Option<PixelRect>) {
        if points.len() < 2 {
            return;
        }
        let clip = self.clip_attr(clip);
        let pts: Vec<String> = points.iter().map(|(x, y)| format!("{x:.2},{y:.2}")).collect();
        let opacity = if color.a == 255 {
            String::new()
        } else {
            format!(r#" stroke-opacity="{:.3}""#, color.opacity())
        };
        self.body.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{:.2}"{}{}/>"#,
            pts.join(" "),
            color.to_hex(),
            width,
            opacity,
            clip
        ));
        self.body.push('\n');
    }

    fn text(&mut self, x: f64, y: f64, text: &str, size: f64, color: Rgba, h: HAlign, v: VAlign) {
        let anchor = match h {
            HAlign::Left => "start",
            HAlign::Center => "middle",
            HAlign::Right => "end",
        };
        let lines: Vec<&str> = text.split('\n').collect();
        let block_h = lines.len() as f64 * size;
        let top = match v {
            VAlign::Top => y,
            VAlign::Center => y - block_h / 2.0,
            VAlign::Bottom => y - block_h,
        };
        self.body.push_str(&format!(
            r#"<text x="{x:.2}" y="{top:.2}" font-size="{size:.2}" fill="{}" text-anchor="{anchor}">"#,
            color.to_hex()
        ));
        for (i, line) in lines.iter().enumerate() {
            // Baseline sits roughly 0.8 em below each line's top.
            let dy = if i == 0 { size * 0.8 } else { size };
            self.body.push_str(&format!(
                r#"<tspan x="{x:.2}" dy="{dy:.2}">{}</tspan>"#,
                escape_xml(line)
            ));
        }
        self.body.push_str("</text>\n");
    }
}
