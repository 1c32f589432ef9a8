//! Color parsing and palettes shared by the readers and draw routines.

use sha2::{Digest, Sha256};
use std::fmt;

/// An 8-bit RGB color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const GREY: Rgba = Rgba::rgb(128, 128, 128);
    pub const LIGHT_GREY: Rgba = Rgba::rgb(211, 211, 211);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 255 }
    }

    /// Same color with alpha taken from a `0.0..=1.0` fraction.
    pub fn with_alpha(self, alpha: f64) -> Self {
        Rgba {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    pub fn opacity(&self) -> f64 {
        self.a as f64 / 255.0
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#rrggbb`, `r,g,b` (BED itemRgb) or a handful of common names.
    pub fn parse(s: &str) -> Option<Rgba> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Rgba::rgb(r, g, b));
        }
        if s.contains(',') {
            let parts: Vec<u8> = s
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .ok()?;
            return match parts.as_slice() {
                [r, g, b] => Some(Rgba::rgb(*r, *g, *b)),
                _ => None,
            };
        }
        let named = match s.to_ascii_lowercase().as_str() {
            "black" => Rgba::BLACK,
            "white" => Rgba::WHITE,
            "gray" | "grey" => Rgba::GREY,
            "lightgray" | "lightgrey" => Rgba::LIGHT_GREY,
            "red" => Rgba::rgb(255, 0, 0),
            "green" => Rgba::rgb(0, 128, 0),
            "blue" => Rgba::rgb(0, 0, 255),
            "orange" => Rgba::rgb(255, 165, 0),
            "purple" => Rgba::rgb(128, 0, 128),
            "teal" => Rgba::rgb(0, 128, 128),
            _ => return None,
        };
        Some(named)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Deterministic color for a category name.
///
/// The name is hashed with SHA-256, three digest bytes become the channels,
/// and the result is normalized and brightened so every name gets a clearly
/// visible color.
pub fn name_color(name: &str) -> Rgba {
    let digest = Sha256::digest(name.as_bytes());

    let mut r = digest[24] as f32 / 255.0;
    let mut g = digest[8] as f32 / 255.0;
    let mut b = digest[16] as f32 / 255.0;

    let sum = r + g + b;
    if sum > 0.0 {
        r /= sum;
        g /= sum;
        b /= sum;
    }

    let max_component = r.max(g).max(b);
    let f = if max_component > 0.0 {
        1.5f32.min(1.0 / max_component)
    } else {
        1.0
    };

    Rgba::rgb(
        (255.0 * (r * f).min(1.0)).round() as u8,
        (255.0 * (g * f).min(1.0)).round() as u8,
        (255.0 * (b * f).min(1.0)).round() as u8,
    )
}

/// Monomer length of an alpha-satellite repeat unit in bp.
pub const MONOMER_LEN: u64 = 170;

/// Colors for HOR monomer counts 1..=21. Larger HORs fall back to [`name_color`].
const MONOMER_COLORS: [(u8, u8, u8); 21] = [
    (88, 88, 88),    // 1
    (168, 39, 92),   // 2
    (154, 199, 138), // 3
    (165, 61, 99),   // 4
    (57, 151, 198),  // 5
    (41, 163, 206),  // 6
    (94, 178, 167),  // 7
    (56, 164, 155),  // 8
    (69, 180, 206),  // 9
    (219, 82, 74),   // 10
    (245, 179, 144), // 11
    (119, 192, 176), // 12
    (192, 163, 191), // 13
    (227, 90, 57),   // 14
    (141, 102, 168), // 15
    (244, 140, 61),  // 16
    (47, 92, 166),   // 17
    (214, 180, 52),  // 18
    (96, 55, 130),   // 19
    (178, 55, 60),   // 20
    (75, 140, 60),   // 21
];

pub fn monomer_color(mer: u8) -> Rgba {
    match mer as usize {
        m @ 1..=21 => {
            let (r, g, b) = MONOMER_COLORS[m - 1];
            Rgba::rgb(r, g, b)
        }
        m => name_color(&format!("{m}-mer")),
    }
}

/// Percent identity cut points. `n` cuts give `n + 1` classes.
pub const IDENTITY_CUTS: [f64; 9] = [86.0, 88.0, 90.0, 92.0, 94.0, 96.0, 97.0, 98.0, 99.0];

/// ColorBrewer Spectral, low identity (blue) to high identity (red).
const IDENTITY_PALETTE: [(u8, u8, u8); 10] = [
    (94, 79, 162),
    (50, 136, 189),
    (102, 194, 165),
    (171, 221, 164),
    (230, 245, 152),
    (254, 224, 139),
    (253, 174, 97),
    (244, 109, 67),
    (213, 62, 79),
    (158, 1, 66),
];

/// Index of the identity class `ident` falls in.
pub fn identity_class(ident: f64) -> usize {
    IDENTITY_CUTS
        .iter()
        .position(|&cut| ident < cut)
        .unwrap_or(IDENTITY_CUTS.len())
}

pub fn identity_class_color(class: usize) -> Rgba {
    let (r, g, b) = IDENTITY_PALETTE[class.min(IDENTITY_PALETTE.len() - 1)];
    Rgba::rgb(r, g, b)
}

pub fn identity_color(ident: f64) -> Rgba {
    identity_class_color(identity_class(ident))
}

/// Legend text for an identity class, e.g. `<86`, `90-92`, `>=99`.
pub fn identity_class_label(class: usize) -> String {
    let last = IDENTITY_CUTS.len();
    match class {
        0 => format!("<{}", IDENTITY_CUTS[0]),
        c if c >= last => format!(">={}", IDENTITY_CUTS[last - 1]),
        c => format!("{}-{}", IDENTITY_CUTS[c - 1], IDENTITY_CUTS[c]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_item_rgb_and_names() {
        assert_eq!(Rgba::parse("#ff8000"), Some(Rgba::rgb(255, 128, 0)));
        assert_eq!(Rgba::parse("10, 20,30"), Some(Rgba::rgb(10, 20, 30)));
        assert_eq!(Rgba::parse("Grey"), Some(Rgba::GREY));
        assert_eq!(Rgba::parse("1,2"), None);
        assert_eq!(Rgba::parse("#12345"), None);
        assert_eq!(Rgba::parse("not-a-color"), None);
    }

    #[test]
    fn name_colors_are_stable_and_bright() {
        let a = name_color("ALR/Alpha");
        assert_eq!(a, name_color("ALR/Alpha"));
        assert_ne!(a, name_color("HSat2"));
        assert!(a.r.max(a.g).max(a.b) > 100);
    }

    #[test]
    fn identity_classes_cover_the_range() {
        assert_eq!(identity_class(50.0), 0);
        assert_eq!(identity_class(86.0), 1);
        assert_eq!(identity_class(99.9), IDENTITY_CUTS.len());
        assert_eq!(identity_class_label(0), "<86");
        assert_eq!(identity_class_label(2), "88-90");
        assert_eq!(identity_class_label(9), ">=99");
    }

    #[test]
    fn large_mers_still_get_a_color() {
        assert_eq!(monomer_color(2), Rgba::rgb(168, 39, 92));
        assert_eq!(monomer_color(40), monomer_color(40));
    }
}
