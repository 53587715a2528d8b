//! Color references from styles.xml resolved to ARGB hex
//!
//! A color element names its value one of four ways: a literal `rgb`, a
//! `theme` slot with an optional `tint`, an `indexed` palette entry, or
//! `auto`. Resolved colors are stored the way they are written back, as
//! eight hex digits with an opaque alpha (`FF4472C4`).

use quick_xml::events::BytesStart;

use crate::xml_helpers::{attr_bool, attr_f64, attr_string, attr_usize};

/// Excel's legacy 64-entry palette, used when styles.xml has no
/// `indexedColors` of its own.
pub const INDEXED_COLORS: [&str; 64] = [
    "000000", "FFFFFF", "FF0000", "00FF00", "0000FF", "FFFF00", "FF00FF", "00FFFF",
    "000000", "FFFFFF", "FF0000", "00FF00", "0000FF", "FFFF00", "FF00FF", "00FFFF",
    "800000", "008000", "000080", "808000", "800080", "008080", "C0C0C0", "808080",
    "9999FF", "993366", "FFFFCC", "CCFFFF", "660066", "FF8080", "0066CC", "CCCCFF",
    "000080", "FF00FF", "FFFF00", "00FFFF", "800080", "800000", "008080", "0000FF",
    "00CCFF", "CCFFFF", "CCFFCC", "FFFF99", "99CCFF", "FF99CC", "CC99FF", "FFCC99",
    "3366FF", "33CCCC", "99CC00", "FFCC00", "FF9900", "FF6600", "666699", "969696",
    "003366", "339966", "003300", "333300", "993300", "993366", "333399", "333333",
];

/// Office theme colors in style index order.
///
/// Style indices swap the first two pairs of the scheme: 0 is `lt1`,
/// 1 is `dk1`, 2 is `lt2`, 3 is `dk2`, then `accent1`..`accent6`,
/// `hlink` and `folHlink`.
pub const DEFAULT_THEME_COLORS: [&str; 12] = [
    "FFFFFF", "000000", "E7E6E6", "44546A", "4472C4", "ED7D31", "A5A5A5", "FFC000",
    "5B9BD5", "70AD47", "0563C1", "954F72",
];

/// Index 64 of the palette means the system foreground.
const SYSTEM_FOREGROUND: usize = 64;

/// An unresolved color reference as found on a `color`, `fgColor` or
/// `bgColor` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorSpec {
    pub rgb: Option<String>,
    pub theme: Option<usize>,
    pub tint: Option<f64>,
    pub indexed: Option<usize>,
    pub auto: bool,
}

impl ColorSpec {
    pub fn from_element(e: &BytesStart) -> Self {
        Self {
            rgb: attr_string(e, b"rgb"),
            theme: attr_usize(e, b"theme"),
            tint: attr_f64(e, b"tint"),
            indexed: attr_usize(e, b"indexed"),
            auto: attr_bool(e, b"auto").unwrap_or(false),
        }
    }
}

/// Resolve `color` to `AARRGGBB`.
///
/// Priority is rgb, theme, indexed, then auto. A literal `rgb` is kept as
/// written. `theme_colors` and `palette` hold `RRGGBB` values; an empty
/// `palette` means the legacy one.
pub fn resolve_color(color: &ColorSpec, theme_colors: &[String], palette: &[String]) -> Option<String> {
    if let Some(rgb) = &color.rgb {
        return Some(rgb.clone());
    }

    if let Some(idx) = color.theme {
        let base = theme_colors
            .get(idx)
            .map(String::as_str)
            .or_else(|| DEFAULT_THEME_COLORS.get(idx).copied())?;
        let rgb = match color.tint {
            Some(tint) if tint.abs() > f64::EPSILON => apply_tint(base, tint),
            _ => base.to_ascii_uppercase(),
        };
        return Some(format!("FF{rgb}"));
    }

    if let Some(idx) = color.indexed {
        if idx == SYSTEM_FOREGROUND {
            return Some("FF000000".to_string());
        }
        let rgb = palette
            .get(idx)
            .map(String::as_str)
            .or_else(|| palette.is_empty().then(|| INDEXED_COLORS.get(idx).copied()).flatten())?;
        return Some(format!("FF{}", rgb.to_ascii_uppercase()));
    }

    color.auto.then(|| "FF000000".to_string())
}

/// Lighten (`tint > 0`) or darken (`tint < 0`) an `RRGGBB` color in HSL space.
#[allow(clippy::many_single_char_names)]
pub fn apply_tint(hex_color: &str, tint: f64) -> String {
    let hex = hex_color.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    let (h, s, l) = rgb_to_hsl(channel(0..2), channel(2..4), channel(4..6));

    let l = if tint < 0.0 {
        l * (1.0 + tint)
    } else {
        (1.0 - l).mul_add(tint, l)
    };

    let (r, g, b) = hsl_to_rgb(h, s, l.clamp(0.0, 1.0));
    format!("{r:02X}{g:02X}{b:02X}")
}

#[allow(clippy::many_single_char_names)]
fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

#[allow(
    clippy::many_single_char_names,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l.mul_add(-s, l + s)
    };
    let p = 2.0f64.mul_add(l, -q);

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return ((q - p) * 6.0).mul_add(t, p);
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return ((q - p) * (2.0 / 3.0 - t)).mul_add(6.0, p);
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(idx: usize, tint: Option<f64>) -> ColorSpec {
        ColorSpec {
            theme: Some(idx),
            tint,
            ..ColorSpec::default()
        }
    }

    #[test]
    fn test_rgb_wins() {
        let spec = ColorSpec {
            rgb: Some("FFFF0000".to_string()),
            theme: Some(4),
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&spec, &[], &[]).as_deref(), Some("FFFF0000"));
    }

    #[test]
    fn test_theme_slots_and_tint() {
        assert_eq!(resolve_color(&theme(4, None), &[], &[]).as_deref(), Some("FF4472C4"));
        let custom = vec!["FFFFFF".to_string(), "111111".to_string()];
        assert_eq!(resolve_color(&theme(1, None), &custom, &[]).as_deref(), Some("FF111111"));
        // Slots the theme does not cover fall back to the Office colors.
        assert_eq!(resolve_color(&theme(5, None), &custom, &[]).as_deref(), Some("FFED7D31"));
        assert_eq!(resolve_color(&theme(1, Some(0.5)), &[], &[]).as_deref(), Some("FF808080"));
        assert_eq!(resolve_color(&theme(0, Some(-0.5)), &[], &[]).as_deref(), Some("FF808080"));
        assert_eq!(resolve_color(&theme(40, None), &[], &[]), None);
    }

    #[test]
    fn test_indexed_palette() {
        let indexed = |idx| ColorSpec {
            indexed: Some(idx),
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&indexed(10), &[], &[]).as_deref(), Some("FFFF0000"));
        assert_eq!(resolve_color(&indexed(64), &[], &[]).as_deref(), Some("FF000000"));
        let palette = vec!["123456".to_string()];
        assert_eq!(resolve_color(&indexed(0), &[], &palette).as_deref(), Some("FF123456"));
        assert_eq!(resolve_color(&indexed(3), &[], &palette), None);
    }

    #[test]
    fn test_auto_and_empty() {
        let auto = ColorSpec {
            auto: true,
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&auto, &[], &[]).as_deref(), Some("FF000000"));
        assert_eq!(resolve_color(&ColorSpec::default(), &[], &[]), None);
    }
}
