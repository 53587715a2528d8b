use serde::{Deserialize, Serialize};

/// Default font applied to new styles.
pub const DEFAULT_FONT_NAME: &str = "Verdana";
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// A cell or column style. Two styles with equal fields are the same style.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub font: Font,
    pub fill: Fill,
    pub border: Border,
    pub alignment: Alignment,
    pub apply_border: bool,
    pub apply_fill: bool,
    pub apply_font: bool,
    pub apply_alignment: bool,
    /// Index into `cellStyleXfs` when the style derives from a named style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_style_index: Option<usize>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font: Font::default(),
            fill: Fill::default(),
            border: Border::default(),
            alignment: Alignment::default(),
            apply_border: false,
            apply_fill: false,
            apply_font: false,
            apply_alignment: false,
            named_style_index: None,
        }
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub size: f64,
    pub name: String,
    pub family: u32,
    pub charset: u32,
    /// ARGB hex, empty for automatic.
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SIZE, DEFAULT_FONT_NAME)
    }
}

impl Font {
    pub fn new(size: f64, name: &str) -> Self {
        Self {
            size,
            name: name.to_string(),
            family: 0,
            charset: 0,
            color: String::new(),
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub pattern_type: PatternType,
    pub fg_color: String,
    pub bg_color: String,
}

impl Default for Fill {
    fn default() -> Self {
        Self::new(PatternType::None, "FFFFFFFF", "00000000")
    }
}

impl Fill {
    pub fn new(pattern_type: PatternType, fg_color: &str, bg_color: &str) -> Self {
        Self {
            pattern_type,
            fg_color: fg_color.to_string(),
            bg_color: bg_color.to_string(),
        }
    }
}

/// Per-side border line styles and ARGB colors.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    pub left: BorderStyle,
    pub left_color: String,
    pub right: BorderStyle,
    pub right_color: String,
    pub top: BorderStyle,
    pub top_color: String,
    pub bottom: BorderStyle,
    pub bottom_color: String,
}

impl Border {
    pub fn new(left: BorderStyle, right: BorderStyle, top: BorderStyle, bottom: BorderStyle) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Alignment {
    pub horizontal: HAlign,
    pub vertical: VAlign,
    pub indent: u32,
    pub shrink_to_fit: bool,
    pub text_rotation: i32,
    pub wrap_text: bool,
}

impl Default for Alignment {
    fn default() -> Self {
        Self {
            horizontal: HAlign::General,
            vertical: VAlign::Bottom,
            indent: 0,
            shrink_to_fit: false,
            text_rotation: 0,
            wrap_text: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Thin => "thin",
            Self::Medium => "medium",
            Self::Thick => "thick",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Double => "double",
            Self::Hair => "hair",
            Self::MediumDashed => "mediumDashed",
            Self::DashDot => "dashDot",
            Self::MediumDashDot => "mediumDashDot",
            Self::DashDotDot => "dashDotDot",
            Self::MediumDashDotDot => "mediumDashDotDot",
            Self::SlantDashDot => "slantDashDot",
        }
    }

    /// Unknown or missing values read as `None`.
    pub fn from_xml(s: &str) -> Self {
        match s {
            "thin" => Self::Thin,
            "medium" => Self::Medium,
            "thick" => Self::Thick,
            "dashed" => Self::Dashed,
            "dotted" => Self::Dotted,
            "double" => Self::Double,
            "hair" => Self::Hair,
            "mediumDashed" => Self::MediumDashed,
            "dashDot" => Self::DashDot,
            "mediumDashDot" => Self::MediumDashDot,
            "dashDotDot" => Self::DashDotDot,
            "mediumDashDotDot" => Self::MediumDashDotDot,
            "slantDashDot" => Self::SlantDashDot,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HAlign {
    #[default]
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Fill => "fill",
            Self::Justify => "justify",
            Self::CenterContinuous => "centerContinuous",
            Self::Distributed => "distributed",
        }
    }

    pub fn from_xml(s: &str) -> Self {
        match s {
            "left" => Self::Left,
            "center" => Self::Center,
            "right" => Self::Right,
            "fill" => Self::Fill,
            "justify" => Self::Justify,
            "centerContinuous" => Self::CenterContinuous,
            "distributed" => Self::Distributed,
            _ => Self::General,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VAlign {
    Top,
    Center, // Note: Excel uses "center" not "middle"
    #[default]
    Bottom,
    Justify,
    Distributed,
}

impl VAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
            Self::Justify => "justify",
            Self::Distributed => "distributed",
        }
    }

    pub fn from_xml(s: &str) -> Self {
        match s {
            "top" => Self::Top,
            "center" => Self::Center,
            "justify" => Self::Justify,
            "distributed" => Self::Distributed,
            _ => Self::Bottom,
        }
    }
}

/// Pattern fill types from ECMA-376 Part 1, Section 18.18.55
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PatternType {
    #[default]
    None,
    Solid,
    Gray125,
    Gray0625,
    DarkGray,
    MediumGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
}

impl PatternType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::Gray125 => "gray125",
            Self::Gray0625 => "gray0625",
            Self::DarkGray => "darkGray",
            Self::MediumGray => "mediumGray",
            Self::LightGray => "lightGray",
            Self::DarkHorizontal => "darkHorizontal",
            Self::DarkVertical => "darkVertical",
            Self::DarkDown => "darkDown",
            Self::DarkUp => "darkUp",
            Self::DarkGrid => "darkGrid",
            Self::DarkTrellis => "darkTrellis",
            Self::LightHorizontal => "lightHorizontal",
            Self::LightVertical => "lightVertical",
            Self::LightDown => "lightDown",
            Self::LightUp => "lightUp",
            Self::LightGrid => "lightGrid",
            Self::LightTrellis => "lightTrellis",
        }
    }

    pub fn from_xml(s: &str) -> Self {
        match s {
            "solid" => Self::Solid,
            "gray125" => Self::Gray125,
            "gray0625" => Self::Gray0625,
            "darkGray" => Self::DarkGray,
            "mediumGray" => Self::MediumGray,
            "lightGray" => Self::LightGray,
            "darkHorizontal" => Self::DarkHorizontal,
            "darkVertical" => Self::DarkVertical,
            "darkDown" => Self::DarkDown,
            "darkUp" => Self::DarkUp,
            "darkGrid" => Self::DarkGrid,
            "darkTrellis" => Self::DarkTrellis,
            "lightHorizontal" => Self::LightHorizontal,
            "lightVertical" => Self::LightVertical,
            "lightDown" => Self::LightDown,
            "lightUp" => Self::LightUp,
            "lightGrid" => Self::LightGrid,
            "lightTrellis" => Self::LightTrellis,
            _ => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_values() {
        let style = Style::new();
        assert_eq!(style.font.name, "Verdana");
        assert!((style.font.size - 12.0).abs() < f64::EPSILON);
        assert_eq!(style.fill.pattern_type, PatternType::None);
        assert_eq!(style.fill.fg_color, "FFFFFFFF");
        assert_eq!(style.fill.bg_color, "00000000");
        assert_eq!(style.border.top, BorderStyle::None);
        assert_eq!(style.alignment.horizontal, HAlign::General);
        assert_eq!(style.alignment.vertical, VAlign::Bottom);
    }

    #[test]
    fn test_enum_names_round_trip() {
        for s in ["thin", "mediumDashDotDot", "slantDashDot"] {
            assert_eq!(BorderStyle::from_xml(s).as_str(), s);
        }
        for s in ["lightGray", "gray125", "solid"] {
            assert_eq!(PatternType::from_xml(s).as_str(), s);
        }
        assert_eq!(HAlign::from_xml("centerContinuous").as_str(), "centerContinuous");
        assert_eq!(VAlign::from_xml("middle"), VAlign::Bottom);
    }

    #[test]
    fn test_styles_compare_by_value() {
        let mut a = Style::new();
        let mut b = Style::new();
        assert_eq!(a, b);
        a.font.bold = true;
        assert_ne!(a, b);
        b.font.bold = true;
        assert_eq!(a, b);
    }
}
